//! Criteria - Query specification for one entity

use serde_json::Value;
use shared::{DomainName, Result};

use crate::expr::{Expr, Filter, Op};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// Ordering on a relative domain attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub attr: String,
    pub dir: SortDir,
}

/// Query specification: target entity, filters, ordering and limit
///
/// Filters added through the builders are qualified with the entity and
/// AND-ed together.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    domain: DomainName,
    filters: Option<Filter>,
    order: Vec<OrderBy>,
    limit: Option<usize>,
}

impl Criteria {
    /// Create criteria for `feature.entity` or `global.entity`
    pub fn new(domain_name: &str) -> Result<Self> {
        Ok(Self {
            domain: DomainName::parse(domain_name)?,
            filters: None,
            order: Vec::new(),
            limit: None,
        })
    }

    /// Builder: add a single comparison
    pub fn with_expr(self, attr: &str, op: Op, value: impl Into<Value>) -> Result<Self> {
        self.with_filter(Filter::Expr(Expr::new(attr, op, value)?))
    }

    /// Builder: add a textual filter, e.g. `status = 'open' and total > 10`
    pub fn with_filter_str(self, expr: &str) -> Result<Self> {
        self.with_filter(Filter::parse(expr)?)
    }

    /// Builder: add a filter tree of relative attributes
    pub fn with_filter(mut self, filter: Filter) -> Result<Self> {
        let filter = filter.qualify(&self.domain)?;
        self.filters = Some(match self.filters.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        Ok(self)
    }

    /// Builder: order by a relative domain attribute
    pub fn with_order(mut self, attr: impl Into<String>, dir: SortDir) -> Self {
        self.order.push(OrderBy {
            attr: attr.into(),
            dir,
        });
        self
    }

    /// Builder: cap the number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    // ========== Getters ==========

    pub fn domain(&self) -> &DomainName {
        &self.domain
    }

    pub fn domain_name(&self) -> &str {
        self.domain.as_str()
    }

    /// Name of the repository type serving this entity
    pub fn repo_name(&self) -> String {
        self.domain.repo_name()
    }

    pub fn filters(&self) -> Option<&Filter> {
        self.filters.as_ref()
    }

    pub fn has_filters(&self) -> bool {
        self.filters.is_some()
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

//! ExistsCriteria - Criteria for existence checks
//!
//! Holds at most one simple, relative comparison. Conjunctions, a second
//! filter and already qualified attribute paths are rejected.

use serde_json::Value;
use shared::{DomainName, InvalidFilterShapeError, Result};

use crate::expr::{Expr, Filter, Op};

#[derive(Debug, Clone, PartialEq)]
pub struct ExistsCriteria {
    domain: DomainName,
    filters: Option<Expr>,
}

impl ExistsCriteria {
    pub fn new(domain_name: &str) -> Result<Self> {
        Ok(Self {
            domain: DomainName::parse(domain_name)?,
            filters: None,
        })
    }

    /// Assign the filter from text, e.g. `id = 6`
    pub fn filter(&mut self, expr: &str) -> Result<&mut Self> {
        match Filter::parse(expr)? {
            Filter::Expr(expr) => self.filter_expr(expr),
            _ => Err(InvalidFilterShapeError::Conjunction.into()),
        }
    }

    /// Assign an equality filter on a relative attribute
    pub fn exists(&mut self, attr: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.filter_expr(Expr::new(attr, Op::Eq, value)?)
    }

    /// Assign a comparison, qualifying its attribute path
    pub fn filter_expr(&mut self, expr: Expr) -> Result<&mut Self> {
        if self.filters.is_some() {
            return Err(InvalidFilterShapeError::AlreadyAssigned.into());
        }
        self.filters = Some(expr.qualify(&self.domain)?);
        Ok(self)
    }

    // ========== Getters ==========

    pub fn domain(&self) -> &DomainName {
        &self.domain
    }

    pub fn domain_name(&self) -> &str {
        self.domain.as_str()
    }

    pub fn repo_name(&self) -> String {
        self.domain.repo_name()
    }

    pub fn filters(&self) -> Option<&Expr> {
        self.filters.as_ref()
    }

    pub fn has_filters(&self) -> bool {
        self.filters.is_some()
    }
}

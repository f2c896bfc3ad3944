//! # Stratum Criteria
//!
//! Query specifications handed from the dispatch layer to repositories.
//! Filters are trees of simple `<attr> <op> <literal>` comparisons whose
//! attribute paths are qualified with the owning feature and entity.

pub mod criteria;
pub mod exists;
pub mod expr;

pub use criteria::{Criteria, OrderBy, SortDir};
pub use exists::ExistsCriteria;
pub use expr::{compare_values, Expr, Filter, Op};

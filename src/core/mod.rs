//! Core business logic - framework-agnostic indicator, lookup and evaluation operations.
//!
//! Nothing in here knows about HTTP; every function takes a database
//! connection (or transaction) and returns a [`Result`](crate::errors::Result).

/// Evaluation of indicator values against comparison formulas
pub mod evaluation;
/// Physical equipment and indicator links
pub mod equipment;
/// Indicator creation, editing and hierarchy
pub mod indicator;
/// Select options and existence checks for reference tables
pub mod lookup;
/// Organizational structure tree
pub mod organization;

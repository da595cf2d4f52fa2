//! Core domain concepts shared across all subdomains.
//!
//! - [`query::Query`]: a validated query to route
//! - [`role::Role`]: logical request category selecting a fallback chain
//! - [`error::DomainError`]: domain-level errors
//! - [`validation::ConfigIssue`]: structured configuration issues

pub mod error;
pub mod query;
pub mod role;
pub mod validation;

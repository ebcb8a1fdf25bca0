//! Catalog-level error type.

use thiserror::Error;

/// Returned when parsing a string that is not one of the three wire categories.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown node category: '{0}'")]
pub struct UnknownCategory(pub String);

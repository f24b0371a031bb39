use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field that failed validation, together with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Name of the offending field
    pub field: String,
    /// Human readable reason for the failure
    pub reason: String,
}

impl ValidationFailure {
    /// Create a new [ValidationFailure] for the given field
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Render a list of failures as a single `; `-separated line
    pub fn describe_all(failures: &[ValidationFailure]) -> String {
        failures
            .iter()
            .map(|failure| failure.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Failures reported by a [crate::RecordStore]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store refused to persist the record
    #[error("Record rejected: {}", ValidationFailure::describe_all(.0))]
    Rejected(Vec<ValidationFailure>),

    /// The record does not exist (or no longer exists) in the store
    #[error("Record not found")]
    NotFound,

    /// A concurrent or otherwise conflicting write was detected
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// Any other backend failure
    #[error("Store backend failure: {0}")]
    Backend(String),
}

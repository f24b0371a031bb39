use std::fmt::{Display, Formatter};

use thiserror::Error;
use warden_store::{StoreError, ValidationFailure};

use crate::{Ability, Operation};

/// What exactly a [WardenError::Permission] refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The listed fields are not permitted under the ability
    Fields {
        /// The ability that was checked
        ability: Ability,
        /// Every forbidden field involved in the operation
        fields: Vec<String>,
    },
    /// No field at all is permitted under the ability
    Ability {
        /// The ability that was checked
        ability: Ability,
    },
    /// The record is outside the scope declared for the operation
    Scope {
        /// The operation whose scope was not satisfied
        operation: Operation,
    },
}

impl Display for Denial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Denial::Fields { ability, fields } => {
                write!(f, "cannot {ability} {}", fields.join(", "))
            }
            Denial::Ability { ability } => write!(f, "cannot {ability} any field"),
            Denial::Scope { operation } => {
                write!(f, "record is outside the {operation} scope")
            }
        }
    }
}

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WardenError {
    /// No policy block is registered for the kind of record
    #[error("No policy registered for \"{kind}\"")]
    Configuration {
        /// The kind that was looked up
        kind: String,
    },

    /// The operation is not permitted for the actor
    #[error("Permission denied: {0}")]
    Permission(Denial),

    /// One or more field constraints failed
    #[error("Validation failed: {}", ValidationFailure::describe_all(.0))]
    Validation(Vec<ValidationFailure>),

    /// The record store rejected the operation after all checks passed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WardenError {
    /// A field-level denial
    pub fn forbidden(ability: Ability, fields: Vec<String>) -> Self {
        WardenError::Permission(Denial::Fields { ability, fields })
    }

    /// A denial of the ability as a whole
    pub fn not_permitted(ability: Ability) -> Self {
        WardenError::Permission(Denial::Ability { ability })
    }

    /// A scope-level denial
    pub fn out_of_scope(operation: Operation) -> Self {
        WardenError::Permission(Denial::Scope { operation })
    }
}

/// Result type for warden operations
pub type WardenResult<T> = Result<T, WardenError>;

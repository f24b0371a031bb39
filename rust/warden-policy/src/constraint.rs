//! Field-level constraints attached to grants.
//!
//! Every constraint carries an explicit kind. In particular a literal that
//! must be written is declared as [Constraint::Forced] and is merged into the
//! written attributes, while [Constraint::Equals] only validates what the
//! caller supplied. Nothing is inferred from the shape of the value.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use regex::Regex;
use warden_store::{ConditionalSend, ConditionalSync, Value};

/// A named test over a candidate value. Any `Fn(&Value) -> bool` that can
/// be shared across threads (where threads exist) qualifies.
pub trait ValueTest: Fn(&Value) -> bool + ConditionalSend + ConditionalSync {}

impl<F> ValueTest for F where F: Fn(&Value) -> bool + ConditionalSend + ConditionalSync {}

/// A predicate over a candidate field value
#[derive(Clone)]
pub enum Constraint {
    /// The value is always replaced by this literal before validation
    Forced(Value),
    /// The value must equal this literal
    Equals(Value),
    /// The value must equal one of these literals
    OneOf(Vec<Value>),
    /// The value must fall within `min..=max`
    Range {
        /// Inclusive lower bound
        min: Value,
        /// Inclusive upper bound
        max: Value,
    },
    /// The value must be a string matching this pattern
    Matches(Regex),
    /// The value must satisfy an arbitrary named test
    Predicate {
        /// Used in failure reasons
        name: String,
        /// The test itself
        test: Arc<dyn ValueTest>,
    },
}

impl Constraint {
    /// See [Constraint::Forced]
    pub fn forced(value: impl Into<Value>) -> Self {
        Constraint::Forced(value.into())
    }

    /// See [Constraint::Equals]
    pub fn equals(value: impl Into<Value>) -> Self {
        Constraint::Equals(value.into())
    }

    /// See [Constraint::OneOf]
    pub fn one_of<V>(values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// See [Constraint::Range]
    pub fn range(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Constraint::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// See [Constraint::Matches]
    pub fn matches(pattern: Regex) -> Self {
        Constraint::Matches(pattern)
    }

    /// See [Constraint::Predicate]
    pub fn predicate<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + ConditionalSend + ConditionalSync + 'static,
    {
        Constraint::Predicate {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// The literal this constraint forces, if it is [Constraint::Forced]
    pub fn forced_value(&self) -> Option<&Value> {
        match self {
            Constraint::Forced(value) => Some(value),
            _ => None,
        }
    }

    /// Check a candidate value, returning the failure reason if it does not
    /// satisfy this constraint
    pub fn check(&self, candidate: &Value) -> Result<(), String> {
        let satisfied = match self {
            Constraint::Forced(value) | Constraint::Equals(value) => candidate.equivalent(value),
            Constraint::OneOf(values) => values.iter().any(|value| candidate.equivalent(value)),
            Constraint::Range { min, max } => {
                matches!(
                    candidate.compare(min),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ) && matches!(
                    candidate.compare(max),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                )
            }
            Constraint::Matches(pattern) => candidate
                .as_str()
                .is_some_and(|candidate| pattern.is_match(candidate)),
            Constraint::Predicate { test, .. } => test(candidate),
        };

        if satisfied {
            Ok(())
        } else {
            Err(self.describe())
        }
    }

    fn describe(&self) -> String {
        match self {
            Constraint::Forced(value) | Constraint::Equals(value) => {
                format!("must equal {value}")
            }
            Constraint::OneOf(values) => format!(
                "must be one of {}",
                values
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Constraint::Range { min, max } => format!("must be between {min} and {max}"),
            Constraint::Matches(pattern) => format!("must match /{}/", pattern.as_str()),
            Constraint::Predicate { name, .. } => format!("must satisfy {name}"),
        }
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Forced(value) => f.debug_tuple("Forced").field(value).finish(),
            Constraint::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Constraint::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Constraint::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Constraint::Matches(pattern) => f.debug_tuple("Matches").field(pattern).finish(),
            Constraint::Predicate { name, .. } => {
                f.debug_struct("Predicate").field("name", name).finish()
            }
        }
    }
}

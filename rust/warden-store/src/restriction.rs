//! Composable query restrictions.
//!
//! A [Restriction] is a predicate over record fields. Stores translate it
//! into whatever their native query language is; the same predicate can also
//! be evaluated against a single in-memory record with [Restriction::matches],
//! which is how per-record checks (e.g. "may this record be deleted") are
//! answered without another round trip.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::{Record, Value};

static NULL: Value = Value::Null;

/// Binary comparison between a field and a constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `field = value`
    Eq,
    /// `field != value`
    NotEq,
    /// `field < value`
    Lt,
    /// `field <= value`
    Lte,
    /// `field > value`
    Gt,
    /// `field >= value`
    Gte,
}

impl Comparison {
    fn holds(self, left: &Value, right: &Value) -> bool {
        let ordering = left.compare(right);
        match self {
            Comparison::Eq => ordering == Some(Ordering::Equal),
            Comparison::NotEq => ordering != Some(Ordering::Equal),
            Comparison::Lt => ordering == Some(Ordering::Less),
            Comparison::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Comparison::Gt => ordering == Some(Ordering::Greater),
            Comparison::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::NotEq => "!=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
        }
    }
}

/// A predicate over the fields of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Restriction {
    /// Matches every record
    Everything,
    /// Matches no record
    Nothing,
    /// Compares a field against a constant. A missing field reads as
    /// [Value::Null].
    Compare {
        /// Field being compared
        field: String,
        /// How the field relates to `value`
        comparison: Comparison,
        /// The constant side of the comparison
        value: Value,
    },
    /// The field equals one of the listed values
    In {
        /// Field being tested
        field: String,
        /// Accepted values
        values: Vec<Value>,
    },
    /// Every inner restriction holds
    All(Vec<Restriction>),
    /// At least one inner restriction holds
    Any(Vec<Restriction>),
    /// The inner restriction does not hold
    Not(Box<Restriction>),
}

impl Restriction {
    fn compare(field: impl Into<String>, comparison: Comparison, value: impl Into<Value>) -> Self {
        Restriction::Compare {
            field: field.into(),
            comparison,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Eq, value)
    }

    /// `field != value`
    pub fn not_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::NotEq, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Lt, value)
    }

    /// `field <= value`
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Lte, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Gt, value)
    }

    /// `field >= value`
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Gte, value)
    }

    /// `field IN (values...)`
    pub fn one_of<V>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<Value>,
    {
        Restriction::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of `self` and `other`, folding trivial operands away
    pub fn and(self, other: Restriction) -> Self {
        match (self, other) {
            (Restriction::Everything, other) | (other, Restriction::Everything) => other,
            (Restriction::Nothing, _) | (_, Restriction::Nothing) => Restriction::Nothing,
            (Restriction::All(mut left), Restriction::All(right)) => {
                left.extend(right);
                Restriction::All(left)
            }
            (Restriction::All(mut left), other) => {
                left.push(other);
                Restriction::All(left)
            }
            (this, other) => Restriction::All(vec![this, other]),
        }
    }

    /// Disjunction of `self` and `other`, folding trivial operands away
    pub fn or(self, other: Restriction) -> Self {
        match (self, other) {
            (Restriction::Nothing, other) | (other, Restriction::Nothing) => other,
            (Restriction::Everything, _) | (_, Restriction::Everything) => Restriction::Everything,
            (Restriction::Any(mut left), Restriction::Any(right)) => {
                left.extend(right);
                Restriction::Any(left)
            }
            (Restriction::Any(mut left), other) => {
                left.push(other);
                Restriction::Any(left)
            }
            (this, other) => Restriction::Any(vec![this, other]),
        }
    }

    /// Negation of `self`
    pub fn negate(self) -> Self {
        match self {
            Restriction::Everything => Restriction::Nothing,
            Restriction::Nothing => Restriction::Everything,
            Restriction::Not(inner) => *inner,
            other => Restriction::Not(Box::new(other)),
        }
    }

    /// Evaluate this restriction against the current field values of `record`
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Restriction::Everything => true,
            Restriction::Nothing => false,
            Restriction::Compare {
                field,
                comparison,
                value,
            } => comparison.holds(record.read(field).unwrap_or(&NULL), value),
            Restriction::In { field, values } => {
                let current = record.read(field).unwrap_or(&NULL);
                values.iter().any(|value| current.equivalent(value))
            }
            Restriction::All(inner) => inner.iter().all(|each| each.matches(record)),
            Restriction::Any(inner) => inner.iter().any(|each| each.matches(record)),
            Restriction::Not(inner) => !inner.matches(record),
        }
    }
}

impl Display for Restriction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn join(f: &mut Formatter<'_>, inner: &[Restriction], separator: &str) -> std::fmt::Result {
            write!(f, "(")?;
            for (index, each) in inner.iter().enumerate() {
                if index > 0 {
                    write!(f, " {separator} ")?;
                }
                write!(f, "{each}")?;
            }
            write!(f, ")")
        }

        match self {
            Restriction::Everything => write!(f, "TRUE"),
            Restriction::Nothing => write!(f, "FALSE"),
            Restriction::Compare {
                field,
                comparison,
                value,
            } => write!(f, "{field} {} {value}", comparison.symbol()),
            Restriction::In { field, values } => {
                let values = values
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{field} IN ({values})")
            }
            Restriction::All(inner) => join(f, inner, "AND"),
            Restriction::Any(inner) => join(f, inner, "OR"),
            Restriction::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

/// The restriction declared for one kind of operation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scope {
    /// No restriction: the operation may touch every record
    #[default]
    Unrestricted,
    /// Only records matching the restriction may be touched
    Restricted(Restriction),
}

impl Scope {
    /// A scope that admits no record at all
    pub fn nothing() -> Self {
        Scope::Restricted(Restriction::Nothing)
    }

    /// The effective restriction of this scope
    pub fn restriction(&self) -> Restriction {
        match self {
            Scope::Unrestricted => Restriction::Everything,
            Scope::Restricted(restriction) => restriction.clone(),
        }
    }

    /// True if `record` falls within this scope
    pub fn permits<R: Record>(&self, record: &R) -> bool {
        match self {
            Scope::Unrestricted => true,
            Scope::Restricted(restriction) => restriction.matches(record),
        }
    }
}

impl From<Restriction> for Scope {
    fn from(restriction: Restriction) -> Self {
        Scope::Restricted(restriction)
    }
}

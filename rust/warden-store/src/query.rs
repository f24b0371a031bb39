use crate::{Record, Restriction, Scope};

/// A request for records of one kind, narrowed by a [Restriction].
///
/// Scopes are applied by rewriting the query (see [Query::scoped]) so that
/// a store only ever returns records the scope admits.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The kind of record being queried
    pub kind: String,
    /// Predicate every returned record must satisfy
    pub restriction: Restriction,
    /// Upper bound on the number of records returned
    pub limit: Option<usize>,
}

impl Query {
    /// Query every record of the given kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            restriction: Restriction::Everything,
            limit: None,
        }
    }

    /// Narrow the query with an additional restriction
    pub fn filter(mut self, restriction: Restriction) -> Self {
        self.restriction = self.restriction.and(restriction);
        self
    }

    /// Narrow the query with a declared scope
    pub fn scoped(self, scope: &Scope) -> Self {
        match scope {
            Scope::Unrestricted => self,
            Scope::Restricted(restriction) => self.filter(restriction.clone()),
        }
    }

    /// Bound the number of records returned
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(match self.limit {
            Some(current) => current.min(limit),
            None => limit,
        });
        self
    }

    /// True if `record` would be part of this query's result
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        record.kind() == self.kind && self.restriction.matches(record)
    }
}

use std::collections::HashMap;

use warden_store::{ConditionalSend, ConditionalSync, Scope};

use crate::{PermissionBuilder, PermissionSet, WardenError, WardenResult};

/// A policy block: declares, for one actor and optionally one record, every
/// scope, grant, revocation and constraint that applies.
///
/// Any `Fn(&A, Option<&R>, &mut PermissionBuilder)` is a policy. The record
/// is `None` when no record exists yet, e.g. when restricting a whole kind or
/// when deciding whether a record may be created.
pub trait Policy<A, R>: ConditionalSend + ConditionalSync {
    /// Declare into `permissions` what `actor` may do with `record`
    fn declare(&self, actor: &A, record: Option<&R>, permissions: &mut PermissionBuilder);
}

impl<A, R, F> Policy<A, R> for F
where
    F: Fn(&A, Option<&R>, &mut PermissionBuilder) + ConditionalSend + ConditionalSync,
{
    fn declare(&self, actor: &A, record: Option<&R>, permissions: &mut PermissionBuilder) {
        self(actor, record, permissions)
    }
}

/// Per-kind storage of policy blocks.
///
/// Blocks are invoked afresh for every evaluation; nothing is cached between
/// different actor/record pairs.
pub struct Policies<A, R> {
    policies: HashMap<String, Box<dyn Policy<A, R>>>,
    fallback: Scope,
}

impl<A, R> Default for Policies<A, R> {
    fn default() -> Self {
        Self {
            policies: HashMap::new(),
            fallback: Scope::Unrestricted,
        }
    }
}

impl<A, R> Policies<A, R> {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the policy block for `kind`, replacing any earlier one
    pub fn register<F>(&mut self, kind: impl Into<String>, policy: F) -> &mut Self
    where
        F: Fn(&A, Option<&R>, &mut PermissionBuilder) + ConditionalSend + ConditionalSync + 'static,
    {
        let kind = kind.into();
        if self.policies.insert(kind.clone(), Box::new(policy)).is_some() {
            tracing::debug!(kind = %kind, "replaced policy");
        }
        self
    }

    /// True if a policy block is registered for `kind`
    pub fn contains(&self, kind: &str) -> bool {
        self.policies.contains_key(kind)
    }

    /// Every kind that has a policy block
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Set the scope that operations without a declared scope resolve to
    pub fn set_fallback(&mut self, fallback: Scope) {
        self.fallback = fallback;
    }

    /// Run the policy block for `kind` and resolve its declarations
    pub fn evaluate(&self, kind: &str, actor: &A, record: Option<&R>) -> WardenResult<PermissionSet> {
        let Some(policy) = self.policies.get(kind) else {
            tracing::warn!(kind, "no policy registered");
            return Err(WardenError::Configuration {
                kind: kind.to_owned(),
            });
        };

        let mut builder = PermissionBuilder::with_fallback(self.fallback.clone());
        policy.declare(actor, record, &mut builder);
        tracing::debug!(kind, with_record = record.is_some(), "evaluated policy");

        Ok(builder.finish())
    }
}

use std::sync::Arc;

use warden_store::{RecordStore, Scope};

use crate::{
    AccessStrategy, CollectionProxy, Implicit, InstanceProxy, PermissionSet, Policies, Strict,
    WardenConfig, WardenResult,
};

/// Ties a policy registry to the [RecordStore] it guards.
///
/// A [Warden] is shared; every call to [Warden::restrict] starts a fresh,
/// independent evaluation for one actor.
pub struct Warden<A, S>
where
    S: RecordStore,
{
    policies: Policies<A, S::Record>,
    store: S,
    config: WardenConfig,
}

impl<A, S> Warden<A, S>
where
    S: RecordStore,
{
    /// Guard `store` with `policies`, using the default configuration
    pub fn new(policies: Policies<A, S::Record>, store: S) -> Self {
        Self {
            policies,
            store,
            config: WardenConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: WardenConfig) -> Self {
        self.policies.set_fallback(if config.paranoid {
            Scope::nothing()
        } else {
            Scope::Unrestricted
        });
        self.config = config;
        self
    }

    /// The guarded store. Access through it is not mediated.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The registered policies
    pub fn policies(&self) -> &Policies<A, S::Record> {
        &self.policies
    }

    /// The active configuration
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Evaluate the policy for `kind` with `actor` and an optional record
    pub fn evaluate(
        &self,
        kind: &str,
        actor: &A,
        record: Option<&S::Record>,
    ) -> WardenResult<PermissionSet> {
        self.policies.evaluate(kind, actor, record)
    }

    /// Begin restricting access for `actor`
    pub fn restrict<'a>(&'a self, actor: &'a A) -> Restrict<'a, A, S> {
        Restrict {
            warden: self,
            actor,
            strategy: self.config.strategy.strategy(),
        }
    }
}

/// A pending restriction: an actor plus the strategy its proxies will use
pub struct Restrict<'a, A, S>
where
    S: RecordStore,
{
    warden: &'a Warden<A, S>,
    actor: &'a A,
    strategy: Arc<dyn AccessStrategy>,
}

impl<'a, A, S> Restrict<'a, A, S>
where
    S: RecordStore,
{
    /// Use a custom strategy for forbidden field access
    pub fn strategy(mut self, strategy: impl AccessStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    /// Raise on forbidden field access
    pub fn strict(self) -> Self {
        self.strategy(Strict)
    }

    /// Conceal forbidden fields and drop forbidden writes
    pub fn implicit(self) -> Self {
        self.strategy(Implicit)
    }

    /// Restrict a whole kind of record
    pub fn kind(self, kind: impl Into<String>) -> WardenResult<CollectionProxy<'a, A, S>> {
        CollectionProxy::new(self.warden, self.actor, self.strategy, kind.into())
    }

    /// Restrict a single record, saved or not
    pub fn record(self, record: S::Record) -> WardenResult<InstanceProxy<'a, A, S>> {
        InstanceProxy::new(self.warden, self.actor, self.strategy, record)
    }
}

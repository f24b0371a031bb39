use std::sync::Arc;

use warden_store::{
    Attributes, ID_FIELD, Query, RecordStore, Restriction, StoreError, Value,
};

use crate::{
    Ability, AccessStrategy, Operation, PermissionSet, Warden, WardenResult,
};

use super::{Forcing, InstanceProxy, prepare};

/// Mediates access to every record of one kind.
///
/// Reads are issued as queries rewritten with the actor's fetch scope, so the
/// store never returns a record outside of it. Every record read is wrapped
/// in an [InstanceProxy] with permissions evaluated for that record.
pub struct CollectionProxy<'a, A, S>
where
    S: RecordStore,
{
    warden: &'a Warden<A, S>,
    actor: &'a A,
    strategy: Arc<dyn AccessStrategy>,
    permissions: PermissionSet,
    query: Query,
}

impl<'a, A, S> CollectionProxy<'a, A, S>
where
    S: RecordStore,
{
    pub(crate) fn new(
        warden: &'a Warden<A, S>,
        actor: &'a A,
        strategy: Arc<dyn AccessStrategy>,
        kind: String,
    ) -> WardenResult<Self> {
        let permissions = warden.evaluate(&kind, actor, None)?;
        Ok(Self {
            warden,
            actor,
            strategy,
            permissions,
            query: Query::new(kind),
        })
    }

    /// The kind of record this proxy mediates
    pub fn kind(&self) -> &str {
        &self.query.kind
    }

    /// Permissions evaluated without a record
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Narrow subsequent reads with an additional restriction. The fetch
    /// scope still applies.
    pub fn filter(mut self, restriction: Restriction) -> Self {
        self.query = self.query.filter(restriction);
        self
    }

    /// Bound the number of records subsequent reads return
    pub fn limit(mut self, limit: usize) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    /// The query as it is sent to the store
    pub fn query(&self) -> Query {
        self.query
            .clone()
            .scoped(self.permissions.scope_for(Operation::Fetch))
    }

    /// Every record within the fetch scope
    pub async fn all(&self) -> WardenResult<Vec<InstanceProxy<'a, A, S>>> {
        let query = self.query();
        tracing::debug!(kind = %query.kind, restriction = %query.restriction, "fetching");
        self.warden
            .store()
            .select(&query)
            .await?
            .into_iter()
            .map(|record| self.wrap(record))
            .collect()
    }

    /// The number of records within the fetch scope
    pub async fn count(&self) -> WardenResult<usize> {
        Ok(self.warden.store().count(&self.query()).await?)
    }

    /// True if at least one record is within the fetch scope
    pub async fn exists(&self) -> WardenResult<bool> {
        Ok(self.count().await? > 0)
    }

    /// The first record within the fetch scope, if any
    pub async fn first(&self) -> WardenResult<Option<InstanceProxy<'a, A, S>>> {
        let query = self.query().limit(1);
        self.warden
            .store()
            .select(&query)
            .await?
            .into_iter()
            .next()
            .map(|record| self.wrap(record))
            .transpose()
    }

    /// The record with the given identity. Records outside of the fetch
    /// scope are reported as not found.
    pub async fn find(&self, id: impl Into<Value>) -> WardenResult<InstanceProxy<'a, A, S>> {
        let query = self.query().filter(Restriction::eq(ID_FIELD, id)).limit(1);
        match self.warden.store().select(&query).await?.into_iter().next() {
            Some(record) => self.wrap(record),
            None => Err(StoreError::NotFound.into()),
        }
    }

    /// True if the actor may supply at least one field on creation
    pub fn creatable(&self) -> bool {
        self.permissions.permits_any(&Ability::Create)
    }

    /// Create a record from `attributes`.
    ///
    /// Every supplied field must be permitted for creation. Forced values are
    /// then merged in, overriding whatever was supplied, and every creation
    /// constraint is checked before the store is asked to persist anything.
    pub async fn create(&self, attributes: Attributes) -> WardenResult<InstanceProxy<'a, A, S>> {
        let attributes = prepare(&self.permissions, &Ability::Create, attributes, Forcing::All)?;
        let record = self
            .warden
            .store()
            .create(self.kind(), attributes)
            .await?;
        tracing::debug!(kind = self.kind(), "created record");
        self.wrap(record)
    }

    fn wrap(&self, record: S::Record) -> WardenResult<InstanceProxy<'a, A, S>> {
        InstanceProxy::new(self.warden, self.actor, self.strategy.clone(), record)
    }
}

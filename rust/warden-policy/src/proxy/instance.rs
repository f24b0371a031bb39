use std::sync::Arc;

use serde::{Serialize, Serializer};
use warden_store::{Attributes, ID_FIELD, Record, RecordStore, Value};

use crate::{
    Ability, AccessStrategy, Operation, PermissionSet, Warden, WardenError, WardenResult,
};

use super::{Forcing, prepare};

/// Mediates access to a single record.
///
/// The proxy owns the record, its pending changes and a [PermissionSet]
/// evaluated for exactly this actor and record. A record that was never
/// saved is evaluated without a record, the same way a [crate::CollectionProxy]
/// decides creation. Permissions are evaluated again whenever the record is
/// saved.
pub struct InstanceProxy<'a, A, S>
where
    S: RecordStore,
{
    warden: &'a Warden<A, S>,
    actor: &'a A,
    strategy: Arc<dyn AccessStrategy>,
    record: S::Record,
    permissions: PermissionSet,
    changes: Attributes,
}

impl<'a, A, S> InstanceProxy<'a, A, S>
where
    S: RecordStore,
{
    pub(crate) fn new(
        warden: &'a Warden<A, S>,
        actor: &'a A,
        strategy: Arc<dyn AccessStrategy>,
        record: S::Record,
    ) -> WardenResult<Self> {
        // Unsaved records are evaluated like the kind as a whole
        let subject = if record.is_new() { None } else { Some(&record) };
        let permissions = warden.evaluate(record.kind(), actor, subject)?;
        Ok(Self {
            warden,
            actor,
            strategy,
            record,
            permissions,
            changes: Attributes::new(),
        })
    }

    /// The wrapped record, as last loaded or saved
    pub fn record(&self) -> &S::Record {
        &self.record
    }

    /// Give up mediation and take the wrapped record
    pub fn into_record(self) -> S::Record {
        self.record
    }

    /// Permissions evaluated for this record
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Assignments not yet saved
    pub fn changes(&self) -> &Attributes {
        &self.changes
    }

    /// True if `field` is permitted under `ability`
    pub fn can(&self, ability: &Ability, field: &str) -> bool {
        self.permissions.is_permitted(ability, field)
    }

    /// True if `field` may be read
    pub fn readable(&self, field: &str) -> bool {
        self.can(&Ability::View, field)
    }

    /// Read a field. A pending assignment is returned in place of the stored
    /// value. Reading a forbidden field defers to the access strategy.
    pub fn get(&self, field: &str) -> WardenResult<Option<Value>> {
        if !self.readable(field) {
            tracing::debug!(field, strategy = ?self.strategy, "read denied");
            return self.strategy.on_forbidden_read(field);
        }
        Ok(self
            .changes
            .get(field)
            .or_else(|| self.record.read(field))
            .cloned())
    }

    /// Assign a field without saving. Nothing is validated until the record
    /// is saved. Assigning a forbidden field defers to the access strategy.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> WardenResult<()> {
        let field = field.into();
        let ability = self.writing();
        if !self.can(&ability, &field) {
            tracing::debug!(field = %field, %ability, strategy = ?self.strategy, "write denied");
            return self.strategy.on_forbidden_write(&ability, &field);
        }
        self.changes.insert(field, value.into());
        Ok(())
    }

    /// Every readable field with its current value, including the identity
    pub fn attributes(&self) -> Attributes {
        let mut attributes = self.record.attributes();
        attributes.extend(self.changes.clone());
        if let Some(id) = self.record.id() {
            attributes.insert(ID_FIELD.to_owned(), id.clone());
        }
        attributes.retain(|field, _| self.readable(field));
        attributes
    }

    /// Assign every attribute and save. On failure nothing is assigned.
    pub async fn update(&mut self, attributes: Attributes) -> WardenResult<()> {
        let mut changes = self.changes.clone();
        changes.extend(attributes);
        self.persist(changes).await
    }

    /// Persist pending assignments. A record that was never saved is created
    /// instead.
    pub async fn save(&mut self) -> WardenResult<()> {
        self.persist(self.changes.clone()).await
    }

    /// Delete the record. The record must satisfy the delete scope as it
    /// currently stands; otherwise the store is never contacted.
    pub async fn destroy(self) -> WardenResult<()> {
        if !self.destroyable() {
            tracing::debug!(kind = self.record.kind(), "destroy outside of scope");
            return Err(WardenError::out_of_scope(Operation::Delete));
        }
        self.warden.store().destroy(&self.record).await?;
        tracing::debug!(kind = self.record.kind(), "destroyed record");
        Ok(())
    }

    /// True if the record satisfies the fetch scope
    pub fn visible(&self) -> bool {
        self.permissions
            .scope_for(Operation::Fetch)
            .permits(&self.record)
    }

    /// True if the actor may supply at least one field when creating a record
    /// of this kind
    pub fn creatable(&self) -> WardenResult<bool> {
        Ok(self
            .warden
            .evaluate(self.record.kind(), self.actor, None)?
            .permits_any(&Ability::Create))
    }

    /// True if at least one field of this record may be updated
    pub fn modifiable(&self) -> bool {
        self.permissions.permits_any(&Ability::Update)
    }

    /// True if the record satisfies the delete scope
    pub fn destroyable(&self) -> bool {
        self.permissions
            .scope_for(Operation::Delete)
            .permits(&self.record)
    }

    fn writing(&self) -> Ability {
        if self.record.is_new() {
            Ability::Create
        } else {
            Ability::Update
        }
    }

    async fn persist(&mut self, changes: Attributes) -> WardenResult<()> {
        let store = self.warden.store();
        let record = if self.record.is_new() {
            let mut attributes = self.record.attributes();
            attributes.extend(changes);
            let attributes = prepare(
                &self.permissions,
                &Ability::Create,
                attributes,
                Forcing::All,
            )?;
            store.create(self.record.kind(), attributes).await?
        } else {
            if changes.is_empty() {
                return Ok(());
            }
            let attributes = prepare(
                &self.permissions,
                &Ability::Update,
                changes,
                Forcing::Supplied,
            )?;
            store.update(&self.record, attributes).await?
        };

        self.permissions = self.warden.evaluate(record.kind(), self.actor, Some(&record))?;
        self.record = record;
        self.changes.clear();
        tracing::debug!(kind = self.record.kind(), "saved record");

        Ok(())
    }
}

impl<A, S> Serialize for InstanceProxy<'_, A, S>
where
    S: RecordStore,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        self.attributes().serialize(serializer)
    }
}

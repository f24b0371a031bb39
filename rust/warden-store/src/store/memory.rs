use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Attributes, Document, Query, Record, StoreError, ValidationFailure, Value};

use super::RecordStore;

#[derive(Default)]
struct MemoryState {
    last_id: u128,
    records: Vec<Document>,
}

/// A trivial implementation of [RecordStore] where all [Document]s are kept
/// in memory and never persisted.
///
/// Clones share the same underlying records. Identities are assigned from an
/// incrementing counter. Fields registered with [MemoryRecordStore::with_unique]
/// are checked on every write and violations are reported as
/// [StoreError::Rejected].
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    state: Arc<Mutex<MemoryState>>,
    unique: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryRecordStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to be unique among records of `kind`
    pub fn with_unique(mut self, kind: impl Into<String>, field: impl Into<String>) -> Self {
        self.unique
            .entry(kind.into())
            .or_default()
            .insert(field.into());
        self
    }

    /// Look a record up by kind and identity, bypassing any scope
    pub async fn fetch(&self, kind: &str, id: impl Into<Value>) -> Option<Document> {
        let id = id.into();
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .find(|record| record.kind() == kind && record.id() == Some(&id))
            .cloned()
    }

    /// Total number of records held, across all kinds
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// True if no record is held
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_unique(
        &self,
        records: &[Document],
        candidate: &Document,
    ) -> Result<(), StoreError> {
        let Some(fields) = self.unique.get(candidate.kind()) else {
            return Ok(());
        };

        let failures = fields
            .iter()
            .filter(|field| {
                let Some(value) = candidate.field(field) else {
                    return false;
                };
                records.iter().any(|other| {
                    other.kind() == candidate.kind()
                        && other.id() != candidate.id()
                        && other
                            .field(field)
                            .is_some_and(|existing| existing.equivalent(value))
                })
            })
            .map(|field| ValidationFailure::new(field.as_str(), "has already been taken"))
            .collect::<Vec<_>>();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Rejected(failures))
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl RecordStore for MemoryRecordStore {
    type Record = Document;

    async fn select(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        tracing::trace!(kind = %query.kind, restriction = %query.restriction, "select");
        let state = self.state.lock().await;
        let matching = state.records.iter().filter(|record| query.matches(*record));
        Ok(match query.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    async fn create(&self, kind: &str, attributes: Attributes) -> Result<Document, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.last_id + 1;
        let record = Document::persisted(kind, id, attributes);

        self.check_unique(&state.records, &record)?;

        tracing::trace!(kind, id = %id, "create");
        state.last_id = id;
        state.records.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        record: &Document,
        attributes: Attributes,
    ) -> Result<Document, StoreError> {
        let mut state = self.state.lock().await;
        let Some(index) = state
            .records
            .iter()
            .position(|stored| stored.kind() == record.kind() && stored.id() == record.id())
        else {
            return Err(StoreError::NotFound);
        };

        let mut updated = state.records[index].clone();
        updated.assign(attributes);
        self.check_unique(&state.records, &updated)?;

        tracing::trace!(kind = record.kind(), "update");
        state.records[index] = updated.clone();
        Ok(updated)
    }

    async fn destroy(&self, record: &Document) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let before = state.records.len();
        state
            .records
            .retain(|stored| !(stored.kind() == record.kind() && stored.id() == record.id()));

        if state.records.len() == before {
            return Err(StoreError::NotFound);
        }

        tracing::trace!(kind = record.kind(), "destroy");
        Ok(())
    }
}

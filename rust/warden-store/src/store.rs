use async_trait::async_trait;

use crate::{Attributes, ConditionalSync, Query, Record, StoreError};

mod memory;
pub use memory::*;

/// A [RecordStore] is the facade over whatever actually persists records.
///
/// It executes already-scoped queries and attempts mutations. It performs its
/// own lower-level validation (uniqueness and the like) and reports failures
/// as [StoreError]; it never makes authorization decisions.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RecordStore: ConditionalSync {
    /// The record type produced by this store
    type Record: Record;

    /// Execute the query and return every matching record
    async fn select(&self, query: &Query) -> Result<Vec<Self::Record>, StoreError>;

    /// Count the records matching the query
    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        Ok(self.select(query).await?.len())
    }

    /// Attempt to persist a new record of the given kind
    async fn create(&self, kind: &str, attributes: Attributes)
    -> Result<Self::Record, StoreError>;

    /// Attempt to apply the attributes to an existing record, returning the
    /// record as stored afterwards
    async fn update(
        &self,
        record: &Self::Record,
        attributes: Attributes,
    ) -> Result<Self::Record, StoreError>;

    /// Attempt to remove an existing record
    async fn destroy(&self, record: &Self::Record) -> Result<(), StoreError>;
}

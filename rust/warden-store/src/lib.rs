#![warn(missing_docs)]

//! The record store boundary that the warden authorization layer mediates.
//!
//! Nothing in this crate makes authorization decisions. It describes the
//! shape of the collaborator that actually holds records:
//!
//! - a [Record] is any type that can report its kind, identity and field
//!   values;
//! - a [Restriction] is a composable predicate over record fields, and a
//!   [Scope] is either "no restriction" or one such predicate;
//! - a [Query] names a kind of record plus the restriction to execute;
//! - a [RecordStore] executes queries and attempts create, update and
//!   destroy operations, reporting failures as [StoreError].
//!
//! [MemoryRecordStore] is a volatile [RecordStore] over [Document] records.

mod sync;
pub use sync::*;

mod error;
pub use error::*;

mod value;
pub use value::*;

mod record;
pub use record::*;

mod restriction;
pub use restriction::*;

mod query;
pub use query::*;

mod store;
pub use store::*;

#![warn(missing_docs)]

//! Declarative, context-sensitive authorization over persisted records.
//!
//! Each kind of record gets one policy block: a function of the acting
//! subject (the "actor") and, when one exists, the record being accessed. The
//! block declares what applies to that pair through a [PermissionBuilder]:
//!
//! - **scopes** rewrite the queries issued for an [Operation] (which records
//!   may be fetched or deleted at all);
//! - **grants** and **revocations** decide, per [Ability] and field, what may
//!   be viewed, created or updated. Later declarations win;
//! - **constraints** attached to granted fields validate (or force) the
//!   values being written.
//!
//! A [Warden] ties a policy registry to a [RecordStore]. Restricting a kind
//! yields a [CollectionProxy]; restricting a record yields an
//! [InstanceProxy]. Every operation through a proxy is checked against a
//! [PermissionSet] evaluated for that exact actor and record.
//!
//! ```rust
//! use warden_policy::{Ability, Constraint, Operation, Policies, Warden};
//! use warden_store::{Document, MemoryRecordStore, Restriction};
//!
//! struct User {
//!     id: u64,
//! }
//!
//! let mut policies = Policies::<User, Document>::new();
//! policies.register("notes", |user: &User, _note: Option<&Document>, can| {
//!     can.scope(Operation::Fetch, Restriction::eq("owner_id", user.id))
//!         .grant(Ability::View, ["id", "body"])
//!         .grant(Ability::Create, "body")
//!         .grant_with(Ability::Create, "owner_id", Constraint::forced(user.id));
//! });
//!
//! let warden = Warden::new(policies, MemoryRecordStore::new());
//! let permissions = warden.evaluate("notes", &User { id: 1 }, None).unwrap();
//!
//! assert!(permissions.is_permitted(&Ability::View, "body"));
//! assert!(!permissions.is_permitted(&Ability::View, "owner_id"));
//! ```
//!
//! [RecordStore]: warden_store::RecordStore

mod error;
pub use error::*;

mod ability;
pub use ability::*;

mod constraint;
pub use constraint::*;

mod evaluator;

mod permission;
pub use permission::*;

mod registry;
pub use registry::*;

mod strategy;
pub use strategy::*;

mod config;
pub use config::*;

mod warden;
pub use warden::*;

mod proxy;
pub use proxy::*;

#![allow(dead_code)]

use warden_policy::{Ability, Constraint, Fields, Operation, Policies, Warden};
use warden_store::{Attributes, Document, MemoryRecordStore, Record, RecordStore, Restriction, Value};

pub const DUMMIES: &str = "dummies";

pub struct User {
    pub id: u64,
    pub admin: bool,
}

impl User {
    pub fn member(id: u64) -> Self {
        Self { id, admin: false }
    }

    pub fn admin(id: u64) -> Self {
        Self { id, admin: true }
    }
}

fn owns(user: &User, dummy: Option<&Document>) -> bool {
    dummy
        .and_then(|dummy| dummy.read("owner_id"))
        .is_some_and(|owner| owner.equivalent(&Value::from(user.id)))
}

/// Administrators may do anything. Everyone else sees their own dummies and
/// any dummy below secrecy level 5, may only delete their own, and never
/// sees the secrecy level of somebody else's dummy.
pub fn policies() -> Policies<User, Document> {
    let mut policies = Policies::new();
    policies.register(DUMMIES, |user: &User, dummy: Option<&Document>, can| {
        if user.admin {
            can.grant(Ability::View, Fields::All)
                .grant(Ability::Create, Fields::All)
                .grant(Ability::Update, Fields::All);
            return;
        }

        can.scope(
            Operation::Fetch,
            Restriction::eq("owner_id", user.id).or(Restriction::lt("secrecy_level", 5)),
        )
        .scope(Operation::Delete, Restriction::eq("owner_id", user.id))
        .grant(Ability::View, ["id", "title", "owner_id"])
        .grant(Ability::Create, "title")
        .grant_with(Ability::Create, "owner_id", Constraint::forced(user.id))
        .grant_with(Ability::Create, "secrecy_level", Constraint::range(0, 4))
        .grant(Ability::Update, "title")
        .grant_with(Ability::Update, "secrecy_level", Constraint::range(0, 4));

        if owns(user, dummy) {
            can.grant(Ability::View, "secrecy_level");
        }
    });
    policies
}

pub fn warden() -> Warden<User, MemoryRecordStore> {
    Warden::new(policies(), MemoryRecordStore::new())
}

pub fn attributes<const N: usize>(pairs: [(&str, Value); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_owned(), value))
        .collect()
}

/// Store a dummy directly, without any mediation
pub async fn seed(
    warden: &Warden<User, MemoryRecordStore>,
    owner: &User,
    secrecy_level: i64,
) -> anyhow::Result<Document> {
    Ok(warden
        .store()
        .create(
            DUMMIES,
            attributes([
                ("title", format!("secret {secrecy_level}").into()),
                ("owner_id", owner.id.into()),
                ("secrecy_level", secrecy_level.into()),
            ]),
        )
        .await?)
}

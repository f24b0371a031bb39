mod common;

use anyhow::Result;
use common::{DUMMIES, User, attributes, policies, seed, warden};
use pretty_assertions::assert_eq;
use warden_policy::{Ability, Constraint, Fields, Warden, WardenError};
use warden_store::{
    Document, MemoryRecordStore, Record, RecordStore, StoreError, ValidationFailure, Value,
};

#[tokio::test]
async fn it_forces_the_owner_on_creation() -> Result<()> {
    let warden = warden();
    let john = User::member(1);

    let dummies = warden.restrict(&john).kind(DUMMIES)?;
    assert!(dummies.creatable());

    let created = dummies
        .create(attributes([
            ("title", "mine".into()),
            ("owner_id", 7u64.into()),
            ("secrecy_level", 2i64.into()),
        ]))
        .await?;

    assert_eq!(created.record().read("owner_id"), Some(&Value::from(1u64)));
    assert_eq!(created.get("title")?, Some(Value::from("mine")));
    assert_eq!(created.get("secrecy_level")?, Some(Value::from(2i64)));

    let created = dummies
        .create(attributes([("title", "untouched".into())]))
        .await?;
    assert_eq!(created.record().read("owner_id"), Some(&Value::from(1u64)));

    Ok(())
}

#[tokio::test]
async fn it_rejects_attributes_that_are_not_granted() -> Result<()> {
    let warden = warden();
    let john = User::member(1);

    let result = warden
        .restrict(&john)
        .kind(DUMMIES)?
        .create(attributes([
            ("title", "fine".into()),
            ("published", true.into()),
            ("archived", false.into()),
        ]))
        .await;

    assert_eq!(
        result.err(),
        Some(WardenError::forbidden(
            Ability::Create,
            vec!["archived".into(), "published".into()]
        ))
    );
    assert!(warden.store().is_empty().await);

    Ok(())
}

#[tokio::test]
async fn it_reports_every_failed_constraint() -> Result<()> {
    let mut policies = policies();
    policies.register("tickets", |_: &User, _: Option<&Document>, can| {
        can.grant_with(Ability::Create, "priority", Constraint::range(1, 3))
            .grant_with(
                Ability::Create,
                "state",
                Constraint::one_of(["open", "closed"]),
            );
    });
    let warden = Warden::new(policies, MemoryRecordStore::new());
    let reporter = User::member(1);

    let result = warden
        .restrict(&reporter)
        .kind("tickets")?
        .create(attributes([
            ("priority", 9i64.into()),
            ("state", "lost".into()),
        ]))
        .await;

    assert_eq!(
        result.err(),
        Some(WardenError::Validation(vec![
            ValidationFailure::new("priority", "must be between 1 and 3"),
            ValidationFailure::new("state", "must be one of \"open\", \"closed\""),
        ]))
    );
    assert!(warden.store().is_empty().await);

    Ok(())
}

#[tokio::test]
async fn it_forwards_store_failures_unchanged() -> Result<()> {
    let warden = Warden::new(
        policies(),
        MemoryRecordStore::new().with_unique(DUMMIES, "title"),
    );
    let john = User::member(1);
    let dummies = warden.restrict(&john).kind(DUMMIES)?;

    dummies.create(attributes([("title", "taken".into())])).await?;
    let result = dummies.create(attributes([("title", "taken".into())])).await;

    assert_eq!(
        result.err(),
        Some(WardenError::Store(StoreError::Rejected(vec![
            ValidationFailure::new("title", "has already been taken")
        ])))
    );

    Ok(())
}

#[tokio::test]
async fn it_validates_updates_per_actor() -> Result<()> {
    let warden = warden();
    let john = User::member(1);
    let admin = User::admin(2);

    let dummy = seed(&warden, &john, 0).await?;
    let id = dummy.id().cloned().unwrap_or_default();

    let mut as_john = warden.restrict(&john).strict().record(dummy.clone())?;
    assert!(as_john.modifiable());
    let result = as_john
        .update(attributes([("secrecy_level", 8i64.into())]))
        .await;
    assert_eq!(
        result,
        Err(WardenError::Validation(vec![ValidationFailure::new(
            "secrecy_level",
            "must be between 0 and 4"
        )]))
    );
    assert!(as_john.changes().is_empty());
    assert_eq!(as_john.get("secrecy_level")?, Some(Value::from(0i64)));

    let mut as_admin = warden.restrict(&admin).strict().record(dummy)?;
    as_admin
        .update(attributes([("secrecy_level", 10i64.into())]))
        .await?;
    assert_eq!(as_admin.get("secrecy_level")?, Some(Value::from(10i64)));

    let stored = warden.store().fetch(DUMMIES, id).await;
    assert_eq!(
        stored.and_then(|dummy| dummy.read("secrecy_level").cloned()),
        Some(Value::from(10i64))
    );

    Ok(())
}

#[tokio::test]
async fn it_refuses_updates_of_fields_that_are_not_granted() -> Result<()> {
    let warden = warden();
    let john = User::member(1);
    let dummy = seed(&warden, &john, 0).await?;

    let mut proxy = warden.restrict(&john).record(dummy.clone())?;
    let result = proxy
        .update(attributes([
            ("title", "renamed".into()),
            ("owner_id", 2u64.into()),
        ]))
        .await;

    assert_eq!(
        result,
        Err(WardenError::forbidden(Ability::Update, vec!["owner_id".into()]))
    );
    assert_eq!(
        warden.store().fetch(DUMMIES, dummy.id().cloned()).await,
        Some(dummy)
    );

    Ok(())
}

#[tokio::test]
async fn it_saves_pending_assignments() -> Result<()> {
    let warden = warden();
    let john = User::member(1);
    let dummy = seed(&warden, &john, 0).await?;

    let mut proxy = warden.restrict(&john).record(dummy)?;
    proxy.set("title", "renamed")?;
    proxy.set("secrecy_level", 4i64)?;

    assert_eq!(proxy.get("title")?, Some(Value::from("renamed")));
    assert_eq!(proxy.record().read("title"), Some(&Value::from("secret 0")));

    proxy.save().await?;

    assert!(proxy.changes().is_empty());
    assert_eq!(proxy.record().read("title"), Some(&Value::from("renamed")));
    assert_eq!(proxy.record().read("secrecy_level"), Some(&Value::from(4i64)));

    Ok(())
}

#[tokio::test]
async fn it_creates_unsaved_records_on_save() -> Result<()> {
    let warden = warden();
    let john = User::member(1);

    let mut proxy = warden
        .restrict(&john)
        .record(Document::new(DUMMIES).with("title", "draft"))?;
    assert!(proxy.creatable()?);
    proxy.set("secrecy_level", 1i64)?;
    proxy.save().await?;

    assert!(!proxy.record().is_new());
    assert_eq!(proxy.record().read("owner_id"), Some(&Value::from(1u64)));
    assert_eq!(warden.store().len().await, 1);

    Ok(())
}

#[tokio::test]
async fn it_never_forces_revoked_fields() -> Result<()> {
    let mut policies = policies();
    policies.register("notes", |user: &User, _: Option<&Document>, can| {
        can.grant(Ability::View, Fields::All)
            .grant(Ability::Create, "body")
            .grant_with(Ability::Create, "owner_id", Constraint::forced(user.id))
            .revoke(Ability::Create, "owner_id");
    });
    let warden = Warden::new(policies, MemoryRecordStore::new());
    let writer = User::member(1);

    let note = warden
        .restrict(&writer)
        .kind("notes")?
        .create(attributes([("body", "x".into())]))
        .await?;

    assert_eq!(note.record().read("owner_id"), None);
    assert_eq!(note.get("body")?, Some(Value::from("x")));

    Ok(())
}

#[tokio::test]
async fn it_refuses_creation_when_nothing_is_creatable() -> Result<()> {
    let mut policies = policies();
    policies.register("archives", |user: &User, _: Option<&Document>, can| {
        can.grant_with(Ability::Create, "owner_id", Constraint::forced(user.id))
            .revoke(Ability::Create, Fields::All);
    });
    let warden = Warden::new(policies, MemoryRecordStore::new());
    let writer = User::member(1);

    let archives = warden.restrict(&writer).kind("archives")?;
    assert!(!archives.creatable());

    let result = archives.create(attributes([])).await;

    assert_eq!(result.err(), Some(WardenError::not_permitted(Ability::Create)));
    assert!(warden.store().is_empty().await);

    Ok(())
}

#[tokio::test]
async fn it_ignores_prefilled_fields_when_deciding_creation() -> Result<()> {
    let mut policies = policies();
    policies.register("journals", |user: &User, journal: Option<&Document>, can| {
        can.grant(Ability::View, Fields::All).grant(Ability::Create, "body");
        let owned = journal
            .and_then(|journal| journal.read("owner_id"))
            .is_some_and(|owner| owner.equivalent(&Value::from(user.id)));
        if owned {
            can.grant(Ability::Create, "owner_id");
        }
    });
    let warden = Warden::new(policies, MemoryRecordStore::new());
    let writer = User::member(1);
    let unsaved = Document::new("journals")
        .with("body", "dear diary")
        .with("owner_id", 1u64);

    let mut journal = warden.restrict(&writer).record(unsaved.clone())?;
    assert!(journal.creatable()?);
    assert!(!journal.can(&Ability::Create, "owner_id"));
    assert_eq!(
        journal.set("owner_id", 1u64),
        Err(WardenError::forbidden(Ability::Create, vec!["owner_id".into()]))
    );

    let denial = WardenError::forbidden(Ability::Create, vec!["owner_id".into()]);
    assert_eq!(journal.save().await, Err(denial.clone()));

    let through_collection = warden
        .restrict(&writer)
        .kind("journals")?
        .create(unsaved.attributes())
        .await;
    assert_eq!(through_collection.err(), Some(denial));
    assert!(warden.store().is_empty().await);

    Ok(())
}

#[tokio::test]
async fn it_reports_every_failed_constraint_on_update() -> Result<()> {
    let mut policies = policies();
    policies.register("tickets", |_: &User, _: Option<&Document>, can| {
        can.grant(Ability::View, Fields::All)
            .grant_with(Ability::Update, "priority", Constraint::range(1, 3))
            .grant_with(
                Ability::Update,
                "state",
                Constraint::one_of(["open", "closed"]),
            );
    });
    let warden = Warden::new(policies, MemoryRecordStore::new());
    let reporter = User::member(1);

    let ticket = warden
        .store()
        .create(
            "tickets",
            attributes([("priority", 1i64.into()), ("state", "open".into())]),
        )
        .await?;

    let mut proxy = warden.restrict(&reporter).record(ticket.clone())?;
    let result = proxy
        .update(attributes([
            ("priority", 9i64.into()),
            ("state", "lost".into()),
        ]))
        .await;

    assert_eq!(
        result,
        Err(WardenError::Validation(vec![
            ValidationFailure::new("priority", "must be between 1 and 3"),
            ValidationFailure::new("state", "must be one of \"open\", \"closed\""),
        ]))
    );
    assert_eq!(
        warden.store().fetch("tickets", ticket.id().cloned()).await,
        Some(ticket)
    );

    Ok(())
}

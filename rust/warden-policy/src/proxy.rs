//! Mediating wrappers through which records are accessed on behalf of an
//! actor.
//!
//! Writes through either proxy pass the same gate before the store is
//! contacted: every supplied field must be permitted, forced values are
//! applied, and then every constraint is checked. Denials and validation
//! failures are reported in full rather than stopping at the first one.

use warden_store::{Attributes, ValidationFailure};

use crate::{Ability, PermissionSet, WardenError, WardenResult};

mod collection;
pub use collection::*;

mod instance;
pub use instance::*;

/// How forced values are applied to a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Forcing {
    /// Every forced value is written, supplied or not
    All,
    /// Forced values only replace fields that are being written
    Supplied,
}

/// Check, complete and validate the attributes of a write under `ability`.
/// A write is refused outright when no field is permitted under `ability`,
/// even if it supplies nothing.
pub(crate) fn prepare(
    permissions: &PermissionSet,
    ability: &Ability,
    mut attributes: Attributes,
    forcing: Forcing,
) -> WardenResult<Attributes> {
    if !permissions.permits_any(ability) {
        tracing::debug!(%ability, "ability not granted");
        return Err(WardenError::not_permitted(ability.clone()));
    }

    let denied = permissions.denied(ability, attributes.keys().map(String::as_str));
    if !denied.is_empty() {
        tracing::debug!(%ability, ?denied, "write denied");
        return Err(WardenError::forbidden(ability.clone(), denied));
    }

    for (field, value) in permissions.forced_values(ability) {
        if forcing == Forcing::All || attributes.contains_key(&field) {
            attributes.insert(field, value);
        }
    }

    validate(permissions, ability, &attributes)?;

    Ok(attributes)
}

fn validate(
    permissions: &PermissionSet,
    ability: &Ability,
    attributes: &Attributes,
) -> WardenResult<()> {
    let failures = attributes
        .iter()
        .flat_map(|(field, value)| {
            permissions
                .validators_for(ability, field)
                .iter()
                .filter_map(move |constraint| {
                    constraint
                        .check(value)
                        .err()
                        .map(|reason| ValidationFailure::new(field.as_str(), reason))
                })
        })
        .collect::<Vec<_>>();

    if failures.is_empty() {
        Ok(())
    } else {
        tracing::debug!(%ability, count = failures.len(), "write failed validation");
        Err(WardenError::Validation(failures))
    }
}

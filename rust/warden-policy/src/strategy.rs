use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warden_store::{ConditionalSend, ConditionalSync, Value};

use crate::{Ability, WardenError, WardenResult};

/// Decides what happens when an [crate::InstanceProxy] touches a field the
/// actor is not permitted to touch.
///
/// The hooks only see field-level denials. Record-level operations (create,
/// save, destroy) raise regardless of the strategy in use.
pub trait AccessStrategy: ConditionalSend + ConditionalSync + Debug {
    /// Called when reading `field` is forbidden. The returned value (if any)
    /// is handed to the caller in place of the real one.
    fn on_forbidden_read(&self, field: &str) -> WardenResult<Option<Value>>;

    /// Called when writing `field` under `ability` is forbidden. Returning
    /// `Ok` discards the assignment.
    fn on_forbidden_write(&self, ability: &Ability, field: &str) -> WardenResult<()>;
}

/// Raise a permission error on any forbidden field access
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl AccessStrategy for Strict {
    fn on_forbidden_read(&self, field: &str) -> WardenResult<Option<Value>> {
        Err(WardenError::forbidden(Ability::View, vec![field.to_owned()]))
    }

    fn on_forbidden_write(&self, ability: &Ability, field: &str) -> WardenResult<()> {
        Err(WardenError::forbidden(ability.clone(), vec![field.to_owned()]))
    }
}

/// Read forbidden fields as absent and silently drop forbidden writes
#[derive(Debug, Clone, Copy, Default)]
pub struct Implicit;

impl AccessStrategy for Implicit {
    fn on_forbidden_read(&self, field: &str) -> WardenResult<Option<Value>> {
        tracing::debug!(field, "concealed forbidden field");
        Ok(None)
    }

    fn on_forbidden_write(&self, ability: &Ability, field: &str) -> WardenResult<()> {
        tracing::debug!(field, %ability, "discarded forbidden assignment");
        Ok(())
    }
}

/// The built-in strategies, by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// See [Strict]
    #[default]
    Strict,
    /// See [Implicit]
    Implicit,
}

impl StrategyKind {
    /// Instantiate the named strategy
    pub fn strategy(&self) -> Arc<dyn AccessStrategy> {
        match self {
            StrategyKind::Strict => Arc::new(Strict),
            StrategyKind::Implicit => Arc::new(Implicit),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Ability, AccessStrategy, Implicit, Strict, StrategyKind, WardenError};

    #[test]
    fn it_raises_under_the_strict_strategy() {
        assert_eq!(
            Strict.on_forbidden_read("secret"),
            Err(WardenError::forbidden(Ability::View, vec!["secret".into()]))
        );
        assert_eq!(
            Strict.on_forbidden_write(&Ability::Update, "secret"),
            Err(WardenError::forbidden(Ability::Update, vec!["secret".into()]))
        );
    }

    #[test]
    fn it_conceals_under_the_implicit_strategy() {
        assert_eq!(Implicit.on_forbidden_read("secret"), Ok(None));
        assert_eq!(Implicit.on_forbidden_write(&Ability::Create, "secret"), Ok(()));
    }

    #[test]
    fn it_defaults_to_strict() -> anyhow::Result<()> {
        assert_eq!(StrategyKind::default(), StrategyKind::Strict);
        assert_eq!(
            serde_json::from_str::<StrategyKind>("\"implicit\"")?,
            StrategyKind::Implicit
        );
        assert!(StrategyKind::Implicit.strategy().on_forbidden_read("x").is_ok());
        Ok(())
    }
}

use std::collections::BTreeMap;

use warden_store::{Attributes, Restriction, Scope, Value};

use crate::evaluator::RuleTable;
use crate::{Ability, Constraint, Fields, Operation};

/// Whether a declaration grants or revokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The fields are permitted
    Grant,
    /// The fields are forbidden
    Revoke,
}

/// One grant or revocation, as declared by a policy block
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Grant or revoke
    pub verdict: Verdict,
    /// The ability being decided
    pub ability: Ability,
    /// The fields being decided
    pub fields: Fields,
    /// Constraints on the named fields (ignored for revocations and for
    /// [Fields::All])
    pub constraints: Vec<Constraint>,
}

impl Declaration {
    /// A declaration without constraints
    pub fn new(verdict: Verdict, ability: Ability, fields: Fields) -> Self {
        Self {
            verdict,
            ability,
            fields,
            constraints: Vec::new(),
        }
    }

    /// Attach constraints to this declaration
    pub fn constrained(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }
}

/// The accumulator a policy block declares into.
///
/// Calls are order sensitive: later grants and revocations override earlier
/// ones for the fields they name, and a later scope for an operation replaces
/// an earlier one.
#[derive(Debug, Default)]
pub struct PermissionBuilder {
    scopes: BTreeMap<Operation, Scope>,
    declarations: Vec<Declaration>,
    fallback: Scope,
}

impl PermissionBuilder {
    /// An empty builder whose undeclared scopes are unrestricted
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty builder whose undeclared scopes resolve to `fallback`
    pub fn with_fallback(fallback: Scope) -> Self {
        Self {
            fallback,
            ..Default::default()
        }
    }

    /// Restrict an operation to records matching `restriction`
    pub fn scope(&mut self, operation: Operation, restriction: Restriction) -> &mut Self {
        self.scopes
            .insert(operation, Scope::Restricted(restriction));
        self
    }

    /// Explicitly leave an operation unrestricted
    pub fn unrestricted(&mut self, operation: Operation) -> &mut Self {
        self.scopes.insert(operation, Scope::Unrestricted);
        self
    }

    /// Grant an ability over some fields
    pub fn grant(&mut self, ability: impl Into<Ability>, fields: impl Into<Fields>) -> &mut Self {
        self.declare(Declaration::new(
            Verdict::Grant,
            ability.into(),
            fields.into(),
        ))
    }

    /// Grant an ability over one field, constraining the values written to it
    pub fn grant_with(
        &mut self,
        ability: impl Into<Ability>,
        field: impl Into<String>,
        constraint: Constraint,
    ) -> &mut Self {
        let field: String = field.into();
        self.declare(
            Declaration::new(Verdict::Grant, ability.into(), Fields::from(field))
                .constrained(vec![constraint]),
        )
    }

    /// Revoke an ability over some fields
    pub fn revoke(&mut self, ability: impl Into<Ability>, fields: impl Into<Fields>) -> &mut Self {
        self.declare(Declaration::new(
            Verdict::Revoke,
            ability.into(),
            fields.into(),
        ))
    }

    /// Append a prepared declaration
    pub fn declare(&mut self, declaration: Declaration) -> &mut Self {
        self.declarations.push(declaration);
        self
    }

    /// Resolve everything declared so far into an immutable [PermissionSet]
    pub fn finish(self) -> PermissionSet {
        let rules = RuleTable::replay(&self.declarations);
        PermissionSet {
            scopes: self.scopes,
            fallback: self.fallback,
            declarations: self.declarations,
            rules,
        }
    }
}

/// The resolved permissions of one actor over one record (or over a kind of
/// record, when no record is involved).
#[derive(Debug, Clone)]
pub struct PermissionSet {
    scopes: BTreeMap<Operation, Scope>,
    fallback: Scope,
    declarations: Vec<Declaration>,
    rules: RuleTable,
}

impl PermissionSet {
    /// True if `field` is permitted under `ability`
    pub fn is_permitted(&self, ability: &Ability, field: &str) -> bool {
        self.rules.is_permitted(ability, field)
    }

    /// True if at least one field is permitted under `ability`
    pub fn permits_any(&self, ability: &Ability) -> bool {
        self.rules.permits_any(ability)
    }

    /// The subset of `fields` that is not permitted under `ability`, in the
    /// order given
    pub fn denied<'a>(
        &self,
        ability: &Ability,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        fields
            .into_iter()
            .filter(|field| !self.is_permitted(ability, field))
            .map(str::to_owned)
            .collect()
    }

    /// Every constraint attached to `field` under `ability`
    pub fn validators_for(&self, ability: &Ability, field: &str) -> &[Constraint] {
        self.rules.validators_for(ability, field)
    }

    /// Literal values that are forced onto fields written under `ability`.
    /// When a field is forced more than once the last declaration wins. A
    /// field whose final decision is a revocation is never forced.
    pub fn forced_values(&self, ability: &Ability) -> Attributes {
        self.rules
            .constrained_fields(ability)
            .filter(|(field, _)| self.is_permitted(ability, field))
            .filter_map(|(field, constraints)| {
                constraints
                    .iter()
                    .rev()
                    .find_map(Constraint::forced_value)
                    .map(|value: &Value| (field.to_owned(), value.clone()))
            })
            .collect()
    }

    /// The scope that applies to `operation`
    pub fn scope_for(&self, operation: Operation) -> &Scope {
        self.scopes.get(&operation).unwrap_or(&self.fallback)
    }

    /// The declarations this set was resolved from, in declaration order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}

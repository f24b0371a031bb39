//! Resolution of grant/revoke declarations into per-field decisions.
//!
//! Declarations are replayed once, in registration order, into a table that
//! holds one slot per named field plus a wildcard slot for every ability. A
//! declaration naming specific fields overwrites those fields' slots. A
//! declaration naming all fields overwrites the wildcard slot and every slot
//! written before it. The decision for a field is its own slot if one was
//! written, otherwise the wildcard, otherwise a denial.

use std::collections::{BTreeMap, HashMap};

use crate::{Ability, Constraint, Declaration, Fields, Verdict};

#[derive(Debug, Clone, Default)]
struct Decisions {
    wildcard: Option<Verdict>,
    fields: HashMap<String, Verdict>,
}

impl Decisions {
    fn record(&mut self, fields: &Fields, verdict: Verdict) {
        match fields {
            Fields::All => {
                self.fields.clear();
                self.wildcard = Some(verdict);
            }
            Fields::Only(names) => {
                for name in names {
                    self.fields.insert(name.clone(), verdict);
                }
            }
        }
    }

    fn resolve(&self, field: &str) -> Verdict {
        self.fields
            .get(field)
            .copied()
            .or(self.wildcard)
            .unwrap_or(Verdict::Revoke)
    }

    fn any_granted(&self) -> bool {
        self.wildcard == Some(Verdict::Grant)
            || self.fields.values().any(|verdict| *verdict == Verdict::Grant)
    }
}

/// Per-ability decisions and field constraints.
///
/// Precedence is strictly temporal: an all-fields declaration overrides every
/// field decided before it, including fields named explicitly, rather than
/// only seeding the fields not yet named.
#[derive(Debug, Clone, Default)]
pub(crate) struct RuleTable {
    decisions: HashMap<Ability, Decisions>,
    validators: HashMap<Ability, BTreeMap<String, Vec<Constraint>>>,
}

impl RuleTable {
    pub(crate) fn replay<'a>(declarations: impl IntoIterator<Item = &'a Declaration>) -> Self {
        let mut table = RuleTable::default();

        for declaration in declarations {
            table
                .decisions
                .entry(declaration.ability.clone())
                .or_default()
                .record(&declaration.fields, declaration.verdict);

            // Constraints are field specific; wildcard grants contribute none
            if let (Verdict::Grant, Fields::Only(names)) = (declaration.verdict, &declaration.fields)
            {
                if declaration.constraints.is_empty() {
                    continue;
                }
                let validators = table
                    .validators
                    .entry(declaration.ability.clone())
                    .or_default();
                for name in names {
                    validators
                        .entry(name.clone())
                        .or_default()
                        .extend(declaration.constraints.iter().cloned());
                }
            }
        }

        table
    }

    pub(crate) fn is_permitted(&self, ability: &Ability, field: &str) -> bool {
        self.decisions
            .get(ability)
            .is_some_and(|decisions| decisions.resolve(field) == Verdict::Grant)
    }

    pub(crate) fn permits_any(&self, ability: &Ability) -> bool {
        self.decisions
            .get(ability)
            .is_some_and(Decisions::any_granted)
    }

    pub(crate) fn validators_for(&self, ability: &Ability, field: &str) -> &[Constraint] {
        self.validators
            .get(ability)
            .and_then(|validators| validators.get(field))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn constrained_fields(
        &self,
        ability: &Ability,
    ) -> impl Iterator<Item = (&str, &[Constraint])> {
        self.validators
            .get(ability)
            .into_iter()
            .flat_map(|validators| validators.iter())
            .map(|(field, constraints)| (field.as_str(), constraints.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Ability, Constraint, Declaration, Fields, Verdict};

    use super::RuleTable;

    fn grant(fields: impl Into<Fields>) -> Declaration {
        Declaration::new(Verdict::Grant, Ability::View, fields.into())
    }

    fn revoke(fields: impl Into<Fields>) -> Declaration {
        Declaration::new(Verdict::Revoke, Ability::View, fields.into())
    }

    fn permitted(declarations: &[Declaration], field: &str) -> bool {
        RuleTable::replay(declarations).is_permitted(&Ability::View, field)
    }

    #[test]
    fn it_denies_everything_without_declarations() {
        assert!(!permitted(&[], "title"));
        assert!(!RuleTable::replay(&[]).permits_any(&Ability::View));
    }

    #[test]
    fn it_lets_a_later_revoke_override_a_wildcard_grant() {
        let declarations = [grant(Fields::All), revoke("secret")];

        assert!(!permitted(&declarations, "secret"));
        assert!(permitted(&declarations, "title"));
    }

    #[test]
    fn it_lets_a_later_wildcard_revoke_override_specific_grants() {
        let declarations = [grant(["title", "body"]), revoke(Fields::All)];

        assert!(!permitted(&declarations, "title"));
        assert!(!RuleTable::replay(&declarations).permits_any(&Ability::View));
    }

    #[test]
    fn it_lets_a_later_specific_grant_override_a_wildcard_revoke() {
        let declarations = [revoke(Fields::All), grant("title")];

        assert!(permitted(&declarations, "title"));
        assert!(!permitted(&declarations, "body"));
    }

    #[test]
    fn it_keeps_earlier_grants_of_unrelated_fields() {
        let declarations = [grant("title"), grant("body"), revoke("body")];

        assert!(permitted(&declarations, "title"));
        assert!(!permitted(&declarations, "body"));
    }

    #[test]
    fn it_keeps_abilities_independent() {
        let table = RuleTable::replay(&[grant(Fields::All)]);

        assert!(table.is_permitted(&Ability::View, "title"));
        assert!(!table.is_permitted(&Ability::Update, "title"));
        assert!(!table.permits_any(&Ability::Create));
    }

    #[test]
    fn it_accumulates_field_specific_constraints() {
        let table = RuleTable::replay(&[
            grant(Fields::All).constrained(vec![Constraint::equals(1)]),
            grant("level").constrained(vec![Constraint::range(0, 4)]),
            grant("level").constrained(vec![Constraint::one_of([1, 2, 3])]),
        ]);

        assert_eq!(table.validators_for(&Ability::View, "level").len(), 2);
        assert!(table.validators_for(&Ability::View, "title").is_empty());
        assert!(table.validators_for(&Ability::Update, "level").is_empty());
        assert_eq!(table.constrained_fields(&Ability::View).count(), 1);
    }
}

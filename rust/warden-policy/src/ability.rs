use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A named category of field-level permission
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ability {
    /// Reading a field
    View,
    /// Supplying a field when a record is created
    Create,
    /// Changing a field of an existing record
    Update,
    /// Application-defined ability; follows the same precedence rules
    Custom(String),
}

impl Ability {
    /// The canonical lowercase name of this ability
    pub fn name(&self) -> &str {
        match self {
            Ability::View => "view",
            Ability::Create => "create",
            Ability::Update => "update",
            Ability::Custom(name) => name,
        }
    }
}

impl Display for Ability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&str> for Ability {
    fn from(value: &str) -> Self {
        match value {
            "view" | "read" => Ability::View,
            "create" => Ability::Create,
            "update" => Ability::Update,
            other => Ability::Custom(other.to_owned()),
        }
    }
}

impl From<&Ability> for Ability {
    fn from(value: &Ability) -> Self {
        value.clone()
    }
}

/// A kind of record-level operation that is governed by a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Enumerating or counting records
    Fetch,
    /// Deleting a record
    Delete,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Fetch => write!(f, "fetch"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// The set of fields a grant or revocation names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fields {
    /// Every field, including ones not known at declaration time
    All,
    /// Exactly the listed fields
    Only(BTreeSet<String>),
}

impl Fields {
    /// Shorthand for [Fields::All]
    pub fn all() -> Self {
        Fields::All
    }

    /// True if `field` is named by this set
    pub fn covers(&self, field: &str) -> bool {
        match self {
            Fields::All => true,
            Fields::Only(fields) => fields.contains(field),
        }
    }
}

impl From<&str> for Fields {
    fn from(value: &str) -> Self {
        Fields::Only(BTreeSet::from([value.to_owned()]))
    }
}

impl From<String> for Fields {
    fn from(value: String) -> Self {
        Fields::Only(BTreeSet::from([value]))
    }
}

impl<const N: usize> From<[&str; N]> for Fields {
    fn from(value: [&str; N]) -> Self {
        Fields::Only(value.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for Fields {
    fn from(value: &[&str]) -> Self {
        Fields::Only(value.iter().map(|field| (*field).to_owned()).collect())
    }
}

impl From<Vec<String>> for Fields {
    fn from(value: Vec<String>) -> Self {
        Fields::Only(value.into_iter().collect())
    }
}

impl From<Vec<&str>> for Fields {
    fn from(value: Vec<&str>) -> Self {
        Fields::Only(value.into_iter().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Ability, Fields};

    #[test]
    fn it_parses_ability_names() {
        assert_eq!(Ability::from("read"), Ability::View);
        assert_eq!(Ability::from("update"), Ability::Update);
        assert_eq!(Ability::from("publish"), Ability::Custom("publish".into()));
        assert_eq!(Ability::Custom("publish".into()).to_string(), "publish");
    }

    #[test]
    fn it_covers_named_fields() {
        let fields = Fields::from(["title", "body"]);

        assert!(fields.covers("title"));
        assert!(!fields.covers("owner_id"));
        assert!(Fields::all().covers("anything"));
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConditionalSend, ConditionalSync, Value};

/// Name under which a record's identity is readable as a field
pub const ID_FIELD: &str = "id";

/// Field name to value mapping used for creation and update payloads
pub type Attributes = BTreeMap<String, Value>;

/// The minimal surface a persisted entity must expose to be protected.
///
/// Application types implement this to be usable with a [crate::RecordStore];
/// the authorization layer never inspects records through anything else.
pub trait Record: Clone + ConditionalSend + ConditionalSync {
    /// The type tag of this record (e.g. `"posts"`)
    fn kind(&self) -> &str;

    /// The identity of this record, or `None` if it has never been persisted
    fn id(&self) -> Option<&Value>;

    /// The current value of a stored field
    fn field(&self, name: &str) -> Option<&Value>;

    /// A snapshot of every stored field (not including the identity)
    fn attributes(&self) -> Attributes;

    /// True if this record has not been persisted yet
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Read a field by name, resolving [ID_FIELD] to the record identity
    fn read(&self, name: &str) -> Option<&Value> {
        if name == ID_FIELD {
            self.id()
        } else {
            self.field(name)
        }
    }
}

/// A schemaless [Record]: a kind, an optional identity and a bag of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    kind: String,
    id: Option<Value>,
    fields: Attributes,
}

impl Document {
    /// A new, unsaved document of the given kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            fields: Attributes::new(),
        }
    }

    /// A document that the store has assigned an identity to
    pub fn persisted(kind: impl Into<String>, id: impl Into<Value>, fields: Attributes) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id.into()),
            fields,
        }
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Assign a field in place
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Merge the given attributes into this document, overwriting existing
    /// fields of the same name
    pub fn assign(&mut self, attributes: Attributes) {
        self.fields.extend(attributes);
    }

    /// Borrow the stored fields
    pub fn fields(&self) -> &Attributes {
        &self.fields
    }
}

impl Record for Document {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn attributes(&self) -> Attributes {
        self.fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Attributes, Document, Record, Value};

    #[test]
    fn it_reads_identity_as_a_field() {
        let document = Document::persisted("posts", 7u64, Attributes::new()).with("title", "hi");

        assert_eq!(document.read("id"), Some(&Value::from(7u64)));
        assert_eq!(document.read("title"), Some(&Value::from("hi")));
        assert_eq!(document.read("missing"), None);
        assert!(!document.is_new());
    }

    #[test]
    fn it_treats_documents_without_identity_as_new() {
        let document = Document::new("posts").with("title", "draft");

        assert!(document.is_new());
        assert_eq!(document.read("id"), None);
        assert_eq!(document.attributes().len(), 1);
    }
}

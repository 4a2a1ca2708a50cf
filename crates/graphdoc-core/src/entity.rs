//! Raw fetched entities.

use std::collections::BTreeMap;

use serde_json::Value;

/// Identity of an entity: concrete resource type plus id.
///
/// Included resources are deduplicated on this key; an entity reached via two
/// different include paths is serialized once.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    /// Concrete resource type name.
    pub resource_type: String,
    /// Entity id.
    pub id: String,
}

impl EntityKey {
    /// Build a key.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// A raw entity as returned by the storage collaborator.
///
/// The concrete `resource_type` matters: polymorphic relations fan out over
/// several types, so two entities from the same relation may carry different
/// type names.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Concrete resource type name.
    pub resource_type: String,
    /// Entity id.
    pub id: String,
    /// Attribute values keyed by storage key.
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an entity with no attributes.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute value.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// This entity's identity key.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.resource_type.clone(), self.id.clone())
    }

    /// Attribute lookup by storage key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

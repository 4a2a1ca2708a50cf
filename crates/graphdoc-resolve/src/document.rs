//! The compound-document output model.
//!
//! Shapes follow the hypermedia document layout: primary data (single,
//! collection or null), a deduplicated `included` set, and top-level
//! `meta`/`links` maps. Serialization omits empty members.

use serde::Serialize;
use serde_json::{Map, Value};

use graphdoc_core::EntityKey;

/// A `(type, id)` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceIdentifier {
    /// Resource type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource id.
    pub id: String,
}

impl From<&EntityKey> for ResourceIdentifier {
    fn from(key: &EntityKey) -> Self {
        Self {
            resource_type: key.resource_type.clone(),
            id: key.id.clone(),
        }
    }
}

/// Relationship linkage data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
    /// To-one linkage: an identifier or null.
    ToOne(Option<ResourceIdentifier>),
    /// To-many linkage: an ordered identifier list.
    ToMany(Vec<ResourceIdentifier>),
}

/// A relationship member of a resource object. `data` is absent for
/// count-only relationships; a count lands in a container member named by the
/// engine configuration (`meta` by default).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationshipObject {
    /// Linkage, when the relation was traversed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,
    /// Non-data members, serialized alongside `data`.
    #[serde(flatten)]
    pub members: Map<String, Value>,
}

impl RelationshipObject {
    /// One non-data member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }
}

/// One serialized resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    /// Resource type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource id.
    pub id: String,
    /// Projected attributes.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Relationship members, in field-declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "ser_relationships")]
    pub relationships: Vec<(String, RelationshipObject)>,
}

fn ser_relationships<S>(
    relationships: &[(String, RelationshipObject)],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(relationships.len()))?;
    for (name, rel) in relationships {
        map.serialize_entry(name, rel)?;
    }
    map.end()
}

impl ResourceObject {
    /// Look up a relationship member.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipObject> {
        self.relationships
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rel)| rel)
    }

    /// This resource's identity key.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.resource_type.clone(), self.id.clone())
    }
}

/// Primary data: a single resource (or null) or an ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// Object-or-null shape, produced by singular filters and single-resource
    /// targets. Never a list of length one.
    One(Option<ResourceObject>),
    /// Collection shape, even for zero or one element.
    Many(Vec<ResourceObject>),
}

impl PrimaryData {
    /// Number of resources carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            PrimaryData::One(one) => usize::from(one.is_some()),
            PrimaryData::Many(many) => many.len(),
        }
    }

    /// True when no resource is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The assembled response document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Primary data.
    pub data: PrimaryData,
    /// Included resources, unique by `(type, id)`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
    /// Top-level meta.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    /// Top-level links.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub links: Map<String, Value>,
}

impl Document {
    /// Find an included resource by type and id.
    #[must_use]
    pub fn included_resource(&self, resource_type: &str, id: &str) -> Option<&ResourceObject> {
        self.included
            .iter()
            .find(|r| r.resource_type == resource_type && r.id == id)
    }
}

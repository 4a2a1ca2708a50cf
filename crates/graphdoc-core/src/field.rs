//! Field definitions: attributes and the field union.

use crate::relationship::RelationshipDef;

/// Metadata about a serializable attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDef {
    /// Public field name (disjoint from `id`/`type`).
    pub name: String,
    /// Storage key backing the attribute (may differ from the public name).
    pub key: String,
    /// Whether the attribute may appear in a sort directive.
    pub sortable: bool,
    /// Whether the attribute participates in sparse fieldsets. An ineligible
    /// attribute is always serialized, regardless of sparse selection.
    pub sparse: bool,
}

impl AttributeDef {
    /// Create an attribute whose storage key equals its public name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            sortable: false,
            sparse: true,
        }
    }

    /// Override the storage key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Allow the attribute in sort directives.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Exclude the attribute from sparse fieldsets (always serialized).
    pub fn always_serialized(mut self) -> Self {
        self.sparse = false;
        self
    }
}

/// A declared field of a resource type: either a plain attribute or a
/// relationship edge to other resource types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDef {
    /// Scalar attribute backed by a storage key.
    Attribute(AttributeDef),
    /// Edge to one or more related resource types.
    Relationship(RelationshipDef),
}

impl FieldDef {
    /// The field's public name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            FieldDef::Attribute(a) => &a.name,
            FieldDef::Relationship(r) => &r.name,
        }
    }

    /// The attribute definition, if this field is an attribute.
    #[must_use]
    pub fn as_attribute(&self) -> Option<&AttributeDef> {
        match self {
            FieldDef::Attribute(a) => Some(a),
            FieldDef::Relationship(_) => None,
        }
    }

    /// The relationship definition, if this field is a relationship.
    #[must_use]
    pub fn as_relationship(&self) -> Option<&RelationshipDef> {
        match self {
            FieldDef::Attribute(_) => None,
            FieldDef::Relationship(r) => Some(r),
        }
    }
}

impl From<AttributeDef> for FieldDef {
    fn from(a: AttributeDef) -> Self {
        FieldDef::Attribute(a)
    }
}

impl From<RelationshipDef> for FieldDef {
    fn from(r: RelationshipDef) -> Self {
        FieldDef::Relationship(r)
    }
}

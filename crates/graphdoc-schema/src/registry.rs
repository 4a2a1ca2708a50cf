//! Registration builder and the frozen registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use graphdoc_core::{Error, RelationshipDef, ResourceType, Result};

/// Field names reserved by the document model; declared fields share a
/// namespace with them and may not reuse them.
const RESERVED_FIELDS: [&str; 2] = ["id", "type"];

/// Collects resource types during boot, then validates and freezes them.
///
/// # Example
///
/// ```
/// use graphdoc_core::{AttributeDef, RelationshipDef, ResourceType};
/// use graphdoc_schema::SchemaBuilder;
///
/// let registry = SchemaBuilder::new()
///     .register(
///         ResourceType::new("posts")
///             .attribute(AttributeDef::new("title"))
///             .relationship(RelationshipDef::to_one("author", "users")),
///     )
///     .register(ResourceType::new("users").attribute(AttributeDef::new("name")))
///     .freeze()
///     .unwrap();
///
/// assert!(registry.get("posts").is_ok());
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<ResourceType>,
}

impl SchemaBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource type.
    #[must_use]
    pub fn register(mut self, resource_type: ResourceType) -> Self {
        self.types.push(resource_type);
        self
    }

    /// Validate the whole graph and freeze it into a registry.
    pub fn freeze(self) -> Result<Arc<SchemaRegistry>> {
        let mut types: BTreeMap<String, ResourceType> = BTreeMap::new();
        for rt in self.types {
            if types.contains_key(&rt.name) {
                return Err(Error::Schema(format!(
                    "duplicate resource type `{}`",
                    rt.name
                )));
            }
            types.insert(rt.name.clone(), rt);
        }

        for rt in types.values() {
            validate_fields(rt)?;
            validate_relationships(rt, &types)?;
            validate_always_include(rt)?;
            validate_paginator(rt)?;
        }

        info!(types = types.len(), "schema registry frozen");
        Ok(Arc::new(SchemaRegistry { types }))
    }
}

fn validate_fields(rt: &ResourceType) -> Result<()> {
    let mut seen: Vec<&str> = Vec::new();
    for field in &rt.fields {
        let name = field.name();
        if RESERVED_FIELDS.contains(&name) {
            return Err(Error::Schema(format!(
                "`{}` declares reserved field name `{name}`",
                rt.name
            )));
        }
        if seen.contains(&name) {
            return Err(Error::Schema(format!(
                "`{}` declares field `{name}` twice",
                rt.name
            )));
        }
        seen.push(name);
    }
    Ok(())
}

fn validate_relationships(rt: &ResourceType, types: &BTreeMap<String, ResourceType>) -> Result<()> {
    for rel in rt.relationships() {
        if rel.targets.is_empty() {
            return Err(Error::Schema(format!(
                "relationship `{}.{}` has no target type",
                rt.name, rel.name
            )));
        }
        for target in &rel.targets {
            if !types.contains_key(target) {
                return Err(Error::Schema(format!(
                    "relationship `{}.{}` targets unregistered type `{target}`",
                    rt.name, rel.name
                )));
            }
        }
        for sub in &rel.sub_relationships {
            if !types.contains_key(&sub.target) {
                return Err(Error::Schema(format!(
                    "sub-relationship `{}.{}.{}` targets unregistered type `{}`",
                    rt.name, rel.name, sub.name, sub.target
                )));
            }
        }
    }
    Ok(())
}

fn validate_always_include(rt: &ResourceType) -> Result<()> {
    for relation in &rt.always_include {
        match rt.relationship_def(relation) {
            None => {
                return Err(Error::Schema(format!(
                    "`{}` always-includes unknown relation `{relation}`",
                    rt.name
                )));
            }
            Some(rel) if !rel.eager_load => {
                return Err(Error::Schema(format!(
                    "`{}` always-includes `{relation}`, which is not eager-loadable",
                    rt.name
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// A sortable attribute on a cursor-paginated type can never be honored:
/// cursor order is fixed by the cursor column. Reject at registration rather
/// than per-request.
fn validate_paginator(rt: &ResourceType) -> Result<()> {
    if rt.paginator.is_cursor() && rt.attributes().any(|a| a.sortable) {
        return Err(Error::IncompatibleSortForPaginator {
            resource_type: rt.name.clone(),
        });
    }
    Ok(())
}

/// The frozen, process-wide resource-type registry.
///
/// Relation edges are resolved by name through [`SchemaRegistry::get`], so a
/// cyclic resource graph is just a set of entries that mention each other.
#[derive(Debug)]
pub struct SchemaRegistry {
    types: BTreeMap<String, ResourceType>,
}

impl SchemaRegistry {
    /// Look up a resource type.
    pub fn get(&self, name: &str) -> Result<&ResourceType> {
        self.types
            .get(name)
            .ok_or_else(|| Error::UnknownResourceType(name.to_string()))
    }

    /// Look up a relationship on a type.
    pub fn relationship(&self, resource_type: &str, relation: &str) -> Result<&RelationshipDef> {
        let rt = self.get(resource_type)?;
        rt.relationship_def(relation)
            .ok_or_else(|| Error::UnknownRelationship {
                resource_type: resource_type.to_string(),
                relation: relation.to_string(),
            })
    }

    /// Iterate registered types in name order.
    pub fn types(&self) -> impl Iterator<Item = &ResourceType> {
        self.types.values()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

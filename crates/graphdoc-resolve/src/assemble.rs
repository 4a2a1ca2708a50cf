//! Document assembly.
//!
//! The assembler is shape-agnostic: primary-data shape is decided before
//! assembly (singular collapse, page presence) and it simply iterates the
//! collection it is handed, possibly of size zero or one. Sparse-field
//! projection, relationship linkage and included-set deduplication happen
//! here; pagination meta/links and promoted counts are merged in by the
//! engine afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Map;

use graphdoc_core::{
    EngineConfig, Entity, EntityKey, FieldDef, RelationshipKind, Result,
};
use graphdoc_schema::SchemaRegistry;

use crate::count::CountSet;
use crate::document::{
    Document, Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject,
};

/// Related entities collected while walking the fetch plan.
///
/// Linkage is keyed by `(parent type, parent id, relation)`; the entity pool
/// is keyed by `(type, id)` so a resource reached via several paths is stored
/// once. Insertion order is kept for a stable `included` sequence.
#[derive(Debug, Clone, Default)]
pub struct RelatedStore {
    linkage: BTreeMap<(String, String, String), Vec<EntityKey>>,
    pool: BTreeMap<EntityKey, Entity>,
    order: Vec<EntityKey>,
}

impl RelatedStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one parent's related entities for a traversed relation.
    ///
    /// Called once per parent per plan step; polymorphic sibling steps append
    /// to the same linkage entry. An empty list still records the traversal,
    /// which is what distinguishes "traversed, empty" from "not traversed".
    pub fn record(
        &mut self,
        parent_type: &str,
        parent_id: &str,
        relation: &str,
        entities: &[Entity],
    ) {
        let entry = self
            .linkage
            .entry((
                parent_type.to_string(),
                parent_id.to_string(),
                relation.to_string(),
            ))
            .or_default();
        for entity in entities {
            let key = entity.key();
            if !entry.contains(&key) {
                entry.push(key.clone());
            }
            if !self.pool.contains_key(&key) {
                self.order.push(key.clone());
                self.pool.insert(key, entity.clone());
            }
        }
    }

    /// Linkage for one parent and relation, if that traversal happened.
    #[must_use]
    pub fn linkage(&self, parent_type: &str, parent_id: &str, relation: &str) -> Option<&[EntityKey]> {
        self.linkage
            .get(&(
                parent_type.to_string(),
                parent_id.to_string(),
                relation.to_string(),
            ))
            .map(Vec::as_slice)
    }

    /// All pooled entities in first-seen order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|key| self.pool.get(key))
    }
}

/// One request's assembly context.
pub struct Assembler<'a> {
    /// Frozen schema.
    pub registry: &'a SchemaRegistry,
    /// Engine configuration (meta key names).
    pub config: &'a EngineConfig,
    /// Sparse-field restriction per resource type.
    pub sparse: &'a BTreeMap<String, BTreeSet<String>>,
    /// Related entities and linkage from the plan walk.
    pub related: &'a RelatedStore,
    /// Aggregated counts for the primary entities.
    pub counts: &'a CountSet,
    /// The type the counts were aggregated for.
    pub count_parent_type: &'a str,
}

impl Assembler<'_> {
    /// Assemble primary entities and the walked plan into a document.
    ///
    /// `singular` selects object-or-null shape; otherwise the primary data is
    /// a collection even for zero or one entities.
    pub fn assemble(&self, primary: Vec<Entity>, singular: bool) -> Result<Document> {
        let mut primary_keys: BTreeSet<EntityKey> = BTreeSet::new();
        let mut primary_objects = Vec::with_capacity(primary.len());
        for entity in &primary {
            primary_keys.insert(entity.key());
            primary_objects.push(self.build_resource(entity)?);
        }

        // Included resources are unique by (type, id); entities already in
        // primary data are not repeated.
        let mut included = Vec::new();
        for entity in self.related.entities() {
            if primary_keys.contains(&entity.key()) {
                continue;
            }
            included.push(self.build_resource(entity)?);
        }

        let data = if singular {
            PrimaryData::One(primary_objects.into_iter().next())
        } else {
            PrimaryData::Many(primary_objects)
        };

        Ok(Document {
            data,
            included,
            meta: Map::new(),
            links: Map::new(),
        })
    }

    /// Project one entity into a resource object.
    ///
    /// Sparse rules: a type with no sparse entry serializes all fields; an
    /// attribute marked ineligible for sparse fieldsets is always serialized;
    /// `id`/`type` are always present. A relationship excluded by the sparse
    /// set is omitted entirely, linkage included.
    fn build_resource(&self, entity: &Entity) -> Result<ResourceObject> {
        let rt = self.registry.get(&entity.resource_type)?;
        let restriction = self.sparse.get(&rt.name);

        let mut attributes = Map::new();
        let mut relationships = Vec::new();

        for field in &rt.fields {
            match field {
                FieldDef::Attribute(attr) => {
                    let allowed =
                        !attr.sparse || restriction.is_none_or(|set| set.contains(&attr.name));
                    if !allowed {
                        continue;
                    }
                    if let Some(value) = entity.attribute(&attr.key) {
                        attributes.insert(attr.name.clone(), value.clone());
                    }
                }
                FieldDef::Relationship(rel) => {
                    if restriction.is_some_and(|set| !set.contains(&rel.name)) {
                        continue;
                    }

                    let linkage =
                        self.related
                            .linkage(&entity.resource_type, &entity.id, &rel.name);
                    let count = (entity.resource_type == self.count_parent_type)
                        .then(|| self.counts.get(&rel.name, &entity.id))
                        .flatten();
                    if linkage.is_none() && count.is_none() {
                        continue;
                    }

                    let data = linkage.map(|keys| match rel.kind {
                        RelationshipKind::ToOne => {
                            Linkage::ToOne(keys.first().map(ResourceIdentifier::from))
                        }
                        RelationshipKind::ToMany => {
                            Linkage::ToMany(keys.iter().map(ResourceIdentifier::from).collect())
                        }
                    });

                    let mut members = Map::new();
                    if let Some(count) = count {
                        let mut container = Map::new();
                        container.insert(self.config.count_meta_key.clone(), count.into());
                        members.insert(
                            self.config.count_container_key.clone(),
                            container.into(),
                        );
                    }

                    relationships.push((rel.name.clone(), RelationshipObject { data, members }));
                }
            }
        }

        Ok(ResourceObject {
            resource_type: entity.resource_type.clone(),
            id: entity.id.clone(),
            attributes,
            relationships,
        })
    }
}

//! Relationship metadata for the resource graph.
//!
//! Relationship edges reference their inverse resource types **by name**; the
//! registry resolves names lazily at traversal time. This keeps the graph an
//! arena of named nodes, so cyclic schemas (`posts.comments.user` pointing
//! back at `users.posts`) need no reference cycles and no cycle detection --
//! include depth limits bound traversal instead.

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationshipKind {
    /// Points at a single related resource (or none).
    #[default]
    ToOne,
    /// Points at an ordered collection of related resources.
    ToMany,
}

/// A named sub-relationship of a polymorphic to-many relation.
///
/// Each sub-relationship binds exactly one inverse resource type, which is
/// what lets write-side callers disambiguate polymorphic membership. The
/// include planner fans a polymorphic segment out into one traversal per
/// sub-relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRelationship {
    /// Sub-relationship name.
    pub name: String,
    /// The single resource type this branch resolves to.
    pub target: String,
}

impl SubRelationship {
    /// Create a sub-relationship bound to one target type.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Metadata about a relationship between resource types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDef {
    /// Name of the relationship field.
    pub name: String,

    /// Inverse resource type names. One entry for ordinary relations;
    /// several for polymorphic relations.
    pub targets: Vec<String>,

    /// Cardinality.
    pub kind: RelationshipKind,

    /// Whether the relation may be traversed by include paths.
    /// An ineligible relation rejects every path that crosses it.
    pub eager_load: bool,

    /// Whether the relation's cardinality may be requested without
    /// materializing its members.
    pub countable: bool,

    /// Alternate name accepted in count directives, and used as the key when
    /// the count is promoted to document-level meta.
    pub count_alias: Option<String>,

    /// Whether a traversed, countable relation's count may be promoted into
    /// the top-level document meta on relationship endpoints.
    pub merge_count_meta: bool,

    /// Whether the relation is read-only for write-side callers.
    pub read_only: bool,

    /// Ordered sub-relationships; non-empty only for polymorphic to-many.
    pub sub_relationships: Vec<SubRelationship>,
}

impl RelationshipDef {
    /// Create a to-one relationship to a single target type.
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: vec![target.into()],
            kind: RelationshipKind::ToOne,
            eager_load: true,
            countable: false,
            count_alias: None,
            merge_count_meta: true,
            read_only: false,
            sub_relationships: Vec::new(),
        }
    }

    /// Create a to-many relationship to a single target type.
    pub fn to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut rel = Self::to_one(name, "");
        rel.targets.clear();
        rel.targets.push(target.into());
        rel.kind = RelationshipKind::ToMany;
        rel
    }

    /// Create a polymorphic to-many relationship from its sub-relationships.
    ///
    /// The target list is derived from the sub-relationship bindings, in
    /// declaration order.
    pub fn polymorphic(name: impl Into<String>, subs: Vec<SubRelationship>) -> Self {
        let targets = subs.iter().map(|s| s.target.clone()).collect();
        Self {
            name: name.into(),
            targets,
            kind: RelationshipKind::ToMany,
            eager_load: true,
            countable: false,
            count_alias: None,
            merge_count_meta: true,
            read_only: false,
            sub_relationships: subs,
        }
    }

    /// Disable include traversal over this relation.
    pub fn no_eager_load(mut self) -> Self {
        self.eager_load = false;
        self
    }

    /// Allow count directives for this relation.
    pub fn countable(mut self) -> Self {
        self.countable = true;
        self
    }

    /// Set the count alias.
    pub fn count_alias(mut self, alias: impl Into<String>) -> Self {
        self.count_alias = Some(alias.into());
        self
    }

    /// Keep a traversed count out of the top-level document meta.
    pub fn no_count_meta_merge(mut self) -> Self {
        self.merge_count_meta = false;
        self
    }

    /// Mark the relation read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// True when the relation fans out over several inverse types.
    #[must_use]
    pub fn is_polymorphic(&self) -> bool {
        !self.sub_relationships.is_empty()
    }

    /// Look up a sub-relationship by name.
    #[must_use]
    pub fn sub_relationship(&self, name: &str) -> Option<&SubRelationship> {
        self.sub_relationships.iter().find(|s| s.name == name)
    }

    /// True when `name` matches the relation name or its count alias.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.count_alias.as_deref() == Some(name)
    }
}

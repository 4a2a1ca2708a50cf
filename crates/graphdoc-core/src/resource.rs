//! Resource type definitions.
//!
//! A [`ResourceType`] describes one node of the resource graph: its fields,
//! include depth limit, pagination strategy, declared filters and the set of
//! relations that are always eagerly resolved. Types are defined at boot and
//! frozen into the registry; nothing mutates them afterwards.

use crate::field::{AttributeDef, FieldDef};
use crate::filter::FilterDef;
use crate::relationship::RelationshipDef;

/// Pagination strategy selected for a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorKind {
    /// Page-number/size pagination. `simple` skips the total count query and
    /// the derived `total`/`last_page` metadata.
    Offset {
        /// Omit the total count query.
        simple: bool,
    },
    /// Keyset pagination ordered by `column` descending, primary id as
    /// tie-break. Client sort directives are incompatible with this strategy.
    Cursor {
        /// The cursor column.
        column: String,
    },
}

impl Default for PaginatorKind {
    fn default() -> Self {
        PaginatorKind::Offset { simple: false }
    }
}

impl PaginatorKind {
    /// Cursor pagination over the default `created_at` column.
    #[must_use]
    pub fn cursor() -> Self {
        PaginatorKind::Cursor {
            column: "created_at".to_string(),
        }
    }

    /// True for the cursor strategy.
    #[must_use]
    pub fn is_cursor(&self) -> bool {
        matches!(self, PaginatorKind::Cursor { .. })
    }
}

/// A named resource type with its declared fields and capabilities.
///
/// # Example
///
/// ```
/// use graphdoc_core::{AttributeDef, PaginatorKind, RelationshipDef, ResourceType};
///
/// let posts = ResourceType::new("posts")
///     .attribute(AttributeDef::new("title").sortable())
///     .attribute(AttributeDef::new("body"))
///     .relationship(RelationshipDef::to_one("author", "users"))
///     .relationship(RelationshipDef::to_many("comments", "comments").countable())
///     .max_include_depth(2)
///     .default_page_size(25);
///
/// assert_eq!(posts.name, "posts");
/// assert!(posts.relationship_def("comments").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceType {
    /// Type name, unique within the registry.
    pub name: String,
    /// Declared fields in declaration order. The namespace is disjoint from
    /// the reserved `id`/`type` members.
    pub fields: Vec<FieldDef>,
    /// Maximum include-path depth. 0 disables inclusion entirely.
    pub max_include_depth: usize,
    /// Page size applied when the client's page spec omits one.
    pub default_page_size: u64,
    /// Pagination strategy.
    pub paginator: PaginatorKind,
    /// Declared filters, matched in declaration order.
    pub filters: Vec<FilterDef>,
    /// Relations always eagerly resolved regardless of client intent. Used
    /// when attributes derive from a related entity.
    pub always_include: Vec<String>,
}

impl ResourceType {
    /// Default include depth when none is configured.
    pub const DEFAULT_INCLUDE_DEPTH: usize = 1;
    /// Default page size when none is configured.
    pub const DEFAULT_PAGE_SIZE: u64 = 30;

    /// Create a resource type with defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            max_include_depth: Self::DEFAULT_INCLUDE_DEPTH,
            default_page_size: Self::DEFAULT_PAGE_SIZE,
            paginator: PaginatorKind::default(),
            filters: Vec::new(),
            always_include: Vec::new(),
        }
    }

    /// Append an attribute field.
    pub fn attribute(mut self, attr: AttributeDef) -> Self {
        self.fields.push(FieldDef::Attribute(attr));
        self
    }

    /// Append a relationship field.
    pub fn relationship(mut self, rel: RelationshipDef) -> Self {
        self.fields.push(FieldDef::Relationship(rel));
        self
    }

    /// Set the maximum include depth.
    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Set the default page size.
    pub fn default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }

    /// Select a pagination strategy.
    pub fn paginator(mut self, paginator: PaginatorKind) -> Self {
        self.paginator = paginator;
        self
    }

    /// Declare a filter.
    pub fn filter(mut self, filter: FilterDef) -> Self {
        self.filters.push(filter);
        self
    }

    /// Always eagerly resolve `relation`, independent of client includes.
    pub fn always_include(mut self, relation: impl Into<String>) -> Self {
        self.always_include.push(relation.into());
        self
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute_def(&self, name: &str) -> Option<&AttributeDef> {
        self.field(name).and_then(FieldDef::as_attribute)
    }

    /// Look up a relationship by name.
    #[must_use]
    pub fn relationship_def(&self, name: &str) -> Option<&RelationshipDef> {
        self.field(name).and_then(FieldDef::as_relationship)
    }

    /// Look up a countable relationship by name or count alias.
    #[must_use]
    pub fn countable_relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships()
            .find(|r| r.countable && r.answers_to(name))
    }

    /// Iterate declared relationships in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipDef> {
        self.fields.iter().filter_map(FieldDef::as_relationship)
    }

    /// Iterate declared attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDef> {
        self.fields.iter().filter_map(FieldDef::as_attribute)
    }
}

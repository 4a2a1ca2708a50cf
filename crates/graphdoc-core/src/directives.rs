//! The per-request query directive model.
//!
//! A [`QueryDirectives`] value is immutable once built. Every key it carries
//! has already passed schema-aware validation upstream (§ external
//! collaborators); the engine applies directives, it does not re-check their
//! legality. The one defensive exception is the include planner, which still
//! rejects unknown path segments outright rather than dropping them.

use std::collections::{BTreeMap, BTreeSet};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// One requested sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    /// Attribute name to sort by.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortDirective {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A strategy-tagged page specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Page-number pagination.
    Offset {
        /// 1-based page number; defaults to 1 when absent.
        number: Option<u64>,
        /// Page size; defaults to the resource type's configured size.
        size: Option<u64>,
    },
    /// Keyset pagination addressed by entity-id cursors.
    ///
    /// When both cursors are supplied, `before` wins.
    Cursor {
        /// Start after this entity.
        after: Option<String>,
        /// End before this entity.
        before: Option<String>,
        /// Page size; defaults to the resource type's configured size.
        limit: Option<u64>,
    },
}

impl Page {
    /// An offset page with explicit number and size.
    #[must_use]
    pub fn number(number: u64, size: u64) -> Self {
        Page::Offset {
            number: Some(number),
            size: Some(size),
        }
    }

    /// The cursor honored by this spec: `before` wins over `after`.
    #[must_use]
    pub fn effective_cursor(&self) -> Option<(&str, CursorSide)> {
        match self {
            Page::Offset { .. } => None,
            Page::Cursor { after, before, .. } => match (before, after) {
                (Some(b), _) => Some((b.as_str(), CursorSide::Before)),
                (None, Some(a)) => Some((a.as_str(), CursorSide::After)),
                (None, None) => None,
            },
        }
    }
}

/// Which side of the cursor a page extends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorSide {
    /// Items following the cursor position.
    After,
    /// Items preceding the cursor position.
    Before,
}

/// A validated, immutable set of query directives for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDirectives {
    /// Filter key to raw value.
    pub filters: BTreeMap<String, String>,
    /// Requested sort keys, in request order.
    pub sort: Vec<SortDirective>,
    /// Page spec, or absent for an unpaginated collection.
    pub page: Option<Page>,
    /// Dotted include paths.
    pub include: BTreeSet<String>,
    /// Resource type to requested field names. A type with no entry has no
    /// restriction; an empty set restricts to `id`/`type` plus
    /// always-serialized attributes.
    pub sparse_fields: BTreeMap<String, BTreeSet<String>>,
    /// Relation names (or count aliases) whose counts were requested.
    pub count_requested: BTreeSet<String>,
}

impl QueryDirectives {
    /// Start building a directive set.
    #[must_use]
    pub fn builder() -> QueryDirectivesBuilder {
        QueryDirectivesBuilder::default()
    }
}

/// Consuming builder for [`QueryDirectives`].
#[derive(Debug, Default)]
pub struct QueryDirectivesBuilder {
    directives: QueryDirectives,
}

impl QueryDirectivesBuilder {
    /// Add a filter key/value pair.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.filters.insert(key.into(), value.into());
        self
    }

    /// Append a sort directive.
    pub fn sort(mut self, sort: SortDirective) -> Self {
        self.directives.sort.push(sort);
        self
    }

    /// Set the page spec.
    pub fn page(mut self, page: Page) -> Self {
        self.directives.page = Some(page);
        self
    }

    /// Add a dotted include path.
    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.directives.include.insert(path.into());
        self
    }

    /// Restrict the serialized fields for a resource type.
    ///
    /// Repeated calls for the same type union their field sets, which is also
    /// how conflicting sparse requests from distinct include paths resolve.
    pub fn sparse_fields<I, S>(mut self, resource_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .directives
            .sparse_fields
            .entry(resource_type.into())
            .or_default();
        entry.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Request a relationship count by name or alias.
    pub fn count(mut self, relation: impl Into<String>) -> Self {
        self.directives.count_requested.insert(relation.into());
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> QueryDirectives {
        self.directives
    }
}

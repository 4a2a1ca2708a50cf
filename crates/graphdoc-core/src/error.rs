//! Error taxonomy for the graphdoc engine.
//!
//! Planning errors (`InvalidIncludePath`, `InvalidSort`,
//! `IncompatibleSortForPaginator`) are raised before any fetch happens; a
//! request that fails planning never touches the storage collaborator.
//! `AggregationFailure` is the single locally-recoverable variant: a missing
//! count yields a degraded-but-valid document, so the engine may omit it and
//! proceed. Everything else is fatal to the request.

use thiserror::Error;

/// Convenience alias for fallible synchronous engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an include path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeRejection {
    /// The path has more segments than the root type's maximum include depth.
    DepthExceeded,
    /// A segment crosses a relationship not eligible for eager loading.
    NotEagerLoadable,
    /// A segment does not name a relationship on the current type.
    UnknownSegment,
}

impl std::fmt::Display for IncludeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncludeRejection::DepthExceeded => "maximum include depth exceeded",
            IncludeRejection::NotEagerLoadable => "relationship is not eager-loadable",
            IncludeRejection::UnknownSegment => "unknown path segment",
        };
        f.write_str(s)
    }
}

/// All failure modes surfaced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// An include path exceeded the depth limit, crossed a disabled relation
    /// or referenced an unknown field. Rejected before any fetch occurs.
    #[error("invalid include path `{path}`: {reason}")]
    InvalidIncludePath {
        /// The offending dotted path, verbatim from the request.
        path: String,
        /// Why the whole path was rejected.
        reason: IncludeRejection,
    },

    /// An `after`/`before` cursor does not correspond to any known entity.
    /// Never silently treated as "start of list".
    #[error("unresolvable cursor `{cursor}` for `{resource_type}`")]
    UnresolvableCursor {
        /// Resource type the cursor was resolved against.
        resource_type: String,
        /// The cursor value as supplied.
        cursor: String,
    },

    /// A non-empty sort was requested for a cursor-paginated type. Cursor
    /// order is fixed by the paginator's cursor column.
    #[error("`{resource_type}` uses cursor pagination and cannot accept a sort")]
    IncompatibleSortForPaginator {
        /// The cursor-paginated resource type.
        resource_type: String,
    },

    /// A count fetch failed. Recoverable: the document is emitted without
    /// that count.
    #[error("count aggregation failed for relation `{relation}`: {detail}")]
    AggregationFailure {
        /// The countable relation whose aggregate fetch failed.
        relation: String,
        /// Collaborator-provided detail.
        detail: String,
    },

    /// A requested sort field is not a sortable attribute.
    #[error("`{field}` is not a sortable attribute of `{resource_type}`")]
    InvalidSort {
        /// The resource type the sort was applied to.
        resource_type: String,
        /// The offending sort field.
        field: String,
    },

    /// A resource type name that is not present in the registry.
    #[error("unknown resource type `{0}`")]
    UnknownResourceType(String),

    /// A relationship name that does not exist on the given type.
    #[error("unknown relationship `{relation}` on `{resource_type}`")]
    UnknownRelationship {
        /// The type the lookup ran against.
        resource_type: String,
        /// The missing relationship name.
        relation: String,
    },

    /// Registration-time schema validation failure.
    #[error("schema registration error: {0}")]
    Schema(String),

    /// Storage collaborator failure surfaced through the fetch seam.
    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl Error {
    /// Shorthand for an include-path rejection.
    pub fn invalid_include(path: impl Into<String>, reason: IncludeRejection) -> Self {
        Error::InvalidIncludePath {
            path: path.into(),
            reason,
        }
    }

    /// True for errors the engine may recover from locally by degrading the
    /// document instead of failing the request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::AggregationFailure { .. })
    }
}

//! The storage fetch contract.
//!
//! The engine describes *what* to fetch; a [`Fetcher`] implementation decides
//! how its store executes that. Each call is one synchronous boundary from
//! the engine's point of view: the engine does not retry, batch across
//! requests, or cache between requests. Every method threads `Cx` and returns
//! [`Outcome`] so a cancelled request context stops the pipeline before
//! document assembly can observe partial results.
//!
//! Authorization is the collaborator's business. Entities the fetcher omits
//! are treated as absent, never as errors.

use asupersync::{Cx, Outcome};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::directives::{SortDirection, SortDirective};
use crate::entity::Entity;
use crate::error::Error;
use crate::plan::FetchStep;

/// An ordered predicate emitted by the filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Backing storage column.
    pub column: String,
    /// Parsed value. An array value means set membership.
    pub value: Value,
}

impl Predicate {
    /// Build a predicate.
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// A resolved sort key over a storage column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Backing storage column.
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortKey {
    /// Build a sort key from a validated directive and its backing column.
    pub fn new(column: impl Into<String>, directive: &SortDirective) -> Self {
        Self {
            column: column.into(),
            direction: directive.direction,
        }
    }
}

/// A resolved keyset position: cursor-column value plus the entity id used as
/// deterministic tie-break (the cursor column is not guaranteed unique).
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPos {
    /// Cursor-column value of the boundary entity.
    pub value: Value,
    /// Boundary entity id.
    pub id: String,
}

/// The bounded window of a primary fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchWindow {
    /// Skip/limit window.
    Offset {
        /// Rows to skip.
        offset: u64,
        /// Rows to return.
        limit: u64,
        /// Whether the store must also report the unbounded total.
        want_total: bool,
    },
    /// Keyset window ordered by `column` descending, id descending tie-break.
    /// `limit` already includes the one-row look-ahead.
    Cursor {
        /// The cursor column.
        column: String,
        /// Return rows strictly after this position (exclusive).
        after: Option<CursorPos>,
        /// Return rows strictly before this position (exclusive).
        before: Option<CursorPos>,
        /// Rows to return, look-ahead included.
        limit: u64,
    },
}

/// What the primary fetch starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
    /// The full collection of a resource type.
    Collection {
        /// Resource type name.
        resource_type: String,
    },
    /// A single entity by id.
    One {
        /// Resource type name.
        resource_type: String,
        /// Entity id.
        id: String,
    },
    /// The entities related to one parent through a relationship
    /// (a relationship endpoint: primary data is the related type).
    Related {
        /// Parent resource type.
        parent_type: String,
        /// Parent entity id.
        parent_id: String,
        /// Relationship name on the parent type.
        relation: String,
        /// The related resource type.
        target_type: String,
    },
}

impl FetchSource {
    /// The resource type of the entities this source yields.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        match self {
            FetchSource::Collection { resource_type } | FetchSource::One { resource_type, .. } => {
                resource_type
            }
            FetchSource::Related { target_type, .. } => target_type,
        }
    }
}

/// A fully shaped primary fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryFetch {
    /// Where the primary entities come from.
    pub source: FetchSource,
    /// Ordered predicates, in schema-declaration order.
    pub predicates: Vec<Predicate>,
    /// Sort keys, in request order. Empty under cursor pagination.
    pub sort: Vec<SortKey>,
    /// Bounded window, or `None` for an unpaginated fetch.
    pub window: Option<FetchWindow>,
}

/// Result of a primary fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryBatch {
    /// Entities in store order (window applied).
    pub entities: Vec<Entity>,
    /// Unbounded total, when the window asked for one.
    pub total: Option<u64>,
}

/// One eager-load fetch: related entities for a batch of parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedFetch {
    /// The plan step being executed.
    pub step: FetchStep,
    /// Ids of the parent entities, batched to avoid per-entity queries.
    pub parent_ids: Vec<String>,
}

/// Related entities grouped by parent id. Parents with no related entities
/// may be omitted; the engine treats a missing entry as empty.
pub type RelatedBatch = BTreeMap<String, Vec<Entity>>;

/// A batched count fetch: one aggregate per parent id, without materializing
/// the related collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountFetch {
    /// Parent resource type.
    pub parent_type: String,
    /// Relationship name on the parent type.
    pub relation: String,
    /// Ids of the parent entities.
    pub parent_ids: Vec<String>,
}

/// The storage collaborator seam.
///
/// Implementations must be usable from concurrent requests without internal
/// coordination visible to the engine.
pub trait Fetcher {
    /// Execute a primary fetch.
    fn fetch_primary(
        &self,
        cx: &Cx,
        fetch: &PrimaryFetch,
    ) -> impl Future<Output = Outcome<PrimaryBatch, Error>> + Send;

    /// Execute one eager-load plan step for a batch of parents.
    fn fetch_related(
        &self,
        cx: &Cx,
        fetch: &RelatedFetch,
    ) -> impl Future<Output = Outcome<RelatedBatch, Error>> + Send;

    /// Execute a batched relationship count, keyed by parent id.
    fn fetch_counts(
        &self,
        cx: &Cx,
        fetch: &CountFetch,
    ) -> impl Future<Output = Outcome<BTreeMap<String, u64>, Error>> + Send;

    /// Resolve a cursor entity id to its cursor-column value.
    ///
    /// `Ok(None)` means the entity does not exist; the cursor strategy turns
    /// that into [`Error::UnresolvableCursor`], never an empty page.
    fn resolve_cursor(
        &self,
        cx: &Cx,
        resource_type: &str,
        id: &str,
        column: &str,
    ) -> impl Future<Output = Outcome<Option<Value>, Error>> + Send;
}

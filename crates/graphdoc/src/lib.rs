//! Resource-graph query resolution and compound-document assembly.
//!
//! `graphdoc` is the **facade crate**: it re-exports the whole engine so an
//! application depends on one crate and one prelude.
//!
//! # Layers
//!
//! - `graphdoc-core`: resource/relationship definitions, query directives,
//!   fetch plans, the [`Fetcher`] contract and the error taxonomy.
//! - `graphdoc-schema`: the [`SchemaBuilder`] that validates and freezes a
//!   registration set into an immutable [`SchemaRegistry`].
//! - `graphdoc-query`: include planning, filter/sort composition and the
//!   offset/cursor pagination strategies.
//! - `graphdoc-resolve`: count aggregation, document assembly and the
//!   [`Engine`] that orchestrates a resolution end to end.
//!
//! # Getting started
//!
//! Describe the resource graph, freeze it, build an [`Engine`] over it, then
//! resolve targets against any [`Fetcher`] implementation:
//!
//! ```no_run
//! use graphdoc::prelude::*;
//!
//! let registry = SchemaBuilder::new()
//!     .register(
//!         ResourceType::new("posts")
//!             .attribute(AttributeDef::new("title"))
//!             .relationship(RelationshipDef::to_one("author", "users"))
//!             .relationship(RelationshipDef::to_many("comments", "comments").countable()),
//!     )
//!     .register(ResourceType::new("comments").attribute(AttributeDef::new("text")))
//!     .register(ResourceType::new("users").attribute(AttributeDef::new("name")))
//!     .freeze()
//!     .unwrap();
//!
//! let engine = Engine::new(registry);
//! # let _ = engine;
//! ```

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub use graphdoc_core::{
    AttributeDef, CountFetch, CursorPos, CursorSide, EngineConfig, Entity, EntityKey, Error,
    FetchPlan, FetchSource, FetchStep, FetchWindow, Fetcher, FieldDef, FilterDef,
    FilterValueParser, IncludeRejection, Page, PaginatorKind, Predicate, PrimaryBatch,
    PrimaryFetch, QueryDirectives, QueryDirectivesBuilder, RelatedBatch, RelatedFetch,
    RelationshipDef, RelationshipKind, ResourceType, Result, SortDirection, SortDirective,
    SortKey, StepKind, SubRelationship,
};
pub use graphdoc_query::{
    FilterOutcome, PageLinks, PageMeta, PageResult, PreparedPage, build_filters, build_sort,
    plan_includes, prepare_page,
};
pub use graphdoc_resolve::{
    CountSet, Document, Engine, Linkage, PrimaryData, RelatedStore, RelationshipObject,
    ResolveTarget, ResourceIdentifier, ResourceObject,
};
pub use graphdoc_schema::{SchemaBuilder, SchemaRegistry};

/// One-stop imports for applications.
pub mod prelude {
    pub use asupersync::{Cx, Outcome};
    pub use graphdoc_core::{
        AttributeDef, EngineConfig, Entity, EntityKey, Error, Fetcher, FilterDef,
        FilterValueParser, Page, PaginatorKind, QueryDirectives, RelationshipDef,
        RelationshipKind, ResourceType, Result, SortDirective, SubRelationship,
    };
    pub use graphdoc_resolve::{Document, Engine, PrimaryData, ResolveTarget};
    pub use graphdoc_schema::{SchemaBuilder, SchemaRegistry};
}

//! Core types and contracts for the graphdoc engine.
//!
//! `graphdoc-core` is the **contract layer** for the whole workspace. It defines
//! the metadata model for resource types and the seams every other crate builds
//! on.
//!
//! # Role In The Architecture
//!
//! - **Schema metadata**: [`ResourceType`], [`FieldDef`], [`RelationshipDef`]
//!   and [`FilterDef`] describe a resource graph; the registry in
//!   `graphdoc-schema` validates and freezes them at boot.
//! - **Request model**: [`QueryDirectives`] is the immutable, already-validated
//!   per-request value (filter/sort/page/include/fields/count directives).
//! - **Fetch contract**: [`Fetcher`] is the storage seam. The engine describes
//!   *what* to fetch ([`PrimaryFetch`], [`FetchPlan`], [`CountFetch`]); the
//!   collaborator executes it. Every async call threads `Cx` and returns
//!   [`Outcome`] so cancellation propagates instead of leaking partial state.
//! - **Error taxonomy**: [`Error`] covers the planning, pagination and
//!   aggregation failure modes.
//!
//! # Who Uses This Crate
//!
//! - `graphdoc-schema` freezes [`ResourceType`] values into a registry.
//! - `graphdoc-query` turns directives plus metadata into fetch descriptors.
//! - `graphdoc-resolve` walks plans, aggregates counts and assembles documents.
//! - Storage backends implement [`Fetcher`].

// Re-export asupersync primitives for structured concurrency
pub use asupersync::{Cx, Outcome};

pub mod config;
pub mod directives;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod field;
pub mod filter;
pub mod plan;
pub mod relationship;
pub mod resource;

pub use config::EngineConfig;
pub use directives::{
    CursorSide, Page, QueryDirectives, QueryDirectivesBuilder, SortDirection, SortDirective,
};
pub use entity::{Entity, EntityKey};
pub use error::{Error, IncludeRejection, Result};
pub use fetch::{
    CountFetch, CursorPos, FetchSource, FetchWindow, Fetcher, Predicate, PrimaryBatch,
    PrimaryFetch, RelatedBatch, RelatedFetch, SortKey,
};
pub use field::{AttributeDef, FieldDef};
pub use filter::{FilterDef, FilterValueParser};
pub use plan::{FetchPlan, FetchStep, StepKind};
pub use relationship::{RelationshipDef, RelationshipKind, SubRelationship};
pub use resource::{PaginatorKind, ResourceType};

//! Orchestration layer: count aggregation, document assembly and the engine.
//!
//! The engine is stateless per request. All mutable structures (the fetch
//! plan, the related-entity store, the document under construction) are owned
//! by one request's execution; the only shared state is the frozen schema
//! registry behind an `Arc`. Two requests for the same resource graph run
//! fully in parallel with no coordination.

pub mod assemble;
pub mod count;
pub mod document;
pub mod engine;

pub use assemble::{Assembler, RelatedStore};
pub use count::{CountSet, aggregate_counts};
pub use document::{
    Document, Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject,
};
pub use engine::{Engine, ResolveTarget};

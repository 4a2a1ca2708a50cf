//! Boot-time schema registry.
//!
//! Resource types are registered once during an explicit boot phase, validated
//! as a whole graph, then frozen. The frozen [`SchemaRegistry`] is shared
//! behind an `Arc` and read without synchronization by arbitrarily many
//! concurrent requests; no request may mutate it.

pub mod registry;

pub use registry::{SchemaBuilder, SchemaRegistry};

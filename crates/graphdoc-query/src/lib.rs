//! Per-request query shaping for the graphdoc engine.
//!
//! Three concerns live here, all pure over the frozen schema except for
//! cursor resolution:
//!
//! - [`plan`]: expands include directives into a bounded [`FetchPlan`],
//!   rejecting whole paths that exceed depth or cross ineligible relations.
//! - [`filter`] / [`sort`]: turn declared filters and sort directives into
//!   ordered [`Predicate`]s and [`SortKey`]s, and detect singular-result
//!   collapse.
//! - [`page`]: the offset and cursor pagination strategies, both producing a
//!   uniform [`page::PageResult`] so downstream assembly never branches on
//!   strategy identity.
//!
//! [`FetchPlan`]: graphdoc_core::FetchPlan
//! [`Predicate`]: graphdoc_core::Predicate
//! [`SortKey`]: graphdoc_core::SortKey

pub mod filter;
pub mod page;
pub mod plan;
pub mod sort;

pub use filter::{FilterOutcome, build_filters};
pub use page::{PageLinks, PageMeta, PageResult, PreparedPage, prepare_page};
pub use plan::plan_includes;
pub use sort::build_sort;

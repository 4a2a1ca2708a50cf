//! The filter pipeline.
//!
//! Declared filters are matched against the request's filter map in
//! **schema-declaration order**, never request order, so the emitted
//! predicate sequence (and the storage query plan derived from it) is
//! deterministic and reproducible across identical requests.

use graphdoc_core::{Predicate, QueryDirectives, ResourceType};

/// Output of the filter pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Ordered predicates for the primary fetch.
    pub predicates: Vec<Predicate>,
    /// Whether the result shape collapses to object-or-null.
    pub singular: bool,
}

/// Compose predicates from the type's declared filters and the request's
/// filter map, and detect singular-result collapse.
///
/// The result is singular iff at least one matched filter is marked singular,
/// the request targets a collection endpoint (`collection_endpoint`, false
/// for explicit to-many relationship endpoints), and no page directive was
/// supplied: a page directive always forces collection shape.
pub fn build_filters(
    resource_type: &ResourceType,
    directives: &QueryDirectives,
    collection_endpoint: bool,
) -> FilterOutcome {
    let mut predicates = Vec::new();
    let mut matched_singular = false;

    for filter in &resource_type.filters {
        let Some(raw) = directives.filters.get(&filter.key) else {
            continue;
        };
        predicates.push(Predicate::new(
            filter.column.clone(),
            filter.parser.parse(raw),
        ));
        matched_singular |= filter.singular;
    }

    let singular = matched_singular && collection_endpoint && directives.page.is_none();
    FilterOutcome {
        predicates,
        singular,
    }
}

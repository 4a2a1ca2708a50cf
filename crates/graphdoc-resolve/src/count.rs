//! Countable-relationship aggregation.
//!
//! Counts are computed without materializing the related collections: one
//! batched aggregate fetch per relation, keyed by the primary entities' ids.
//! A failed count fetch degrades the document (the count is omitted with a
//! warning) instead of failing the request; cancellation still propagates.

use std::collections::BTreeMap;

use asupersync::{Cx, Outcome};
use tracing::warn;

use graphdoc_core::{CountFetch, Entity, Error, Fetcher};

/// Per-relation, per-entity counts for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountSet {
    counts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CountSet {
    /// The count of `relation` for the entity with `id`, if aggregated.
    #[must_use]
    pub fn get(&self, relation: &str, id: &str) -> Option<u64> {
        self.counts.get(relation).and_then(|m| m.get(id)).copied()
    }

    /// True when nothing was aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, relation: &str, id: &str, count: u64) {
        self.counts
            .entry(relation.to_string())
            .or_default()
            .insert(id.to_string(), count);
    }
}

/// Aggregate the given relations over the primary entities.
///
/// `relations` must already be the intersection of the request's count
/// directives with the type's countable relations (the planner computes it);
/// the aggregator never invents counts outside that set.
pub async fn aggregate_counts<F: Fetcher>(
    cx: &Cx,
    fetcher: &F,
    parent_type: &str,
    relations: &[String],
    entities: &[Entity],
) -> Outcome<CountSet, Error> {
    let mut set = CountSet::default();
    if relations.is_empty() || entities.is_empty() {
        return Outcome::Ok(set);
    }

    let parent_ids: Vec<String> = entities
        .iter()
        .filter(|e| e.resource_type == parent_type)
        .map(|e| e.id.clone())
        .collect();

    for relation in relations {
        let fetch = CountFetch {
            parent_type: parent_type.to_string(),
            relation: relation.clone(),
            parent_ids: parent_ids.clone(),
        };
        match fetcher.fetch_counts(cx, &fetch).await {
            Outcome::Ok(counts) => {
                set.counts.insert(relation.clone(), counts);
            }
            Outcome::Err(e) => {
                // A collaborator failure on the count path is only a missing
                // count, not a broken document.
                let err = Error::AggregationFailure {
                    relation: relation.clone(),
                    detail: e.to_string(),
                };
                warn!(relation = %relation, error = %err, "count aggregation degraded");
            }
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        }
    }
    Outcome::Ok(set)
}

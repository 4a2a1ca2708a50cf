//! The resolution engine: one entry point turning a target plus query
//! directives into an assembled document.
//!
//! Resolution is staged: plan includes, compose filters and sort, prepare the
//! pagination strategy, execute the primary fetch, walk the plan batching
//! every eager load by parent ids, aggregate counts, then assemble. Cancellation is checked between stages and before every fetch;
//! a cancelled resolution never yields a partial document.

use std::collections::BTreeSet;
use std::sync::Arc;

use asupersync::{Cx, Outcome};
use serde_json::Value;
use tracing::{debug, warn};

use graphdoc_core::{
    CountFetch, Entity, EngineConfig, Error, FetchSource, FetchStep, Fetcher, PrimaryFetch,
    QueryDirectives, RelatedFetch, RelationshipKind, StepKind,
};
use graphdoc_query::{build_filters, build_sort, plan_includes, prepare_page, PageResult};
use graphdoc_schema::SchemaRegistry;

use crate::assemble::{Assembler, RelatedStore};
use crate::count::aggregate_counts;
use crate::document::Document;

/// What a resolution is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveTarget {
    /// The collection of a resource type.
    Collection {
        /// Resource type name.
        resource_type: String,
    },
    /// A single entity by id.
    Single {
        /// Resource type name.
        resource_type: String,
        /// Entity id.
        id: String,
    },
    /// The entities behind one entity's relationship.
    Related {
        /// Parent resource type name.
        parent_type: String,
        /// Parent entity id.
        parent_id: String,
        /// Relationship name on the parent type.
        relation: String,
    },
}

impl ResolveTarget {
    /// Target a type's collection.
    pub fn collection(resource_type: impl Into<String>) -> Self {
        Self::Collection {
            resource_type: resource_type.into(),
        }
    }

    /// Target one entity.
    pub fn single(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Single {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Target one entity's relationship.
    pub fn related(
        parent_type: impl Into<String>,
        parent_id: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self::Related {
            parent_type: parent_type.into(),
            parent_id: parent_id.into(),
            relation: relation.into(),
        }
    }
}

/// The shape and origin of one resolution, derived from its target.
struct ResolvedSource {
    source: FetchSource,
    root_type: String,
    collection_endpoint: bool,
    /// Shape forced by the target itself (single/to-one endpoints).
    forced_singular: bool,
    /// For related targets: the parent-side count to promote into top meta.
    promote: Option<(String, String, String)>,
}

/// The resolution engine. Cheap to clone; one instance serves any number of
/// concurrent resolutions against its frozen schema.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over a frozen schema with default configuration.
    #[must_use]
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The engine's schema.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolve a target under the request's directives into a document.
    pub async fn resolve<F: Fetcher>(
        &self,
        cx: &Cx,
        fetcher: &F,
        target: &ResolveTarget,
        directives: &QueryDirectives,
    ) -> Outcome<Document, Error> {
        if let Some(reason) = cx.cancel_reason() {
            return Outcome::Cancelled(reason);
        }

        let resolved = match self.resolve_source(target) {
            Ok(resolved) => resolved,
            Err(e) => return Outcome::Err(e),
        };
        let root = match self.registry.get(&resolved.root_type) {
            Ok(rt) => rt,
            Err(e) => return Outcome::Err(e),
        };

        let plan = match plan_includes(&self.registry, &root.name, directives) {
            Ok(plan) => plan,
            Err(e) => return Outcome::Err(e),
        };
        let filters = build_filters(root, directives, resolved.collection_endpoint);
        let singular = resolved.forced_singular || filters.singular;
        let sort = match build_sort(root, directives) {
            Ok(sort) => sort,
            Err(e) => return Outcome::Err(e),
        };

        // Pagination only applies to collection-shaped targets; a page
        // directive on a single or to-one endpoint is ignored.
        let prepared = if resolved.forced_singular {
            None
        } else if let Some(page) = &directives.page {
            match prepare_page(cx, fetcher, root, page).await {
                Outcome::Ok(prepared) => Some(prepared),
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            }
        } else {
            None
        };
        let window = prepared.as_ref().map(graphdoc_query::PreparedPage::window);

        debug!(
            resolve_target = ?target,
            plan_depth = plan.depth(),
            predicates = filters.predicates.len(),
            paged = prepared.is_some(),
            "resolving"
        );

        if let Some(reason) = cx.cancel_reason() {
            return Outcome::Cancelled(reason);
        }
        let fetch = PrimaryFetch {
            source: resolved.source.clone(),
            predicates: filters.predicates,
            sort,
            window,
        };
        let batch = match fetcher.fetch_primary(cx, &fetch).await {
            Outcome::Ok(batch) => batch,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        let (mut items, page_result) = match prepared {
            Some(prepared) => {
                let mut result = prepared.finish(batch);
                (std::mem::take(&mut result.items), Some(result))
            }
            None => (batch.entities, None),
        };
        if singular {
            items.truncate(1);
        }

        let store = match self.walk_plan(cx, fetcher, &plan.steps, &items).await {
            Outcome::Ok(store) => store,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(r) => return Outcome::Cancelled(r),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };

        // Counts come from the plan: count-only steps always, eager steps
        // when the request asked for the relation's count by name or alias.
        let mut count_relations: Vec<String> = Vec::new();
        for step in &plan.steps {
            let Some(rel) = root.countable_relationship(&step.relation) else {
                continue;
            };
            let requested = match step.kind {
                StepKind::CountOnly => true,
                StepKind::Eager => directives
                    .count_requested
                    .iter()
                    .any(|name| rel.answers_to(name)),
            };
            if requested && !count_relations.contains(&rel.name) {
                count_relations.push(rel.name.clone());
            }
        }
        let counts =
            match aggregate_counts(cx, fetcher, &root.name, &count_relations, &items).await {
                Outcome::Ok(counts) => counts,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };

        let promoted = match &resolved.promote {
            Some((parent_type, parent_id, meta_key)) => {
                match self
                    .promoted_count(cx, fetcher, parent_type, parent_id, meta_key)
                    .await
                {
                    Outcome::Ok(promoted) => promoted,
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                }
            }
            None => None,
        };

        if let Some(reason) = cx.cancel_reason() {
            return Outcome::Cancelled(reason);
        }

        let assembler = Assembler {
            registry: &self.registry,
            config: &self.config,
            sparse: &directives.sparse_fields,
            related: &store,
            counts: &counts,
            count_parent_type: &root.name,
        };
        let mut document = match assembler.assemble(items, singular) {
            Ok(document) => document,
            Err(e) => return Outcome::Err(e),
        };

        if let Some(result) = page_result {
            self.merge_page(&mut document, &result);
        }
        if let Some((key, count)) = promoted {
            document.meta.insert(key, count.into());
        }

        Outcome::Ok(document)
    }

    /// Derive the fetch source, endpoint kind and forced shape from a target.
    fn resolve_source(&self, target: &ResolveTarget) -> Result<ResolvedSource, Error> {
        match target {
            ResolveTarget::Collection { resource_type } => Ok(ResolvedSource {
                source: FetchSource::Collection {
                    resource_type: resource_type.clone(),
                },
                root_type: resource_type.clone(),
                collection_endpoint: true,
                forced_singular: false,
                promote: None,
            }),
            ResolveTarget::Single { resource_type, id } => Ok(ResolvedSource {
                source: FetchSource::One {
                    resource_type: resource_type.clone(),
                    id: id.clone(),
                },
                root_type: resource_type.clone(),
                collection_endpoint: false,
                forced_singular: true,
                promote: None,
            }),
            ResolveTarget::Related {
                parent_type,
                parent_id,
                relation,
            } => {
                let rel = self.registry.relationship(parent_type, relation)?;
                if rel.is_polymorphic() {
                    return Err(Error::Schema(format!(
                        "relationship endpoint {parent_type}.{relation} has multiple targets"
                    )));
                }
                let Some(target_type) = rel.targets.first().cloned() else {
                    return Err(Error::Schema(format!(
                        "relationship {parent_type}.{relation} has no target type"
                    )));
                };
                let promote = (rel.countable && rel.merge_count_meta).then(|| {
                    let key = rel.count_alias.clone().unwrap_or_else(|| rel.name.clone());
                    (parent_type.clone(), parent_id.clone(), key)
                });
                Ok(ResolvedSource {
                    source: FetchSource::Related {
                        parent_type: parent_type.clone(),
                        parent_id: parent_id.clone(),
                        relation: relation.clone(),
                        target_type: target_type.clone(),
                    },
                    root_type: target_type,
                    collection_endpoint: false,
                    forced_singular: rel.kind == RelationshipKind::ToOne,
                    promote,
                })
            }
        }
    }

    /// Execute every eager plan step, batching each fetch by parent ids.
    ///
    /// A failed eager fetch is fatal: a document must never silently omit
    /// entities an include directive promised.
    async fn walk_plan<F: Fetcher>(
        &self,
        cx: &Cx,
        fetcher: &F,
        steps: &[FetchStep],
        primary: &[Entity],
    ) -> Outcome<RelatedStore, Error> {
        let mut store = RelatedStore::new();
        let mut frontier: Vec<(&FetchStep, Vec<Entity>)> = steps
            .iter()
            .filter(|step| step.kind == StepKind::Eager)
            .map(|step| (step, primary.to_vec()))
            .collect();

        while let Some((step, parents)) = frontier.pop() {
            // Polymorphic sibling steps share a frontier of mixed types;
            // each step only touches parents of its own type.
            let mut seen = BTreeSet::new();
            let parent_ids: Vec<String> = parents
                .iter()
                .filter(|p| p.resource_type == step.parent_type)
                .filter(|p| seen.insert(p.id.clone()))
                .map(|p| p.id.clone())
                .collect();
            if parent_ids.is_empty() {
                continue;
            }

            if let Some(reason) = cx.cancel_reason() {
                return Outcome::Cancelled(reason);
            }
            let fetch = RelatedFetch {
                step: step.clone(),
                parent_ids: parent_ids.clone(),
            };
            let batch = match fetcher.fetch_related(cx, &fetch).await {
                Outcome::Ok(batch) => batch,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };

            let mut fetched = Vec::new();
            for parent_id in &parent_ids {
                // A parent the store omitted has no related entities; the
                // traversal is still recorded so linkage serializes empty.
                let related = batch.get(parent_id).map_or(&[][..], Vec::as_slice);
                store.record(&step.parent_type, parent_id, &step.relation, related);
                fetched.extend_from_slice(related);
            }

            for child in &step.children {
                if child.kind == StepKind::Eager {
                    frontier.push((child, fetched.clone()));
                }
            }
        }

        Outcome::Ok(store)
    }

    /// Fetch the parent-side count promoted into top-level meta on a
    /// relationship endpoint. Degraded on failure, like any other count.
    async fn promoted_count<F: Fetcher>(
        &self,
        cx: &Cx,
        fetcher: &F,
        parent_type: &str,
        parent_id: &str,
        meta_key: &str,
    ) -> Outcome<Option<(String, u64)>, Error> {
        let rel = match self.registry.relationship(parent_type, meta_key) {
            Ok(rel) => rel.name.clone(),
            // The key may be an alias that is not itself a relationship name.
            Err(_) => match self
                .registry
                .get(parent_type)
                .ok()
                .and_then(|rt| rt.countable_relationship(meta_key))
            {
                Some(rel) => rel.name.clone(),
                None => return Outcome::Ok(None),
            },
        };
        if let Some(reason) = cx.cancel_reason() {
            return Outcome::Cancelled(reason);
        }
        let fetch = CountFetch {
            parent_type: parent_type.to_string(),
            relation: rel,
            parent_ids: vec![parent_id.to_string()],
        };
        match fetcher.fetch_counts(cx, &fetch).await {
            Outcome::Ok(counts) => Outcome::Ok(
                counts
                    .get(parent_id)
                    .map(|count| (meta_key.to_string(), *count)),
            ),
            Outcome::Err(err) => {
                warn!(
                    parent_type = %parent_type,
                    relation = %meta_key,
                    error = %err,
                    "promoted count degraded"
                );
                Outcome::Ok(None)
            }
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    /// Merge pagination meta and links into an assembled document.
    fn merge_page(&self, document: &mut Document, result: &PageResult) {
        let meta = serde_json::to_value(&result.meta).unwrap_or_default();
        document.meta.insert(self.config.page_meta_key.clone(), meta);
        for (name, link) in result.links.entries() {
            document
                .links
                .insert(name.to_string(), Value::String(link.to_string()));
        }
    }
}

//! In-memory storage backend and the shared blog graph for engine tests.
#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use asupersync::types::CancelKind;
use asupersync::{Cx, Outcome};
use serde_json::Value;

use graphdoc::{
    AttributeDef, CountFetch, Entity, EntityKey, Error, FetchSource, FetchWindow, Fetcher,
    FilterDef, FilterValueParser, PaginatorKind, PrimaryBatch, PrimaryFetch, RelatedBatch,
    RelatedFetch, RelationshipDef, ResourceType, SchemaBuilder, SchemaRegistry, SortDirection,
    SubRelationship,
};

/// The blog resource graph most engine tests resolve against.
///
/// `posts` paginates by offset and allows two include levels; `events`
/// paginates by keyset over `created_at`. The `media` relation fans out to
/// images and videos, and only the image branch can continue to `creator`.
pub fn blog_schema() -> Arc<SchemaRegistry> {
    SchemaBuilder::new()
        .register(
            ResourceType::new("posts")
                .attribute(AttributeDef::new("title").sortable())
                .attribute(AttributeDef::new("body"))
                .attribute(AttributeDef::new("visibility").always_serialized())
                .relationship(RelationshipDef::to_one("author", "users"))
                .relationship(
                    RelationshipDef::to_many("comments", "comments")
                        .countable()
                        .count_alias("comments_count"),
                )
                .relationship(RelationshipDef::polymorphic(
                    "media",
                    vec![
                        SubRelationship::new("images", "images"),
                        SubRelationship::new("videos", "videos"),
                    ],
                ))
                .filter(FilterDef::new("published").parser(FilterValueParser::Boolean))
                .filter(FilterDef::new("slug").singular())
                .max_include_depth(2)
                .default_page_size(15),
        )
        .register(
            ResourceType::new("comments")
                .attribute(AttributeDef::new("text"))
                .relationship(RelationshipDef::to_one("user", "users")),
        )
        .register(
            ResourceType::new("users")
                .attribute(AttributeDef::new("name"))
                .attribute(AttributeDef::new("email")),
        )
        .register(
            ResourceType::new("images")
                .attribute(AttributeDef::new("url"))
                .relationship(RelationshipDef::to_one("creator", "users")),
        )
        .register(ResourceType::new("videos").attribute(AttributeDef::new("duration")))
        .register(
            ResourceType::new("events")
                .attribute(AttributeDef::new("created_at"))
                .attribute(AttributeDef::new("name"))
                .paginator(PaginatorKind::cursor())
                .default_page_size(10),
        )
        .freeze()
        .expect("blog schema freezes")
}

/// Two posts, two users, two comments and a polymorphic media edge each.
pub fn seed_blog(store: &mut MemoryStore) {
    store.insert(
        Entity::new("users", "u1")
            .attr("name", "Alice")
            .attr("email", "alice@example.com"),
    );
    store.insert(
        Entity::new("users", "u2")
            .attr("name", "Bob")
            .attr("email", "bob@example.com"),
    );
    store.insert(
        Entity::new("posts", "p1")
            .attr("title", "Hello")
            .attr("body", "first")
            .attr("visibility", "public")
            .attr("published", true)
            .attr("slug", "hello"),
    );
    store.insert(
        Entity::new("posts", "p2")
            .attr("title", "Draft")
            .attr("body", "second")
            .attr("visibility", "private")
            .attr("published", false)
            .attr("slug", "draft"),
    );
    store.insert(Entity::new("comments", "c1").attr("text", "Nice"));
    store.insert(Entity::new("comments", "c2").attr("text", "Agreed"));
    store.insert(Entity::new("images", "m1").attr("url", "/m1.png"));
    store.insert(Entity::new("videos", "v1").attr("duration", 30));

    store.relate("posts", "p1", "author", "users", "u1");
    store.relate("posts", "p2", "author", "users", "u2");
    store.relate("posts", "p1", "comments", "comments", "c1");
    store.relate("posts", "p1", "comments", "comments", "c2");
    // The post author also wrote the first comment.
    store.relate("comments", "c1", "user", "users", "u1");
    store.relate("comments", "c2", "user", "users", "u2");
    store.relate("posts", "p1", "media", "images", "m1");
    store.relate("posts", "p2", "media", "videos", "v1");
    store.relate("images", "m1", "creator", "users", "u2");
}

/// A deterministic in-memory store: entities per type in insertion order,
/// relation edges keyed by `(parent type, parent id, relation)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: BTreeMap<String, Vec<Entity>>,
    relations: BTreeMap<(String, String, String), Vec<EntityKey>>,
    counts: BTreeMap<(String, String, String), u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) -> &mut Self {
        self.entities
            .entry(entity.resource_type.clone())
            .or_default()
            .push(entity);
        self
    }

    pub fn relate(
        &mut self,
        parent_type: &str,
        parent_id: &str,
        relation: &str,
        target_type: &str,
        target_id: &str,
    ) -> &mut Self {
        self.relations
            .entry((
                parent_type.to_string(),
                parent_id.to_string(),
                relation.to_string(),
            ))
            .or_default()
            .push(EntityKey::new(target_type, target_id));
        self
    }

    /// Override the reported cardinality of one relation edge set.
    pub fn set_count(
        &mut self,
        parent_type: &str,
        parent_id: &str,
        relation: &str,
        count: u64,
    ) -> &mut Self {
        self.counts.insert(
            (
                parent_type.to_string(),
                parent_id.to_string(),
                relation.to_string(),
            ),
            count,
        );
        self
    }

    fn entity(&self, resource_type: &str, id: &str) -> Option<&Entity> {
        self.entities
            .get(resource_type)?
            .iter()
            .find(|e| e.id == id)
    }

    fn base_list(&self, source: &FetchSource) -> Vec<Entity> {
        match source {
            FetchSource::Collection { resource_type } => self
                .entities
                .get(resource_type)
                .cloned()
                .unwrap_or_default(),
            FetchSource::One { resource_type, id } => {
                self.entity(resource_type, id).cloned().into_iter().collect()
            }
            FetchSource::Related {
                parent_type,
                parent_id,
                relation,
                target_type,
            } => self
                .relations
                .get(&(
                    parent_type.clone(),
                    parent_id.clone(),
                    relation.clone(),
                ))
                .map(|keys| {
                    keys.iter()
                        .filter(|key| key.resource_type == *target_type)
                        .filter_map(|key| self.entity(&key.resource_type, &key.id).cloned())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn value_matches(attr: Option<&Value>, wanted: &Value) -> bool {
    match wanted {
        Value::Array(options) => attr.is_some_and(|v| options.contains(v)),
        other => attr == Some(other),
    }
}

fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Keyset order: cursor column descending, id descending as tiebreak.
fn keyset_sort(entities: &mut [Entity], column: &str) {
    entities.sort_by(|a, b| {
        cmp_values(b.attribute(column), a.attribute(column)).then_with(|| b.id.cmp(&a.id))
    });
}

fn apply_cursor_window(
    mut entities: Vec<Entity>,
    column: &str,
    after: Option<&graphdoc::CursorPos>,
    before: Option<&graphdoc::CursorPos>,
    limit: u64,
) -> Vec<Entity> {
    keyset_sort(&mut entities, column);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let position = |entities: &[Entity], pos: &graphdoc::CursorPos| {
        entities
            .iter()
            .position(|e| e.id == pos.id && e.attribute(column) == Some(&pos.value))
    };
    if let Some(pos) = after {
        let Some(idx) = position(&entities, pos) else {
            return Vec::new();
        };
        return entities.into_iter().skip(idx + 1).take(limit).collect();
    }
    if let Some(pos) = before {
        let Some(idx) = position(&entities, pos) else {
            return Vec::new();
        };
        // The rows immediately preceding the cursor, closest last; the
        // look-ahead row (if any) sits at the front.
        let start = idx.saturating_sub(limit);
        return entities[start..idx].to_vec();
    }
    entities.truncate(limit);
    entities
}

impl Fetcher for MemoryStore {
    async fn fetch_primary(&self, _cx: &Cx, fetch: &PrimaryFetch) -> Outcome<PrimaryBatch, Error> {
        let mut entities = self.base_list(&fetch.source);
        entities.retain(|entity| {
            fetch
                .predicates
                .iter()
                .all(|p| value_matches(entity.attribute(&p.column), &p.value))
        });

        for key in fetch.sort.iter().rev() {
            entities.sort_by(|a, b| {
                let ord = cmp_values(a.attribute(&key.column), b.attribute(&key.column));
                match key.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let (entities, total) = match &fetch.window {
            None => (entities, None),
            Some(FetchWindow::Offset {
                offset,
                limit,
                want_total,
            }) => {
                let total = want_total.then(|| entities.len() as u64);
                let offset = usize::try_from(*offset).unwrap_or(usize::MAX);
                let limit = usize::try_from(*limit).unwrap_or(usize::MAX);
                (
                    entities.into_iter().skip(offset).take(limit).collect(),
                    total,
                )
            }
            Some(FetchWindow::Cursor {
                column,
                after,
                before,
                limit,
            }) => (
                apply_cursor_window(entities, column, after.as_ref(), before.as_ref(), *limit),
                None,
            ),
        };

        Outcome::Ok(PrimaryBatch { entities, total })
    }

    async fn fetch_related(&self, _cx: &Cx, fetch: &RelatedFetch) -> Outcome<RelatedBatch, Error> {
        let mut batch = RelatedBatch::new();
        for parent_id in &fetch.parent_ids {
            let Some(keys) = self.relations.get(&(
                fetch.step.parent_type.clone(),
                parent_id.clone(),
                fetch.step.relation.clone(),
            )) else {
                continue;
            };
            let related: Vec<Entity> = keys
                .iter()
                .filter(|key| key.resource_type == fetch.step.target_type)
                .filter_map(|key| self.entity(&key.resource_type, &key.id).cloned())
                .collect();
            batch.insert(parent_id.clone(), related);
        }
        Outcome::Ok(batch)
    }

    async fn fetch_counts(
        &self,
        _cx: &Cx,
        fetch: &CountFetch,
    ) -> Outcome<BTreeMap<String, u64>, Error> {
        let mut counts = BTreeMap::new();
        for parent_id in &fetch.parent_ids {
            let edge = (
                fetch.parent_type.clone(),
                parent_id.clone(),
                fetch.relation.clone(),
            );
            if let Some(count) = self.counts.get(&edge) {
                counts.insert(parent_id.clone(), *count);
            } else if let Some(keys) = self.relations.get(&edge) {
                counts.insert(parent_id.clone(), keys.len() as u64);
            }
        }
        Outcome::Ok(counts)
    }

    async fn resolve_cursor(
        &self,
        _cx: &Cx,
        resource_type: &str,
        id: &str,
        column: &str,
    ) -> Outcome<Option<Value>, Error> {
        Outcome::Ok(
            self.entity(resource_type, id)
                .and_then(|e| e.attribute(column).cloned()),
        )
    }
}

/// A store that serves the primary fetch, then cancels the context. Whatever
/// the engine does next must observe the cancellation.
#[derive(Debug, Default)]
pub struct CancellingStore {
    pub inner: MemoryStore,
}

impl Fetcher for CancellingStore {
    async fn fetch_primary(&self, cx: &Cx, fetch: &PrimaryFetch) -> Outcome<PrimaryBatch, Error> {
        let batch = self.inner.fetch_primary(cx, fetch).await;
        cx.cancel_with(CancelKind::User, Some("client went away"));
        batch
    }

    async fn fetch_related(&self, cx: &Cx, fetch: &RelatedFetch) -> Outcome<RelatedBatch, Error> {
        self.inner.fetch_related(cx, fetch).await
    }

    async fn fetch_counts(
        &self,
        cx: &Cx,
        fetch: &CountFetch,
    ) -> Outcome<BTreeMap<String, u64>, Error> {
        self.inner.fetch_counts(cx, fetch).await
    }

    async fn resolve_cursor(
        &self,
        cx: &Cx,
        resource_type: &str,
        id: &str,
        column: &str,
    ) -> Outcome<Option<Value>, Error> {
        self.inner.resolve_cursor(cx, resource_type, id, column).await
    }
}

/// A store whose eager loads always fail; primary fetches still succeed.
#[derive(Debug, Default)]
pub struct BrokenRelatedStore {
    pub inner: MemoryStore,
}

impl Fetcher for BrokenRelatedStore {
    async fn fetch_primary(&self, cx: &Cx, fetch: &PrimaryFetch) -> Outcome<PrimaryBatch, Error> {
        self.inner.fetch_primary(cx, fetch).await
    }

    async fn fetch_related(
        &self,
        _cx: &Cx,
        fetch: &RelatedFetch,
    ) -> Outcome<RelatedBatch, Error> {
        Outcome::Err(Error::Fetch(format!(
            "related fetch unavailable for {}",
            fetch.step.relation
        )))
    }

    async fn fetch_counts(
        &self,
        _cx: &Cx,
        _fetch: &CountFetch,
    ) -> Outcome<BTreeMap<String, u64>, Error> {
        Outcome::Err(Error::Fetch("counts unavailable".to_string()))
    }

    async fn resolve_cursor(
        &self,
        cx: &Cx,
        resource_type: &str,
        id: &str,
        column: &str,
    ) -> Outcome<Option<Value>, Error> {
        self.inner.resolve_cursor(cx, resource_type, id, column).await
    }
}

//! Pagination strategies.
//!
//! Two structurally different strategies, one output shape: both produce a
//! [`PageResult`] with uniform meta and navigation descriptors, so the
//! document assembler never branches on strategy identity.
//!
//! - **Offset**: page number/size mapped to a skip/limit window. Full mode
//!   also reports the unbounded total and derived last page; simple mode
//!   skips the count query and the metadata derived from it.
//! - **Cursor**: keyset ordering by the configured cursor column descending,
//!   primary id as deterministic tie-break (the cursor column is not
//!   guaranteed unique). Cursors are entity ids resolved to column values
//!   through the storage collaborator; an unresolvable cursor is an error,
//!   never a silent empty page. The fetch window carries a one-row
//!   look-ahead to detect whether more items exist without a total count.
//!
//! Navigation links are query-fragment descriptors
//! (`page[number]=2&page[size]=15`); transport is out of scope, so the
//! caller prefixes them with whatever URL it serves.

use asupersync::{Cx, Outcome};
use serde::Serialize;
use serde_json::Value;

use graphdoc_core::directives::CursorSide;
use graphdoc_core::{
    CursorPos, Entity, Error, Fetcher, FetchWindow, Page, PrimaryBatch, ResourceType,
    PaginatorKind,
};

/// Uniform page metadata. Offset mode fills the index-based members; cursor
/// mode fills `from`/`to` with cursor-column values and `has_more`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Current page number (offset mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    /// Page size.
    pub per_page: u64,
    /// First item position: 1-based index (offset) or cursor value (cursor).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    /// Last item position: 1-based index (offset) or cursor value (cursor).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
    /// Last page number (offset full mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<u64>,
    /// Unbounded total (offset full mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Whether a following page exists (cursor mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

/// Navigation descriptors, present only where the page they denote exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// First page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Last page (offset full mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// Preceding page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    /// The present links as `(name, descriptor)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("first", self.first.as_deref()),
            ("last", self.last.as_deref()),
            ("prev", self.prev.as_deref()),
            ("next", self.next.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, link)| link.map(|l| (name, l)))
    }
}

/// The uniform pagination output.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// The page's entities, window applied and look-ahead trimmed.
    pub items: Vec<Entity>,
    /// Page metadata.
    pub meta: PageMeta,
    /// Navigation descriptors.
    pub links: PageLinks,
}

/// A strategy instance prepared for one request: cursors resolved, window
/// computable, ready to post-process the primary batch.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedPage {
    /// Offset strategy state.
    Offset(OffsetPage),
    /// Cursor strategy state.
    Cursor(CursorPage),
}

/// Prepared offset-strategy state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetPage {
    number: u64,
    size: u64,
    simple: bool,
}

/// Prepared cursor-strategy state.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPage {
    column: String,
    limit: u64,
    side: Option<CursorSide>,
    after: Option<CursorPos>,
    before: Option<CursorPos>,
}

/// Prepare the resource type's pagination strategy for a request.
///
/// Offset preparation is pure; cursor preparation resolves the request's
/// `after`/`before` entity id to its cursor-column value through the
/// collaborator, failing with [`Error::UnresolvableCursor`] when the entity
/// does not exist.
pub async fn prepare_page<F: Fetcher>(
    cx: &Cx,
    fetcher: &F,
    resource_type: &ResourceType,
    page: &Page,
) -> Outcome<PreparedPage, Error> {
    match &resource_type.paginator {
        PaginatorKind::Offset { simple } => {
            let (number, size) = match page {
                Page::Offset { number, size } => (
                    number.unwrap_or(1).max(1),
                    size.unwrap_or(resource_type.default_page_size),
                ),
                // A cursor-shaped spec against an offset type degrades to
                // the first page of the default size.
                Page::Cursor { limit, .. } => {
                    (1, limit.unwrap_or(resource_type.default_page_size))
                }
            };
            Outcome::Ok(PreparedPage::Offset(OffsetPage {
                number,
                size: size.max(1),
                simple: *simple,
            }))
        }
        PaginatorKind::Cursor { column } => {
            let limit = match page {
                Page::Cursor { limit, .. } => limit.unwrap_or(resource_type.default_page_size),
                Page::Offset { size, .. } => size.unwrap_or(resource_type.default_page_size),
            }
            .max(1);

            let mut state = CursorPage {
                column: column.clone(),
                limit,
                side: None,
                after: None,
                before: None,
            };

            if let Some((id, side)) = page.effective_cursor() {
                let value = match fetcher
                    .resolve_cursor(cx, &resource_type.name, id, column)
                    .await
                {
                    Outcome::Ok(Some(value)) => value,
                    Outcome::Ok(None) => {
                        return Outcome::Err(Error::UnresolvableCursor {
                            resource_type: resource_type.name.clone(),
                            cursor: id.to_string(),
                        });
                    }
                    Outcome::Err(e) => return Outcome::Err(e),
                    Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                    Outcome::Panicked(p) => return Outcome::Panicked(p),
                };
                let pos = CursorPos {
                    value,
                    id: id.to_string(),
                };
                state.side = Some(side);
                match side {
                    CursorSide::After => state.after = Some(pos),
                    CursorSide::Before => state.before = Some(pos),
                }
            }
            Outcome::Ok(PreparedPage::Cursor(state))
        }
    }
}

impl PreparedPage {
    /// The bounded window the primary fetch must apply.
    #[must_use]
    pub fn window(&self) -> FetchWindow {
        match self {
            PreparedPage::Offset(o) => FetchWindow::Offset {
                offset: (o.number - 1) * o.size,
                limit: o.size,
                want_total: !o.simple,
            },
            PreparedPage::Cursor(c) => FetchWindow::Cursor {
                column: c.column.clone(),
                after: c.after.clone(),
                before: c.before.clone(),
                limit: c.limit + 1,
            },
        }
    }

    /// Post-process the fetched batch into the uniform page result.
    #[must_use]
    pub fn finish(self, batch: PrimaryBatch) -> PageResult {
        match self {
            PreparedPage::Offset(o) => o.finish(batch),
            PreparedPage::Cursor(c) => c.finish(batch),
        }
    }
}

fn offset_link(number: u64, size: u64) -> String {
    format!("page[number]={number}&page[size]={size}")
}

impl OffsetPage {
    fn finish(self, batch: PrimaryBatch) -> PageResult {
        let len = batch.entities.len() as u64;
        let offset = (self.number - 1) * self.size;

        let mut meta = PageMeta {
            current_page: Some(self.number),
            per_page: self.size,
            from: (len > 0).then(|| Value::from(offset + 1)),
            to: (len > 0).then(|| Value::from(offset + len)),
            ..PageMeta::default()
        };

        let mut links = PageLinks {
            first: Some(offset_link(1, self.size)),
            ..PageLinks::default()
        };

        if self.simple {
            // No count query: a full page is the only signal a next page may
            // exist.
            if len == self.size {
                links.next = Some(offset_link(self.number + 1, self.size));
            }
        } else if let Some(total) = batch.total {
            let last_page = total.div_ceil(self.size).max(1);
            meta.total = Some(total);
            meta.last_page = Some(last_page);
            links.last = Some(offset_link(last_page, self.size));
            if self.number > 1 {
                links.prev = Some(offset_link(self.number - 1, self.size));
            }
            if self.number < last_page {
                links.next = Some(offset_link(self.number + 1, self.size));
            }
        }

        PageResult {
            items: batch.entities,
            meta,
            links,
        }
    }
}

impl CursorPage {
    fn finish(self, batch: PrimaryBatch) -> PageResult {
        let mut items = batch.entities;
        let has_more = items.len() as u64 > self.limit;
        if has_more {
            // Drop the look-ahead row on the far side of the traversal.
            match self.side {
                Some(CursorSide::Before) => {
                    items.remove(0);
                }
                _ => {
                    items.pop();
                }
            }
        }

        let cursor_value = |entity: &Entity| entity.attribute(&self.column).cloned();
        let meta = PageMeta {
            per_page: self.limit,
            from: items.first().and_then(&cursor_value),
            to: items.last().and_then(&cursor_value),
            has_more: Some(has_more),
            ..PageMeta::default()
        };

        let limit = self.limit;
        let next_from = |entity: &Entity| format!("page[after]={}&page[limit]={limit}", entity.id);
        let prev_from = |entity: &Entity| format!("page[before]={}&page[limit]={limit}", entity.id);

        let mut links = PageLinks {
            first: Some(format!("page[limit]={limit}")),
            ..PageLinks::default()
        };
        match self.side {
            // First page: a following page exists iff the look-ahead hit.
            None => {
                links.next = has_more.then(|| items.last().map(&next_from)).flatten();
            }
            // Paging forward: the page we came from precedes this one.
            Some(CursorSide::After) => {
                links.prev = items.first().map(&prev_from);
                links.next = has_more.then(|| items.last().map(&next_from)).flatten();
            }
            // Paging backward: the page we came from follows this one.
            Some(CursorSide::Before) => {
                links.next = items.last().map(&next_from);
                links.prev = has_more.then(|| items.first().map(&prev_from)).flatten();
            }
        }

        PageResult { items, meta, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entities(ids: &[(&str, i64)]) -> Vec<Entity> {
        ids.iter()
            .map(|(id, ts)| Entity::new("posts", *id).attr("created_at", *ts))
            .collect()
    }

    fn offset(number: u64, size: u64, simple: bool) -> OffsetPage {
        OffsetPage {
            number,
            size,
            simple,
        }
    }

    #[test]
    fn test_offset_window() {
        let prepared = PreparedPage::Offset(offset(3, 15, false));
        assert_eq!(
            prepared.window(),
            FetchWindow::Offset {
                offset: 30,
                limit: 15,
                want_total: true,
            }
        );
    }

    #[test]
    fn test_offset_first_page_meta_and_links() {
        let batch = PrimaryBatch {
            entities: entities(&[("1", 0); 15]),
            total: Some(50),
        };
        let result = offset(1, 15, false).finish(batch);

        assert_eq!(result.meta.current_page, Some(1));
        assert_eq!(result.meta.per_page, 15);
        assert_eq!(result.meta.from, Some(json!(1)));
        assert_eq!(result.meta.to, Some(json!(15)));
        assert_eq!(result.meta.last_page, Some(4));
        assert_eq!(result.meta.total, Some(50));

        assert!(result.links.first.is_some());
        assert!(result.links.last.is_some());
        assert_eq!(
            result.links.next.as_deref(),
            Some("page[number]=2&page[size]=15")
        );
        assert!(result.links.prev.is_none());
    }

    #[test]
    fn test_offset_last_page_omits_next() {
        let batch = PrimaryBatch {
            entities: entities(&[("46", 0), ("47", 0), ("48", 0), ("49", 0), ("50", 0)]),
            total: Some(50),
        };
        let result = offset(4, 15, false).finish(batch);
        assert_eq!(result.meta.from, Some(json!(46)));
        assert_eq!(result.meta.to, Some(json!(50)));
        assert!(result.links.next.is_none());
        assert_eq!(
            result.links.prev.as_deref(),
            Some("page[number]=3&page[size]=15")
        );
    }

    #[test]
    fn test_offset_empty_page() {
        let batch = PrimaryBatch {
            entities: Vec::new(),
            total: Some(0),
        };
        let result = offset(1, 10, false).finish(batch);
        assert!(result.meta.from.is_none());
        assert!(result.meta.to.is_none());
        assert_eq!(result.meta.last_page, Some(1));
        assert!(result.links.next.is_none());
        assert!(result.links.prev.is_none());
    }

    #[test]
    fn test_simple_mode_skips_total_and_last() {
        let prepared = PreparedPage::Offset(offset(2, 2, true));
        assert_eq!(
            prepared.window(),
            FetchWindow::Offset {
                offset: 2,
                limit: 2,
                want_total: false,
            }
        );

        let batch = PrimaryBatch {
            entities: entities(&[("3", 0), ("4", 0)]),
            total: None,
        };
        let result = offset(2, 2, true).finish(batch);
        assert!(result.meta.total.is_none());
        assert!(result.meta.last_page.is_none());
        assert!(result.links.last.is_none());
        assert!(result.links.prev.is_none());
        // Full page: assume a following page.
        assert_eq!(
            result.links.next.as_deref(),
            Some("page[number]=3&page[size]=2")
        );
    }

    #[test]
    fn test_simple_mode_short_page_has_no_next() {
        let batch = PrimaryBatch {
            entities: entities(&[("5", 0)]),
            total: None,
        };
        let result = offset(3, 2, true).finish(batch);
        assert!(result.links.next.is_none());
    }

    fn cursor(limit: u64, side: Option<CursorSide>) -> CursorPage {
        CursorPage {
            column: "created_at".into(),
            limit,
            side,
            after: None,
            before: None,
        }
    }

    #[test]
    fn test_cursor_window_adds_look_ahead() {
        let prepared = PreparedPage::Cursor(cursor(10, None));
        match prepared.window() {
            FetchWindow::Cursor { limit, .. } => assert_eq!(limit, 11),
            other => panic!("unexpected window {other:?}"),
        }
    }

    #[test]
    fn test_cursor_first_page_with_more() {
        // 11 rows returned for limit 10: look-ahead hit.
        let rows: Vec<Entity> = (0..11)
            .map(|i| Entity::new("posts", format!("{}", 100 - i)).attr("created_at", 100 - i))
            .collect();
        let result = cursor(10, None).finish(PrimaryBatch {
            entities: rows,
            total: None,
        });

        assert_eq!(result.items.len(), 10);
        assert_eq!(result.meta.has_more, Some(true));
        assert_eq!(result.meta.from, Some(json!(100)));
        assert_eq!(result.meta.to, Some(json!(91)));
        assert_eq!(
            result.links.next.as_deref(),
            Some("page[after]=91&page[limit]=10")
        );
        assert!(result.links.prev.is_none());
        assert!(result.links.first.is_some());
    }

    #[test]
    fn test_cursor_exhausted_page() {
        let rows = entities(&[("3", 30), ("2", 20)]);
        let result = cursor(10, Some(CursorSide::After)).finish(PrimaryBatch {
            entities: rows,
            total: None,
        });
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.meta.has_more, Some(false));
        assert!(result.links.next.is_none());
        // We paged past the start, so a preceding page exists.
        assert_eq!(
            result.links.prev.as_deref(),
            Some("page[before]=3&page[limit]=10")
        );
    }

    #[test]
    fn test_cursor_before_trims_far_side() {
        // Backward traversal: look-ahead row is the oldest-first row.
        let rows = entities(&[("9", 90), ("8", 80), ("7", 70)]);
        let result = cursor(2, Some(CursorSide::Before)).finish(PrimaryBatch {
            entities: rows,
            total: None,
        });
        assert_eq!(result.items.len(), 2);
        let ids: Vec<&str> = result.items.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["8", "7"]);
        assert_eq!(result.meta.has_more, Some(true));
        assert_eq!(
            result.links.prev.as_deref(),
            Some("page[before]=8&page[limit]=2")
        );
        assert_eq!(
            result.links.next.as_deref(),
            Some("page[after]=7&page[limit]=2")
        );
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let meta = PageMeta {
            current_page: Some(1),
            per_page: 15,
            from: Some(json!(1)),
            to: Some(json!(15)),
            last_page: Some(4),
            total: Some(50),
            has_more: None,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            value,
            json!({
                "currentPage": 1,
                "perPage": 15,
                "from": 1,
                "to": 15,
                "lastPage": 4,
                "total": 50,
            })
        );
    }
}

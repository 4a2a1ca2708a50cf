//! Sort validation and resolution.

use graphdoc_core::{Error, QueryDirectives, ResourceType, Result, SortKey};

/// Resolve the request's sort directives against the type's sortable
/// attributes, preserving request order.
///
/// Cursor-paginated types reject any non-empty sort: cursor order is fixed by
/// the paginator's cursor column. The registry already rejects such schemas
/// at freeze time; this is the defensive per-request double.
pub fn build_sort(resource_type: &ResourceType, directives: &QueryDirectives) -> Result<Vec<SortKey>> {
    if directives.sort.is_empty() {
        return Ok(Vec::new());
    }
    if resource_type.paginator.is_cursor() {
        return Err(Error::IncompatibleSortForPaginator {
            resource_type: resource_type.name.clone(),
        });
    }

    directives
        .sort
        .iter()
        .map(|directive| {
            let attr = resource_type
                .attribute_def(&directive.field)
                .filter(|a| a.sortable)
                .ok_or_else(|| Error::InvalidSort {
                    resource_type: resource_type.name.clone(),
                    field: directive.field.clone(),
                })?;
            Ok(SortKey::new(attr.key.clone(), directive))
        })
        .collect()
}

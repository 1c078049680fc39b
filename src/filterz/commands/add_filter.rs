use crate::commands::create_group;
use crate::model::{Connector, Filter, FilterId, GroupId, ItemRef};
use crate::store::{FilterStore, IdAllocator};
use tracing::debug;

/// Appends a new filter with the default type and predicate and no reference value.
///
/// Adding to an empty root first creates an AND group under root and places the
/// filter there; if that group cannot be created the filter goes straight into
/// root. Returns `None` without touching the store when `group_id` is unknown.
pub fn run(store: &mut FilterStore, group_id: &GroupId) -> Option<FilterId> {
    if store.group(group_id).is_none() {
        debug!(group = %group_id, "add filter: no such group");
        return None;
    }

    let target = if group_id.is_root() && store.root_group().is_empty() {
        create_group::run(store, group_id, Connector::And).unwrap_or_else(|| group_id.clone())
    } else {
        group_id.clone()
    };

    let id = store.next_filter_id();
    let filter_type = store.default_filter_type();
    let predicate = store.default_predicate(&filter_type);
    store
        .filters_mut()
        .push(Filter::new(id, filter_type, predicate, "", target.clone()));
    if let Some(group) = store.group_mut(&target) {
        group.items.push(ItemRef::filter(id));
    }

    debug!(id, group = %target, "filter added");
    Some(id)
}

use crate::error::{FilterzError, Result};
use crate::logic;
use crate::model::{Filter, Group, GroupId};
use crate::store::FilterStore;
use std::collections::BTreeMap;

/// Default filename for exported documents.
pub const DEFAULT_EXPORT_FILENAME: &str = "filters.json";

/// Pretty-printed (two-space indented) JSON Logic text for a tree.
///
/// Returns `Ok(None)` when there is nothing to export.
pub fn export_as_json(
    filters: &[Filter],
    root: &Group,
    groups: &BTreeMap<GroupId, Group>,
) -> Result<Option<String>> {
    let Some(document) = logic::serialize(filters, root, groups) else {
        return Ok(None);
    };
    let text = serde_json::to_string_pretty(&document).map_err(FilterzError::Serialization)?;
    Ok(Some(text))
}

pub fn run(store: &FilterStore) -> Result<Option<String>> {
    export_as_json(store.filters(), store.root_group(), store.groups())
}

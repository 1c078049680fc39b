use crate::model::GroupId;
use crate::store::FilterStore;
use tracing::debug;

/// Flips a group's connector between AND and OR. Unknown groups are ignored.
pub fn run(store: &mut FilterStore, id: &GroupId) {
    if store.group(id).is_none() {
        debug!(group = %id, "toggle: no such group");
        return;
    }
    if let Some(group) = store.group_mut(id) {
        group.connector = group.connector.toggled();
        debug!(group = %id, connector = %group.connector, "connector toggled");
    }
}

use crate::model::{Connector, Group, GroupId, ItemRef};
use crate::store::{FilterStore, IdAllocator};
use tracing::{debug, warn};

/// Creates an empty group under `parent` and returns its id.
///
/// Returns `None` when `parent` does not exist, or when it equals the freshly
/// allocated id (a group may not contain itself).
pub fn run(store: &mut FilterStore, parent: &GroupId, connector: Connector) -> Option<GroupId> {
    if store.group(parent).is_none() {
        debug!(parent = %parent, "create group: no such parent");
        return None;
    }

    let id = store.next_group_id();
    if &id == parent {
        warn!(group = %id, "refusing to create a group inside itself");
        return None;
    }

    store
        .groups_mut()
        .insert(id.clone(), Group::new(id.clone(), connector));
    store
        .group_mut(parent)?
        .items
        .push(ItemRef::group(id.clone()));

    debug!(group = %id, parent = %parent, %connector, "group created");
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn creates_under_root() {
        let mut fixture = StoreFixture::new();
        let id = run(&mut fixture.store, &GroupId::root(), Connector::Or).unwrap();

        assert_eq!(id, GroupId::from("group-0"));
        assert_eq!(fixture.store.root_group().items, vec![ItemRef::group(id.clone())]);
        let group = &fixture.store.groups()[&id];
        assert_eq!(group.connector, Connector::Or);
        assert!(group.is_empty());
    }

    #[test]
    fn nests_under_named_group() {
        let mut fixture = StoreFixture::new().with_group("root", Connector::And);
        let parent = GroupId::from_index(0);
        let child = run(&mut fixture.store, &parent, Connector::Or).unwrap();

        assert_eq!(child, GroupId::from_index(1));
        assert_eq!(
            fixture.store.groups()[&parent].items,
            vec![ItemRef::group(child)]
        );
        assert_eq!(fixture.store.root_group().items.len(), 1);
    }

    #[test]
    fn missing_parent_is_refused() {
        let mut fixture = StoreFixture::new();
        assert_eq!(
            run(&mut fixture.store, &GroupId::from("group-3"), Connector::And),
            None
        );
        assert!(fixture.store.groups().is_empty());
    }

    #[test]
    fn group_ids_are_distinct() {
        let mut fixture = StoreFixture::new();
        let a = run(&mut fixture.store, &GroupId::root(), Connector::And).unwrap();
        let b = run(&mut fixture.store, &a, Connector::And).unwrap();
        let c = run(&mut fixture.store, &GroupId::root(), Connector::Or).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(fixture.store.groups().len(), 3);
    }
}

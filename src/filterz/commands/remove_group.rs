use crate::model::{GroupId, ItemRef};
use crate::store::FilterStore;
use crate::tree::TreeView;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Removes a group together with every filter and group nested in it, then
/// strips every reference to the removed groups from what remains.
///
/// Root cannot be removed; unknown ids are ignored.
pub fn run(store: &mut FilterStore, id: &GroupId) {
    if id.is_root() {
        warn!("the root group cannot be removed");
        return;
    }
    if !store.groups().contains_key(id) {
        debug!(group = %id, "remove group: no such group");
        return;
    }

    let subtree = TreeView::of_store(store).subtree(id);

    let doomed: HashSet<_> = subtree.filters.iter().copied().collect();
    if !doomed.is_empty() {
        store.filters_mut().retain(|f| !doomed.contains(&f.id));
    }

    let groups = store.groups_mut();
    for group_id in &subtree.groups {
        groups.remove(group_id);
    }
    for group_id in &subtree.groups {
        store.strip_references(&ItemRef::group(group_id.clone()));
    }
    for filter_id in &subtree.filters {
        store.strip_references(&ItemRef::filter(*filter_id));
    }

    debug!(
        group = %id,
        filters = subtree.filters.len(),
        groups = subtree.groups.len(),
        "group removed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_group;
    use crate::model::{Connector, Relation};
    use crate::store::memory::fixtures::StoreFixture;

    /// root -> [group-0 -> [f, group-1 -> [f, f]], group-2 -> [f]]
    fn nested() -> StoreFixture {
        let mut fixture = StoreFixture::new()
            .with_group("root", Connector::And)
            .with_group("group-0", Connector::Or)
            .with_group("root", Connector::Or);
        fixture.add("group-0", "count", Relation::Lt, "1");
        fixture.add("group-1", "count", Relation::Gt, "2");
        fixture.add("group-1", "name", Relation::Eq, "alice");
        fixture.add("group-2", "salary", Relation::Ge, "3");
        fixture
    }

    #[test]
    fn cascades_through_nested_groups() {
        let mut fixture = nested();
        run(&mut fixture.store, &GroupId::from_index(0));

        let store = &fixture.store;
        assert_eq!(store.filters().len(), 1);
        assert_eq!(store.filters()[0].filter_type, "salary");
        assert_eq!(
            store.groups().keys().cloned().collect::<Vec<_>>(),
            vec![GroupId::from_index(2)]
        );
        assert_eq!(
            store.root_group().items,
            vec![ItemRef::group(GroupId::from_index(2))]
        );
    }

    #[test]
    fn leaves_no_dangling_references() {
        let mut fixture = nested();
        run(&mut fixture.store, &GroupId::from_index(1));

        let removed = ItemRef::group(GroupId::from_index(1));
        assert!(!fixture.store.root_group().items.contains(&removed));
        for group in fixture.store.groups().values() {
            assert!(!group.items.contains(&removed));
        }
        assert_eq!(fixture.store.filters().len(), 2);
    }

    #[test]
    fn root_and_unknown_groups_are_ignored() {
        let mut fixture = nested();
        let before = fixture.store.forest();

        run(&mut fixture.store, &GroupId::root());
        run(&mut fixture.store, &GroupId::from("group-42"));

        assert_eq!(fixture.store.forest(), before);
    }

    #[test]
    fn survives_a_cycle() {
        let mut fixture = nested();
        // Corrupt the tree on purpose: group-1 lists its own parent.
        fixture
            .store
            .group_mut(&GroupId::from_index(1))
            .unwrap()
            .items
            .push(ItemRef::group(GroupId::from_index(0)));

        run(&mut fixture.store, &GroupId::from_index(0));
        assert!(!fixture.store.groups().contains_key(&GroupId::from_index(0)));
        assert!(!fixture.store.groups().contains_key(&GroupId::from_index(1)));
    }

    #[test]
    fn removing_a_fresh_empty_group() {
        let mut fixture = StoreFixture::new();
        let id = create_group::run(&mut fixture.store, &GroupId::root(), Connector::And).unwrap();
        run(&mut fixture.store, &id);
        assert!(fixture.store.groups().is_empty());
        assert!(fixture.store.root_group().is_empty());
    }
}

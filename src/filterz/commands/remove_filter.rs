use crate::model::{FilterId, ItemRef};
use crate::store::FilterStore;
use tracing::debug;

/// Drops a filter and every reference to it. Unknown ids are ignored.
pub fn run(store: &mut FilterStore, id: FilterId) {
    if store.filter(id).is_some() {
        store.filters_mut().retain(|f| f.id != id);
        debug!(id, "filter removed");
    }
    store.strip_references(&ItemRef::filter(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Connector, GroupId, Relation};
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn removes_filter_and_its_reference() {
        let mut fixture = StoreFixture::new().with_group("root", Connector::Or);
        let a = fixture.add("group-0", "count", Relation::Lt, "1");
        let b = fixture.add("group-0", "count", Relation::Gt, "9");

        run(&mut fixture.store, a);

        assert!(fixture.store.filter(a).is_none());
        assert_eq!(
            fixture.store.groups()[&GroupId::from_index(0)].items,
            vec![ItemRef::filter(b)]
        );
    }

    #[test]
    fn unknown_id_is_idempotent() {
        let mut fixture = StoreFixture::new().with_filter("root", "count", Relation::Lt, "1");
        let before = fixture.store.forest();
        let revision = fixture.store.revision();

        run(&mut fixture.store, 999);
        run(&mut fixture.store, 999);

        assert_eq!(fixture.store.forest(), before);
        assert_eq!(fixture.store.revision(), revision);
    }

    #[test]
    fn strips_reference_held_directly_by_root() {
        let mut fixture = StoreFixture::new()
            .with_filter("root", "count", Relation::Lt, "1")
            .with_filter("root", "count", Relation::Lt, "2");
        let direct = fixture.store.filters()[1].id;
        assert!(fixture.store.root_group().items.contains(&ItemRef::filter(direct)));

        run(&mut fixture.store, direct);
        assert!(!fixture.store.root_group().items.contains(&ItemRef::filter(direct)));
    }
}

use crate::model::{FilterId, FilterUpdate};
use crate::store::FilterStore;
use tracing::debug;

/// Merges `update` into the filter with `id`. Unknown ids are ignored.
///
/// No validation happens here: keeping the predicate valid for a new type is
/// up to the caller.
pub fn run(store: &mut FilterStore, id: FilterId, update: FilterUpdate) {
    if update.is_empty() {
        return;
    }
    let Some(index) = store.filters().iter().position(|f| f.id == id) else {
        debug!(id, "update: no such filter");
        return;
    };

    let filter = &mut store.filters_mut()[index];
    if let Some(filter_type) = update.filter_type {
        filter.filter_type = filter_type;
    }
    if let Some(predicate) = update.predicate {
        filter.predicate = predicate;
    }
    if let Some(ref_value) = update.ref_value {
        filter.ref_value = ref_value;
    }
    debug!(id, "filter updated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relation;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn merges_only_given_fields() {
        let mut fixture = StoreFixture::new();
        let id = fixture.add("root", "count", Relation::Lt, "1");

        run(&mut fixture.store, id, FilterUpdate::new().with_ref("42"));

        let filter = fixture.store.filter(id).unwrap();
        assert_eq!(filter.filter_type, "count");
        assert_eq!(filter.predicate, Relation::Lt);
        assert_eq!(filter.ref_value, "42");
    }

    #[test]
    fn does_not_validate_predicate() {
        let mut fixture = StoreFixture::new();
        let id = fixture.add("root", "count", Relation::Lt, "1");

        run(
            &mut fixture.store,
            id,
            FilterUpdate::new().with_type("name"),
        );

        let filter = fixture.store.filter(id).unwrap();
        assert_eq!(filter.filter_type, "name");
        assert_eq!(filter.predicate, Relation::Lt);
    }

    #[test]
    fn unknown_filter_is_ignored() {
        let mut fixture = StoreFixture::new();
        let revision = fixture.store.revision();
        run(&mut fixture.store, 7, FilterUpdate::new().with_ref("x"));
        assert_eq!(fixture.store.revision(), revision);
    }
}

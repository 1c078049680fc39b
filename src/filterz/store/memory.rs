use super::{StateStore, StoreState};
use crate::error::Result;

/// In-memory state persistence for testing.
/// Does NOT persist data across processes.
#[derive(Default)]
pub struct InMemoryStore {
    state: Option<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStore {
    fn load(&self) -> Result<Option<StoreState>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        self.state = Some(state.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.state = None;
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::commands::{add_filter, create_group, update};
    use crate::config::sample_schema;
    use crate::model::{Connector, FilterId, FilterUpdate, GroupId, Relation};
    use crate::store::FilterStore;

    /// Builds a [`FilterStore`] over the sample schema, one step at a time.
    pub struct StoreFixture {
        pub store: FilterStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: FilterStore::new(sample_schema()),
            }
        }

        pub fn with_group(mut self, parent: &str, connector: Connector) -> Self {
            create_group::run(&mut self.store, &GroupId::from(parent), connector)
                .expect("fixture parent group exists");
            self
        }

        /// Adds a fully specified filter to `group`.
        pub fn with_filter(
            mut self,
            group: &str,
            filter_type: &str,
            predicate: Relation,
            ref_value: &str,
        ) -> Self {
            self.add(group, filter_type, predicate, ref_value);
            self
        }

        pub fn add(
            &mut self,
            group: &str,
            filter_type: &str,
            predicate: Relation,
            ref_value: &str,
        ) -> FilterId {
            let id = add_filter::run(&mut self.store, &GroupId::from(group))
                .expect("fixture group exists");
            update::run(
                &mut self.store,
                id,
                FilterUpdate::new()
                    .with_type(filter_type)
                    .with_predicate(predicate)
                    .with_ref(ref_value),
            );
            id
        }
    }
}

//! Property-based tests for merge determinism (P1) and rank dominance (P2).

use confmap_engine::{AbstractConfigStore, ConfigAccessor, Id, MappingProvider, ProviderRegistry, PropertyMap, ProvideError, Value};
use proptest::prelude::*;
use std::sync::Arc;

struct Literal {
    rank: i32,
    entries: Vec<(String, i64)>,
}

impl MappingProvider for Literal {
    fn rank(&self) -> i32 {
        self.rank
    }
    fn is_partial(&self) -> bool {
        false
    }
    fn can_provide_for(&self, _id: &Id) -> bool {
        true
    }
    fn provide(&self, _id: &Id, _config: &ConfigAccessor) -> Result<PropertyMap, ProvideError> {
        let mut map = PropertyMap::new();
        for (k, v) in &self.entries {
            map.insert(k.clone(), Value::from(*v));
        }
        Ok(map)
    }
}

fn merged_for(providers: &[(i32, Vec<(String, i64)>)]) -> PropertyMap {
    let registry = ProviderRegistry::new();
    for (rank, entries) in providers {
        registry.bind(Arc::new(Literal { rank: *rank, entries: entries.clone() }));
    }
    let id = Id::new("x");
    let mut merged = PropertyMap::new();
    for provider in registry.providers_for(&id) {
        let store = AbstractConfigStore::new();
        let accessor = ConfigAccessor::new(&store);
        if let Ok(props) = provider.provide(&id, &accessor) {
            merged.extend(props);
        }
    }
    merged
}

proptest! {
    // P1: repeated merges over the same bound providers yield structurally
    // equal maps.
    #[test]
    fn merge_is_deterministic(
        ranks in prop::collection::vec(-10i32..10, 1..6),
        value in 0i64..1000,
    ) {
        let providers: Vec<(i32, Vec<(String, i64)>)> =
            ranks.iter().map(|r| (*r, vec![("k".to_string(), value)])).collect();

        let first = merged_for(&providers);
        let second = merged_for(&providers);
        prop_assert_eq!(first, second);
    }

    // P2: for any key contributed by two providers A < B by rank, the
    // merged value for that key equals B's value, regardless of bind order.
    #[test]
    fn higher_rank_always_dominates(
        low_rank in -50i32..0,
        high_rank in 1i32..50,
        low_value in 0i64..1000,
        high_value in 0i64..1000,
        swap_bind_order in any::<bool>(),
    ) {
        let providers = if swap_bind_order {
            vec![(high_rank, vec![("k".to_string(), high_value)]), (low_rank, vec![("k".to_string(), low_value)])]
        } else {
            vec![(low_rank, vec![("k".to_string(), low_value)]), (high_rank, vec![("k".to_string(), high_value)])]
        };
        let merged = merged_for(&providers);
        prop_assert_eq!(merged.get("k"), Some(&Value::from(high_value)));
    }
}

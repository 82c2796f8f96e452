//! Unit tests for nm-store.

#[cfg(test)]
mod upsert {
    use nm_core::{AgentId, CoreError, GeoPoint, Timestamp};

    use crate::{AgentStore, StoreError, StoreEvent};

    #[test]
    fn insert_then_move() {
        let mut store = AgentStore::new();
        let a = GeoPoint::new(30.10, 31.20);
        let b = GeoPoint::new(30.11, 31.21);

        let ev = store.upsert(AgentId(1), a, Timestamp(0)).unwrap();
        assert_eq!(ev, StoreEvent::Inserted { id: AgentId(1), position: a });

        let ev = store.upsert(AgentId(1), b, Timestamp(10)).unwrap();
        assert_eq!(ev, StoreEvent::Moved { id: AgentId(1), from: a, to: b });

        let agent = store.get(AgentId(1)).unwrap();
        assert_eq!(agent.position, b);
        assert_eq!(agent.last_update, Timestamp(10));
        assert!(agent.available, "new agents start available");
    }

    #[test]
    fn invalid_position_never_enters_store() {
        let mut store = AgentStore::new();
        let err = store
            .upsert(AgentId(1), GeoPoint::new(91.0, 0.0), Timestamp(0))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidPosition(CoreError::InvalidPosition { lat: 91.0, lon: 0.0 })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_position_leaves_existing_record() {
        let mut store = AgentStore::new();
        let a = GeoPoint::new(1.0, 1.0);
        store.upsert(AgentId(3), a, Timestamp(0)).unwrap();
        assert!(store.upsert(AgentId(3), GeoPoint::new(0.0, 200.0), Timestamp(5)).is_err());
        let agent = store.get(AgentId(3)).unwrap();
        assert_eq!(agent.position, a);
        assert_eq!(agent.last_update, Timestamp(0));
    }

    #[test]
    fn older_update_is_ignored() {
        let mut store = AgentStore::new();
        let a = GeoPoint::new(1.0, 1.0);
        store.upsert(AgentId(1), a, Timestamp(100)).unwrap();

        let ev = store.upsert(AgentId(1), GeoPoint::new(2.0, 2.0), Timestamp(99)).unwrap();
        assert_eq!(ev, StoreEvent::Ignored { id: AgentId(1) });
        assert_eq!(store.get(AgentId(1)).unwrap().position, a);
        assert_eq!(store.get(AgentId(1)).unwrap().last_update, Timestamp(100));
    }

    #[test]
    fn same_timestamp_is_applied() {
        let mut store = AgentStore::new();
        store.upsert(AgentId(1), GeoPoint::new(1.0, 1.0), Timestamp(100)).unwrap();
        let b = GeoPoint::new(1.5, 1.5);
        let ev = store.upsert(AgentId(1), b, Timestamp(100)).unwrap();
        assert!(matches!(ev, StoreEvent::Moved { .. }));
        assert_eq!(store.get(AgentId(1)).unwrap().position, b);
    }

    #[test]
    fn repeated_identical_update_refreshes() {
        let mut store = AgentStore::new();
        let p = GeoPoint::new(1.0, 1.0);
        store.upsert(AgentId(1), p, Timestamp(5)).unwrap();
        let before = store.get(AgentId(1)).unwrap().clone();
        let ev = store.upsert(AgentId(1), p, Timestamp(5)).unwrap();
        assert_eq!(ev, StoreEvent::Refreshed { id: AgentId(1) });
        assert_eq!(store.get(AgentId(1)).unwrap(), &before);
    }
}

#[cfg(test)]
mod apply {
    use nm_core::{AgentId, GeoPoint, Timestamp};

    use crate::{AgentStore, AgentUpdate, StoreError, StoreEvent};

    #[test]
    fn full_tuple_sets_availability_and_label() {
        let mut store = AgentStore::new();
        let p = GeoPoint::new(30.0, 31.0);
        store
            .apply(AgentUpdate::position(AgentId(4), p, Timestamp(0)).with_available(false).with_label("Salah"))
            .unwrap();
        let agent = store.get(AgentId(4)).unwrap();
        assert!(!agent.available);
        assert_eq!(agent.label.as_deref(), Some("Salah"));
    }

    #[test]
    fn missing_fields_keep_stored_values() {
        let mut store = AgentStore::new();
        let p = GeoPoint::new(30.0, 31.0);
        store
            .apply(AgentUpdate::position(AgentId(4), p, Timestamp(0)).with_available(false).with_label("Salah"))
            .unwrap();
        store.upsert(AgentId(4), GeoPoint::new(30.1, 31.0), Timestamp(1)).unwrap();
        let agent = store.get(AgentId(4)).unwrap();
        assert!(!agent.available);
        assert_eq!(agent.label.as_deref(), Some("Salah"));
    }

    #[test]
    fn set_available_orders_by_timestamp() {
        let mut store = AgentStore::new();
        store.upsert(AgentId(1), GeoPoint::new(0.0, 0.0), Timestamp(10)).unwrap();

        let ev = store.set_available(AgentId(1), false, Timestamp(5)).unwrap();
        assert!(ev.is_ignored());
        assert!(store.get(AgentId(1)).unwrap().available);

        let ev = store.set_available(AgentId(1), false, Timestamp(11)).unwrap();
        assert_eq!(ev, StoreEvent::Refreshed { id: AgentId(1) });
        assert!(!store.get(AgentId(1)).unwrap().available);
        assert_eq!(store.get(AgentId(1)).unwrap().last_update, Timestamp(11));
    }

    #[test]
    fn set_available_unknown_agent() {
        let mut store = AgentStore::new();
        assert_eq!(
            store.set_available(AgentId(9), true, Timestamp(0)),
            Err(StoreError::NotFound(AgentId(9)))
        );
    }
}

#[cfg(test)]
mod remove_and_get {
    use nm_core::{AgentId, GeoPoint, Timestamp};

    use crate::{AgentStore, StoreError, StoreEvent};

    #[test]
    fn remove_present() {
        let mut store = AgentStore::new();
        let p = GeoPoint::new(1.0, 2.0);
        store.upsert(AgentId(1), p, Timestamp(0)).unwrap();
        assert_eq!(store.remove(AgentId(1)), Some(StoreEvent::Removed { id: AgentId(1), position: p }));
        assert!(!store.contains(AgentId(1)));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = AgentStore::new();
        store.upsert(AgentId(1), GeoPoint::new(1.0, 2.0), Timestamp(0)).unwrap();
        assert_eq!(store.remove(AgentId(2)), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let store = AgentStore::new();
        assert_eq!(store.get(AgentId(42)).unwrap_err(), StoreError::NotFound(AgentId(42)));
    }

    #[test]
    fn reinsert_after_remove_accepts_older_timestamp() {
        let mut store = AgentStore::new();
        store.upsert(AgentId(1), GeoPoint::new(1.0, 2.0), Timestamp(100)).unwrap();
        store.remove(AgentId(1));
        let ev = store.upsert(AgentId(1), GeoPoint::new(3.0, 4.0), Timestamp(50)).unwrap();
        assert!(matches!(ev, StoreEvent::Inserted { .. }));
    }
}

#[cfg(test)]
mod active {
    use std::time::Duration;

    use nm_core::{AgentId, GeoPoint, Staleness, Timestamp};

    use crate::AgentStore;

    fn store_with_ages() -> AgentStore {
        let mut store = AgentStore::new();
        let p = GeoPoint::new(0.0, 0.0);
        store.upsert(AgentId(1), p, Timestamp::from_secs(0)).unwrap();
        store.upsert(AgentId(2), p, Timestamp::from_secs(30)).unwrap();
        store.upsert(AgentId(3), p, Timestamp::from_secs(90)).unwrap();
        store
    }

    #[test]
    fn filters_by_window() {
        let store = store_with_ages();
        let now = Timestamp::from_secs(100);
        let mut ids: Vec<_> = store
            .all_active(now, Staleness::Window(Duration::from_secs(70)))
            .map(|a| a.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![AgentId(2), AgentId(3)]);
    }

    #[test]
    fn unbounded_yields_everyone() {
        let store = store_with_ages();
        let n = store.all_active(Timestamp::from_secs(1_000_000), Staleness::Unbounded).count();
        assert_eq!(n, 3);
    }

    #[test]
    fn sequence_is_restartable() {
        let store = store_with_ages();
        let active = store.all_active(Timestamp::from_secs(100), Staleness::from_secs(70));
        let first: Vec<_> = active.clone().map(|a| a.id).collect();
        let second: Vec<_> = active.map(|a| a.id).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn stale_ids_sorted() {
        let store = store_with_ages();
        let stale = store.stale_ids(Timestamp::from_secs(100), Staleness::from_secs(60));
        assert_eq!(stale, vec![AgentId(1), AgentId(2)]);
    }
}

#[cfg(test)]
mod properties {
    use nm_core::{AgentId, GeoPoint, Timestamp};
    use proptest::prelude::*;

    use crate::AgentStore;

    fn position() -> impl Strategy<Value = GeoPoint> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| GeoPoint::new(lat, lon))
    }

    proptest! {
        #[test]
        fn applying_twice_equals_applying_once(
            id in 0u64..16,
            p in position(),
            t in 0i64..1_000_000,
        ) {
            let mut once = AgentStore::new();
            once.upsert(AgentId(id), p, Timestamp(t)).unwrap();

            let mut twice = AgentStore::new();
            twice.upsert(AgentId(id), p, Timestamp(t)).unwrap();
            twice.upsert(AgentId(id), p, Timestamp(t)).unwrap();

            prop_assert_eq!(once.get(AgentId(id)).unwrap(), twice.get(AgentId(id)).unwrap());
            prop_assert_eq!(once.len(), twice.len());
        }

        #[test]
        fn older_update_never_changes_record(
            p in position(),
            q in position(),
            t in 1i64..1_000_000,
            back in 1i64..1_000,
        ) {
            let mut store = AgentStore::new();
            store.upsert(AgentId(1), p, Timestamp(t)).unwrap();
            let before = store.get(AgentId(1)).unwrap().clone();
            let ev = store.upsert(AgentId(1), q, Timestamp(t - back)).unwrap();
            prop_assert!(ev.is_ignored());
            prop_assert_eq!(store.get(AgentId(1)).unwrap(), &before);
        }
    }
}

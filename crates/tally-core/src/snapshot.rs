//! Authoritative in-memory record collection.
//!
//! [`SnapshotStore`] owns the ordered list of records the chart renders.
//! Its apply-methods are the only mutation surface, and they are driven
//! exclusively by change-stream events. Order is insertion order of first
//! appearance; modifications keep a record's position.
//!
//! Unknown ids on `modified`/`removed` are ignored because late or duplicate
//! events are possible on an eventually consistent stream. A duplicate
//! `added` is a logic error upstream; it is logged and ignored.

use tally_types::{ChangeBatch, ChangeEvent, Record, RecordId};
use tracing::{debug, warn};

/// Counts of how a batch of change events was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Records appended.
    pub added: usize,
    /// Records replaced in place.
    pub modified: usize,
    /// Records deleted.
    pub removed: usize,
    /// Events that changed nothing (duplicate add, unknown id).
    pub ignored: usize,
}

impl ApplySummary {
    /// Whether any event changed the snapshot.
    pub const fn changed(&self) -> bool {
        self.added > 0 || self.modified > 0 || self.removed > 0
    }
}

/// Ordered collection of records, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotStore {
    records: Vec<Record>,
}

impl SnapshotStore {
    /// Create an empty snapshot.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append `record` unless its id is already present.
    ///
    /// Returns `true` if the record was appended.
    pub fn apply_added(&mut self, record: Record) -> bool {
        if self.position(&record.id).is_some() {
            warn!(id = %record.id, "ignoring duplicate added event");
            return false;
        }
        debug!(id = %record.id, name = record.name, cost = %record.cost, "record added");
        self.records.push(record);
        true
    }

    /// Replace the record with the same id, keeping its position.
    ///
    /// Returns `true` if a record was replaced.
    pub fn apply_modified(&mut self, record: Record) -> bool {
        let Some(slot) = self.records.iter_mut().find(|r| r.id == record.id) else {
            debug!(id = %record.id, "ignoring modified event for unknown record");
            return false;
        };
        debug!(id = %record.id, name = record.name, cost = %record.cost, "record modified");
        *slot = record;
        true
    }

    /// Remove the record with `id`.
    ///
    /// Returns `true` if a record was removed.
    pub fn apply_removed(&mut self, id: &RecordId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(%id, "ignoring removed event for unknown record");
            return false;
        };
        self.records.remove(index);
        debug!(%id, "record removed");
        true
    }

    /// Apply every event of `batch` in order.
    pub fn apply_batch(&mut self, batch: ChangeBatch) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for event in batch.changes {
            let (applied, slot) = match event {
                ChangeEvent::Added { record } => (self.apply_added(record), &mut summary.added),
                ChangeEvent::Modified { record } => {
                    (self.apply_modified(record), &mut summary.modified)
                }
                ChangeEvent::Removed { id } => (self.apply_removed(&id), &mut summary.removed),
            };
            let slot = if applied { slot } else { &mut summary.ignored };
            *slot = slot.saturating_add(1);
        }
        summary
    }

    /// The live ordered collection.
    pub fn current(&self) -> &[Record] {
        &self.records
    }

    /// Look up a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Position of the record with `id` in snapshot order.
    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;

    fn record(id: &str, cost: i64) -> Record {
        Record::new(id, format!("{id}-name"), Decimal::new(cost, 0))
    }

    fn seeded() -> SnapshotStore {
        let mut store = SnapshotStore::new();
        store.apply_added(record("a", 500));
        store.apply_added(record("b", 300));
        store.apply_added(record("c", 200));
        store
    }

    #[test]
    fn added_then_removed_round_trips() {
        let mut store = seeded();
        let before = store.clone();
        assert!(store.apply_added(record("d", 42)));
        assert!(store.apply_removed(&RecordId::from("d")));
        assert_eq!(store, before);
    }

    #[test]
    fn modified_unknown_id_is_noop() {
        let mut store = seeded();
        let before = store.clone();
        assert!(!store.apply_modified(record("zzz", 1)));
        assert_eq!(store, before);
    }

    #[test]
    fn removed_unknown_id_is_noop() {
        let mut store = seeded();
        let before = store.clone();
        assert!(!store.apply_removed(&RecordId::from("zzz")));
        assert_eq!(store, before);
    }

    #[test]
    fn modified_keeps_position() {
        let mut store = seeded();
        assert!(store.apply_modified(record("b", 999)));
        assert_eq!(store.position(&RecordId::from("b")), Some(1));
        assert_eq!(
            store.get(&RecordId::from("b")).map(|r| r.cost),
            Some(Decimal::new(999, 0))
        );
    }

    #[test]
    fn duplicate_added_in_one_batch_is_ignored() {
        let mut store = SnapshotStore::new();
        let batch = ChangeBatch::new(
            1,
            vec![
                ChangeEvent::Added {
                    record: record("a", 10),
                },
                ChangeEvent::Added {
                    record: record("a", 99),
                },
            ],
        );
        let summary = store.apply_batch(batch);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.ignored, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&RecordId::from("a")).map(|r| r.cost),
            Some(Decimal::new(10, 0))
        );
    }

    #[test]
    fn batch_applies_in_order() {
        let mut store = SnapshotStore::new();
        let batch = ChangeBatch::new(
            1,
            vec![
                ChangeEvent::Added {
                    record: record("a", 1),
                },
                ChangeEvent::Added {
                    record: record("b", 2),
                },
                ChangeEvent::Modified {
                    record: record("a", 5),
                },
                ChangeEvent::Removed {
                    id: RecordId::from("b"),
                },
                ChangeEvent::Removed {
                    id: RecordId::from("never"),
                },
            ],
        );
        let summary = store.apply_batch(batch);
        assert_eq!(
            summary,
            ApplySummary {
                added: 2,
                modified: 1,
                removed: 1,
                ignored: 1,
            }
        );
        assert!(summary.changed());
        assert_eq!(store.current(), &[record("a", 5)]);
    }

    #[test]
    fn unknown_ids_are_counted_as_ignored() {
        let mut store = seeded();
        let batch = ChangeBatch::new(
            1,
            vec![
                ChangeEvent::Modified {
                    record: record("zzz", 1),
                },
                ChangeEvent::Removed {
                    id: RecordId::from("zzz"),
                },
            ],
        );
        let summary = store.apply_batch(batch);
        assert_eq!(
            summary,
            ApplySummary {
                ignored: 2,
                ..ApplySummary::default()
            }
        );
        assert!(!summary.changed());
    }

    #[test]
    fn readd_after_remove_goes_to_the_end() {
        let mut store = seeded();
        store.apply_removed(&RecordId::from("a"));
        store.apply_added(record("a", 500));
        let ids: Vec<&str> = store.current().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    fn seeded_from(costs: &[i64]) -> SnapshotStore {
        let mut store = SnapshotStore::new();
        for (i, cost) in costs.iter().enumerate() {
            store.apply_added(record(&format!("r{i}"), *cost));
        }
        store
    }

    fn event() -> impl Strategy<Value = ChangeEvent> {
        let id = prop::sample::select(vec!["a", "b", "c", "d", "e"]);
        (0_u8..3, id, 0_i64..1_000).prop_map(|(kind, id, cost)| match kind {
            0 => ChangeEvent::Added {
                record: record(id, cost),
            },
            1 => ChangeEvent::Modified {
                record: record(id, cost),
            },
            _ => ChangeEvent::Removed {
                id: RecordId::from(id),
            },
        })
    }

    proptest! {
        #[test]
        fn add_then_remove_restores_any_snapshot(
            costs in prop::collection::vec(0_i64..10_000, 0..30),
            cost in 0_i64..10_000,
        ) {
            let mut store = seeded_from(&costs);
            let before = store.clone();
            prop_assert!(store.apply_added(record("fresh", cost)));
            prop_assert!(store.apply_removed(&RecordId::from("fresh")));
            prop_assert_eq!(store, before);
        }

        #[test]
        fn modify_of_unknown_id_never_changes_a_snapshot(
            costs in prop::collection::vec(0_i64..10_000, 0..30),
            cost in 0_i64..10_000,
        ) {
            let mut store = seeded_from(&costs);
            let before = store.clone();
            prop_assert!(!store.apply_modified(record("fresh", cost)));
            prop_assert!(!store.apply_removed(&RecordId::from("fresh")));
            prop_assert_eq!(store, before);
        }

        #[test]
        fn every_event_is_counted_once_and_ids_stay_unique(
            events in prop::collection::vec(event(), 0..60),
        ) {
            let total = events.len();
            let mut store = SnapshotStore::new();
            let summary = store.apply_batch(ChangeBatch::new(1, events));

            let counted: usize = [summary.added, summary.modified, summary.removed, summary.ignored]
                .iter()
                .sum();
            prop_assert_eq!(counted, total);
            let mut ids: Vec<&RecordId> = store.current().iter().map(|r| &r.id).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), store.len());
        }
    }
}

//! Reactive synchronization between the collection store and the local
//! in-memory mirrors.
//!
//! The engine establishes exactly one subscription per collection for
//! the signed-in identity and replaces the corresponding mirror
//! wholesale on every snapshot. Entries are re-sorted by date
//! descending before publication; all other collections keep store
//! order. Derived computations read cloned snapshots, so they tolerate
//! any combination of per-collection versions (there is no ordering
//! guarantee *between* collections).
//!
//! The mirrors are never updated speculatively: a mutation is "fire
//! and observe latest snapshot," and a failed write leaves local state
//! unchanged.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, TrackError};
use crate::model::{
    parse_entry_date, Entry, Medication, MedicationLog, NewEntry, NewMedication, NewTracker,
    Tracker,
};
use crate::report::{weekly_report, TrackerReport};
use crate::schedule::{find_log, todays_schedule, DoseInstance};
use crate::session::Session;
use crate::store::{
    Collection, CollectionStore, Document, DocumentId, ErrorHandler, SnapshotHandler,
    Subscription, UserId,
};

/// Observable state of one collection's live feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Subscribed, no snapshot received yet.
    Pending,
    /// Mirror reflects the most recent snapshot.
    Live,
    /// Feed failed; the mirror is frozen at its last value. No retry
    /// is attempted.
    Failed(String),
}

/// The optional fields of an entry record; an edit must overwrite all
/// of them, present or not.
const ENTRY_VALUE_FIELDS: [&str; 8] = [
    "boolean", "scale5", "scale10", "number", "duration", "text", "value", "notes",
];

#[derive(Default)]
struct Mirrors {
    trackers: Mutex<Vec<Tracker>>,
    entries: Mutex<Vec<Entry>>,
    medications: Mutex<Vec<Medication>>,
    medication_logs: Mutex<Vec<MedicationLog>>,
    status: Mutex<HashMap<Collection, SyncStatus>>,
}

impl Mirrors {
    fn set_status(&self, collection: Collection, status: SyncStatus) {
        if let Ok(mut map) = self.status.lock() {
            map.insert(collection, status);
        }
    }
}

/// Replace a mirror wholesale. A poisoned mirror lock is logged rather
/// than propagated; snapshot handlers have no caller to report to.
fn publish<T>(slot: &Mutex<Vec<T>>, collection: Collection, records: Vec<T>) {
    match slot.lock() {
        Ok(mut mirror) => *mirror = records,
        Err(_) => log::error!("{} mirror lock poisoned; snapshot dropped", collection),
    }
}

fn read<T: Clone>(slot: &Mutex<Vec<T>>) -> Vec<T> {
    slot.lock().map(|mirror| mirror.clone()).unwrap_or_default()
}

fn decode_all<T: DeserializeOwned>(collection: Collection, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode() {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("skipping undecodable {} document {}: {}", collection, doc.id, err);
                None
            }
        })
        .collect()
}

/// Sort entries by date descending; entries whose date fails to parse
/// sort after every parseable one.
fn sort_entries_desc(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        match (parse_entry_date(&a.date), parse_entry_date(&b.date)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Synchronization engine for one authenticated identity.
///
/// Tearing the engine down (drop or [`SyncEngine::shutdown`])
/// synchronously cancels all four subscriptions; no callback fires
/// afterwards.
pub struct SyncEngine {
    store: Arc<dyn CollectionStore>,
    user: UserId,
    mirrors: Arc<Mirrors>,
    subscriptions: Vec<Subscription>,
}

impl SyncEngine {
    /// Subscribe to all four collections for the session's identity.
    ///
    /// Fails with `AuthUnavailable` when the session carries no
    /// identity; no subscription is ever established without one.
    pub fn start(store: Arc<dyn CollectionStore>, session: &Session) -> Result<Self> {
        let user = session.user().cloned().ok_or(TrackError::AuthUnavailable)?;
        let mirrors = Arc::new(Mirrors::default());

        let mut subscriptions = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            mirrors.set_status(collection, SyncStatus::Pending);
            let subscription = store.subscribe(
                &user,
                collection,
                snapshot_handler(collection, mirrors.clone()),
                error_handler(collection, mirrors.clone()),
            )?;
            subscriptions.push(subscription);
        }

        Ok(Self {
            store,
            user,
            mirrors,
            subscriptions,
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// Live-feed state for one collection.
    pub fn status(&self, collection: Collection) -> SyncStatus {
        self.mirrors
            .status
            .lock()
            .ok()
            .and_then(|map| map.get(&collection).cloned())
            .unwrap_or(SyncStatus::Pending)
    }

    // --- Mirror snapshots (read-only clones) ---

    pub fn trackers(&self) -> Vec<Tracker> {
        read(&self.mirrors.trackers)
    }

    /// Entries, sorted by date descending.
    pub fn entries(&self) -> Vec<Entry> {
        read(&self.mirrors.entries)
    }

    pub fn medications(&self) -> Vec<Medication> {
        read(&self.mirrors.medications)
    }

    pub fn medication_logs(&self) -> Vec<MedicationLog> {
        read(&self.mirrors.medication_logs)
    }

    // --- Derived views ---

    /// Today's dosage checklist over the current mirrors.
    pub fn todays_schedule(&self, today: NaiveDate) -> Vec<DoseInstance> {
        todays_schedule(&self.medications(), &self.medication_logs(), today)
    }

    /// Weekly summary over the current mirrors.
    pub fn weekly_report(&self, now: NaiveDateTime) -> Vec<TrackerReport> {
        weekly_report(&self.entries(), &self.trackers(), now)
    }

    // --- Mutation intents ---

    /// Create a tracker. The legacy `dataType` field is kept equal to
    /// `types[0]` for entries created before multi-kind trackers.
    pub fn save_tracker(&self, draft: &NewTracker) -> Result<DocumentId> {
        draft.validate()?;
        let mut fields = serde_json::to_value(draft)?;
        fields["dataType"] = serde_json::to_value(draft.types[0])?;
        self.store
            .create(&self.user, Collection::TrackerDefinitions, fields)
    }

    /// Delete a tracker. Its entries remain and resolve as orphaned.
    pub fn delete_tracker(&self, id: &str) -> Result<()> {
        self.store
            .delete(&self.user, Collection::TrackerDefinitions, id)
    }

    pub fn save_entry(&self, draft: &NewEntry) -> Result<DocumentId> {
        draft.validate()?;
        let fields = serde_json::to_value(draft)?;
        self.store.create(&self.user, Collection::HealthEntries, fields)
    }

    /// Edit an entry, replacing all of its fields with the draft's.
    ///
    /// The store's `update` merges, so every value field the draft
    /// omits is sent as an explicit null to clear it; otherwise stale
    /// fields would survive the edit and win classification.
    pub fn update_entry(&self, id: &str, draft: &NewEntry) -> Result<()> {
        draft.validate()?;
        let mut fields = serde_json::to_value(draft)?;
        if let Some(map) = fields.as_object_mut() {
            for field in ENTRY_VALUE_FIELDS {
                map.entry(field).or_insert(Value::Null);
            }
        }
        self.store
            .update(&self.user, Collection::HealthEntries, id, fields)
    }

    pub fn delete_entry(&self, id: &str) -> Result<()> {
        self.store.delete(&self.user, Collection::HealthEntries, id)
    }

    /// Create a medication. Medications start active.
    pub fn save_medication(&self, draft: &NewMedication) -> Result<DocumentId> {
        draft.validate()?;
        let mut fields = serde_json::to_value(draft)?;
        fields["active"] = Value::Bool(true);
        self.store.create(&self.user, Collection::Medications, fields)
    }

    /// Delete a medication, implicitly orphaning any logs for it.
    pub fn delete_medication(&self, id: &str) -> Result<()> {
        self.store.delete(&self.user, Collection::Medications, id)
    }

    /// Toggle the taken state of one dose: delete the adherence log for
    /// `(medication, today, time_slot)` if one exists, else create it.
    ///
    /// The operation is its own inverse. The lookup-then-write is not
    /// transactional against the store; under this core's cooperative
    /// event model two toggles of the same triple cannot interleave,
    /// but a store wanting stronger guarantees would use a
    /// deterministic document key for the triple.
    pub fn toggle_taken(&self, medication_id: &str, time_slot: &str, today: NaiveDate) -> Result<()> {
        let date = today.format("%Y-%m-%d").to_string();
        let logs = self.medication_logs();
        match find_log(&logs, medication_id, &date, time_slot) {
            Some(existing) => self
                .store
                .delete(&self.user, Collection::MedicationLogs, &existing.id),
            None => {
                let fields = serde_json::json!({
                    "medicationId": medication_id,
                    "date": date,
                    "time": time_slot,
                    "taken": true,
                });
                self.store
                    .create(&self.user, Collection::MedicationLogs, fields)
                    .map(|_| ())
            }
        }
    }

    /// Release all four subscriptions synchronously. Equivalent to
    /// dropping the engine, but explicit at sign-out call sites.
    pub fn shutdown(mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
    }
}

fn snapshot_handler(collection: Collection, mirrors: Arc<Mirrors>) -> SnapshotHandler {
    Box::new(move |docs| {
        match collection {
            Collection::TrackerDefinitions => {
                publish(&mirrors.trackers, collection, decode_all(collection, &docs));
            }
            Collection::HealthEntries => {
                let mut entries: Vec<Entry> = decode_all(collection, &docs);
                sort_entries_desc(&mut entries);
                publish(&mirrors.entries, collection, entries);
            }
            Collection::Medications => {
                publish(&mirrors.medications, collection, decode_all(collection, &docs));
            }
            Collection::MedicationLogs => {
                publish(
                    &mirrors.medication_logs,
                    collection,
                    decode_all(collection, &docs),
                );
            }
        }
        mirrors.set_status(collection, SyncStatus::Live);
    })
}

fn error_handler(collection: Collection, mirrors: Arc<Mirrors>) -> ErrorHandler {
    Box::new(move |err| {
        log::error!("{} subscription failed: {}", collection, err);
        mirrors.set_status(collection, SyncStatus::Failed(err.to_string()));
    })
}

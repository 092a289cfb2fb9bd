//! In-memory collection store backend.
//!
//! Documents live in per-(user, collection) ordered maps and every
//! mutation fans a fresh full snapshot out to the collection's
//! listeners, synchronously, after the store lock is released.
//! Contents can be exported to and seeded from a [`StoreSnapshot`] so
//! a caller can persist them (the CLI keeps them in a JSON file).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, TrackError};
use crate::store::{
    Collection, CollectionStore, Document, DocumentId, ErrorHandler, SnapshotHandler,
    Subscription, UserId,
};

type Docs = BTreeMap<DocumentId, Value>;
type SharedSnapshotHandler = Arc<dyn Fn(Vec<Document>) + Send + Sync>;
type SharedErrorHandler = Arc<dyn Fn(TrackError) + Send + Sync>;

struct Listener {
    id: u64,
    user: UserId,
    collection: Collection,
    on_snapshot: SharedSnapshotHandler,
    on_error: SharedErrorHandler,
}

#[derive(Default)]
struct Shared {
    collections: HashMap<(UserId, Collection), Docs>,
    listeners: Vec<Listener>,
    next_listener: u64,
    /// Feeds stopped by an injected failure; their listeners receive
    /// no further snapshots.
    failed: HashSet<(UserId, Collection)>,
}

impl Shared {
    fn docs(&self, user: &UserId, collection: Collection) -> Vec<Document> {
        self.collections
            .get(&(user.clone(), collection))
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Handlers and snapshots for everyone watching (user, collection),
    /// collected so the caller can invoke them outside the lock.
    fn notifications(
        &self,
        user: &UserId,
        collection: Collection,
    ) -> Vec<(SharedSnapshotHandler, Vec<Document>)> {
        if self.failed.contains(&(user.clone(), collection)) {
            return Vec::new();
        }
        let docs = self.docs(user, collection);
        self.listeners
            .iter()
            .filter(|l| &l.user == user && l.collection == collection)
            .map(|l| (l.on_snapshot.clone(), docs.clone()))
            .collect()
    }
}

/// In-memory reference implementation of [`CollectionStore`].
///
/// Clones share the same underlying state.
#[derive(Default, Clone)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared>> {
        self.shared.lock().map_err(|_| TrackError::StoreUnavailable)
    }

    /// Seed a store from previously exported contents.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let store = Self::new();
        {
            let mut shared = store.lock()?;
            for (user, collections) in snapshot.users {
                let user = UserId::new(user);
                for (name, docs) in collections {
                    let collection = Collection::from_name(&name).ok_or_else(|| {
                        TrackError::Validation(format!("Unknown collection \"{}\"", name))
                    })?;
                    shared
                        .collections
                        .insert((user.clone(), collection), docs.into_iter().collect());
                }
            }
        }
        Ok(store)
    }

    /// Export the full store contents.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let shared = self.lock()?;
        let mut users: BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>> =
            BTreeMap::new();
        for ((user, collection), docs) in &shared.collections {
            users
                .entry(user.as_str().to_string())
                .or_default()
                .insert(collection.name().to_string(), docs.clone().into_iter().collect());
        }
        Ok(StoreSnapshot { users })
    }

    /// Test hook: fail a collection's live feed. Listeners get the
    /// error once and then no further snapshots, mirroring a remote
    /// subscription that died.
    pub fn fail_collection(&self, user: &UserId, collection: Collection, reason: &str) {
        let handlers: Vec<SharedErrorHandler> = match self.lock() {
            Ok(mut shared) => {
                shared.failed.insert((user.clone(), collection));
                shared
                    .listeners
                    .iter()
                    .filter(|l| &l.user == user && l.collection == collection)
                    .map(|l| l.on_error.clone())
                    .collect()
            }
            Err(_) => Vec::new(),
        };
        for handler in handlers {
            handler(TrackError::Subscription(reason.to_string()));
        }
    }
}

impl CollectionStore for MemoryStore {
    fn subscribe(
        &self,
        user: &UserId,
        collection: Collection,
        on_snapshot: SnapshotHandler,
        on_error: ErrorHandler,
    ) -> Result<Subscription> {
        let on_snapshot: SharedSnapshotHandler = Arc::from(on_snapshot);
        let on_error: SharedErrorHandler = Arc::from(on_error);
        let initial;
        let id;
        {
            let mut shared = self.lock()?;
            id = shared.next_listener;
            shared.next_listener += 1;
            shared.listeners.push(Listener {
                id,
                user: user.clone(),
                collection,
                on_snapshot: on_snapshot.clone(),
                on_error,
            });
            initial = shared.docs(user, collection);
        }
        // Initial snapshot, delivered outside the lock.
        on_snapshot(initial);

        let weak: Weak<Mutex<Shared>> = Arc::downgrade(&self.shared);
        Ok(Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                if let Ok(mut shared) = shared.lock() {
                    shared.listeners.retain(|l| l.id != id);
                }
            }
        }))
    }

    fn create(&self, user: &UserId, collection: Collection, mut fields: Value) -> Result<DocumentId> {
        let map = fields
            .as_object_mut()
            .ok_or_else(|| TrackError::Mutation("Record must be a field map".to_string()))?;
        map.insert(
            "createdAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        let id = Uuid::new_v4().to_string();
        let notifications;
        {
            let mut shared = self.lock()?;
            shared
                .collections
                .entry((user.clone(), collection))
                .or_default()
                .insert(id.clone(), fields);
            notifications = shared.notifications(user, collection);
        }
        for (handler, docs) in notifications {
            handler(docs);
        }
        Ok(id)
    }

    fn update(
        &self,
        user: &UserId,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<()> {
        let incoming = match fields {
            Value::Object(map) => map,
            _ => return Err(TrackError::Mutation("Record must be a field map".to_string())),
        };
        let notifications;
        {
            let mut shared = self.lock()?;
            let existing = shared
                .collections
                .get_mut(&(user.clone(), collection))
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| {
                    TrackError::NotFound(format!("{} document {}", collection.name(), id))
                })?;
            let target = existing
                .as_object_mut()
                .ok_or_else(|| TrackError::Mutation("Stored record is not a field map".to_string()))?;
            for (key, value) in incoming {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    target.insert(key, value);
                }
            }
            notifications = shared.notifications(user, collection);
        }
        for (handler, docs) in notifications {
            handler(docs);
        }
        Ok(())
    }

    fn delete(&self, user: &UserId, collection: Collection, id: &str) -> Result<()> {
        let notifications;
        {
            let mut shared = self.lock()?;
            let removed = shared
                .collections
                .get_mut(&(user.clone(), collection))
                .and_then(|docs| docs.remove(id));
            if removed.is_none() {
                return Ok(());
            }
            notifications = shared.notifications(user, collection);
        }
        for (handler, docs) in notifications {
            handler(docs);
        }
        Ok(())
    }
}

/// Serializable store contents: user id -> collection name -> document
/// id -> fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn user() -> UserId {
        UserId::new("u1")
    }

    #[test]
    fn subscribe_delivers_initial_and_updated_snapshots() {
        let store = MemoryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store
            .subscribe(
                &user(),
                Collection::Medications,
                Box::new(move |docs| sink.lock().expect("lock").push(docs.len())),
                Box::new(|_| {}),
            )
            .expect("subscribe");

        store
            .create(
                &user(),
                Collection::Medications,
                serde_json::json!({ "name": "Lisinopril" }),
            )
            .expect("create");

        assert_eq!(*seen.lock().expect("lock"), vec![0, 1]);
        sub.cancel();
    }

    #[test]
    fn cancel_is_synchronous_and_total() {
        let store = MemoryStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = calls.clone();
        let sub = store
            .subscribe(
                &user(),
                Collection::Medications,
                Box::new(move |_| {
                    sink.fetch_add(1, Ordering::SeqCst);
                }),
                Box::new(|_| {}),
            )
            .expect("subscribe");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sub.cancel();
        store
            .create(
                &user(),
                Collection::Medications,
                serde_json::json!({ "name": "Metformin" }),
            )
            .expect("create");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshots_are_scoped_to_user_and_collection() {
        let store = MemoryStore::new();
        store
            .create(
                &UserId::new("other"),
                Collection::Medications,
                serde_json::json!({ "name": "Not yours" }),
            )
            .expect("create");
        store
            .create(
                &user(),
                Collection::HealthEntries,
                serde_json::json!({ "trackerId": "t1" }),
            )
            .expect("create");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store
            .subscribe(
                &user(),
                Collection::Medications,
                Box::new(move |docs| sink.lock().expect("lock").push(docs.len())),
                Box::new(|_| {}),
            )
            .expect("subscribe");
        assert_eq!(*seen.lock().expect("lock"), vec![0]);
    }

    #[test]
    fn update_merges_fields_and_create_stamps_metadata() {
        let store = MemoryStore::new();
        let id = store
            .create(
                &user(),
                Collection::TrackerDefinitions,
                serde_json::json!({ "name": "Mood", "colorIndex": 0 }),
            )
            .expect("create");
        store
            .update(
                &user(),
                Collection::TrackerDefinitions,
                &id,
                serde_json::json!({ "colorIndex": 3 }),
            )
            .expect("update");

        let snapshot = store.snapshot().expect("snapshot");
        let fields = &snapshot.users["u1"]["tracker_definitions"][&id];
        assert_eq!(fields["name"], "Mood");
        assert_eq!(fields["colorIndex"], 3);
        assert!(fields["createdAt"].is_string());
    }

    #[test]
    fn update_removes_fields_sent_as_null() {
        let store = MemoryStore::new();
        let id = store
            .create(
                &user(),
                Collection::HealthEntries,
                serde_json::json!({ "trackerId": "t1", "scale5": 2, "notes": "old" }),
            )
            .expect("create");
        store
            .update(
                &user(),
                Collection::HealthEntries,
                &id,
                serde_json::json!({ "number": 5.0, "scale5": null, "notes": null }),
            )
            .expect("update");

        let snapshot = store.snapshot().expect("snapshot");
        let fields = &snapshot.users["u1"]["health_entries"][&id];
        assert_eq!(fields["number"], 5.0);
        assert!(fields.get("scale5").is_none());
        assert!(fields.get("notes").is_none());
    }

    #[test]
    fn update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let result = store.update(
            &user(),
            Collection::TrackerDefinitions,
            "missing",
            serde_json::json!({ "name": "Mood" }),
        );
        assert!(matches!(result, Err(TrackError::NotFound(_))));
    }

    #[test]
    fn delete_missing_document_is_a_noop() {
        let store = MemoryStore::new();
        assert!(store
            .delete(&user(), Collection::HealthEntries, "missing")
            .is_ok());
    }

    #[test]
    fn failed_collection_reports_error_and_freezes_feed() {
        let store = MemoryStore::new();
        let snapshots = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));
        let snapshot_sink = snapshots.clone();
        let error_sink = errors.clone();
        let _sub = store
            .subscribe(
                &user(),
                Collection::MedicationLogs,
                Box::new(move |_| {
                    snapshot_sink.fetch_add(1, Ordering::SeqCst);
                }),
                Box::new(move |_| {
                    error_sink.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .expect("subscribe");

        store.fail_collection(&user(), Collection::MedicationLogs, "backend gone");
        store
            .create(
                &user(),
                Collection::MedicationLogs,
                serde_json::json!({ "medicationId": "m1" }),
            )
            .expect("create");

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        // Only the initial snapshot made it through.
        assert_eq!(snapshots.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_round_trip_preserves_contents() {
        let store = MemoryStore::new();
        store
            .create(
                &user(),
                Collection::Medications,
                serde_json::json!({ "name": "Lisinopril", "times": ["08:00"] }),
            )
            .expect("create");

        let exported = store.snapshot().expect("snapshot");
        let restored = MemoryStore::from_snapshot(exported.clone()).expect("from_snapshot");
        assert_eq!(restored.snapshot().expect("snapshot"), exported);
    }
}

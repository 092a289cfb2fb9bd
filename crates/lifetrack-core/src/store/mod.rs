//! Remote collection store abstraction.
//!
//! The `CollectionStore` trait defines the interface the sync engine
//! consumes: per-user, per-collection documents with subscribe-with-
//! snapshot and create/update/delete mutations. The concrete transport
//! is deliberately out of scope; [`memory::MemoryStore`] is the
//! in-process reference backend used by the CLI and the tests.

pub mod memory;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TrackError};

pub use memory::{MemoryStore, StoreSnapshot};

/// Opaque per-user identifier, established once per session by the
/// authentication collaborator. All collection access is scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four named collections owned by a signed-in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    TrackerDefinitions,
    HealthEntries,
    Medications,
    MedicationLogs,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::TrackerDefinitions,
        Collection::HealthEntries,
        Collection::Medications,
        Collection::MedicationLogs,
    ];

    /// Wire name of the collection.
    pub fn name(self) -> &'static str {
        match self {
            Collection::TrackerDefinitions => "tracker_definitions",
            Collection::HealthEntries => "health_entries",
            Collection::Medications => "medications",
            Collection::MedicationLogs => "medication_logs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Collection::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store-assigned document identifier.
pub type DocumentId = String;

/// One document in a snapshot: the store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Value,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decode into a record type with the store-assigned `id` merged
    /// into the field set.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        let map = fields.as_object_mut().ok_or_else(|| {
            TrackError::Validation(format!("document {} is not a field map", self.id))
        })?;
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(fields)?)
    }
}

/// Callback invoked with the full decoded document set on every
/// snapshot for a subscribed collection.
pub type SnapshotHandler = Box<dyn Fn(Vec<Document>) + Send + Sync>;

/// Callback invoked when a collection's live feed fails.
pub type ErrorHandler = Box<dyn Fn(TrackError) + Send + Sync>;

/// Per-user partitioned document store with push-based change
/// notification over the four named collections.
pub trait CollectionStore: Send + Sync {
    /// Establish a live subscription. The current contents are
    /// delivered as an initial snapshot, then every mutation publishes
    /// a fresh full snapshot. Errors go to `on_error`; after an error
    /// the feed stops and the subscriber's last snapshot stands.
    fn subscribe(
        &self,
        user: &UserId,
        collection: Collection,
        on_snapshot: SnapshotHandler,
        on_error: ErrorHandler,
    ) -> Result<Subscription>;

    /// Create a document, assigning an id and server timestamp
    /// metadata.
    fn create(&self, user: &UserId, collection: Collection, fields: Value) -> Result<DocumentId>;

    /// Merge the given fields into an existing document. A null value
    /// removes the field, so callers can express full replacement by
    /// sending nulls for everything they omit.
    fn update(
        &self,
        user: &UserId,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<()>;

    /// Delete a document. Deleting an absent document is a no-op.
    fn delete(&self, user: &UserId, collection: Collection, id: &str) -> Result<()>;
}

/// Cancellable handle for a live subscription.
///
/// Cancellation is synchronous and total: once `cancel` returns (or
/// the handle is dropped), no further callback fires.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Stop the subscription now instead of at drop time.
    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

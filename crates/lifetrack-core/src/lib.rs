//! # LifeTrack Core
//!
//! Core library for LifeTrack - a personal health tracker with
//! user-defined trackers, medication schedules, and weekly trend
//! reports.
//!
//! This crate provides the reactive synchronization and derived-view
//! layer, independent of any presentation surface:
//!
//! - **store**: per-user collection store abstraction and the
//!   in-memory reference backend
//! - **session**: typed lifecycle for the authenticated identity
//! - **sync**: subscription engine keeping local mirrors consistent
//!   with the store, and the mutation intents that write back
//! - **model**: record types, entry summaries, value classification
//! - **schedule**: per-day medication dosage expansion and the
//!   toggle-taken lookup
//! - **report**: trailing-week aggregation per tracker

pub mod error;
pub mod model;
pub mod report;
pub mod schedule;
pub mod session;
pub mod store;
pub mod sync;

pub use error::{Result, TrackError};
pub use model::{
    parse_entry_date, resolve_tracker, summarize, Entry, EntryValue, FieldKind, LegacyValue,
    Medication, MedicationLog, NewEntry, NewMedication, NewTracker, Tracker,
};
pub use report::{weekly_report, Stat, TrackerReport, ValueKind};
pub use schedule::{todays_schedule, DoseInstance};
pub use session::Session;
pub use store::{
    Collection, CollectionStore, Document, DocumentId, MemoryStore, StoreSnapshot, Subscription,
    UserId,
};
pub use sync::{SyncEngine, SyncStatus};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

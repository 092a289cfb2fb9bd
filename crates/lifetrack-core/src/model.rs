//! Record types for the four synchronized collections, plus the pure
//! helpers that read them.
//!
//! Field names serialize in camelCase to match the wire format of the
//! per-user document store (`trackerId`, `dataType`, `medicationId`, ...).
//! An entry's typed fields are all independently optional: presence,
//! not the tracker's declared kinds, determines what gets summarized
//! and aggregated. The tracker's `types` is a hint for input forms,
//! never an enforced schema.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};

/// The field kinds a tracker can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Scale5,
    Scale10,
    Number,
    Boolean,
    Duration,
    Text,
}

impl FieldKind {
    /// Human label for display, matching the original form labels.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Scale5 => "1-5 Scale",
            FieldKind::Scale10 => "1-10 Scale",
            FieldKind::Number => "Number",
            FieldKind::Boolean => "Yes / No",
            FieldKind::Duration => "Duration",
            FieldKind::Text => "Text Note",
        }
    }
}

/// A user-defined measurement template.
///
/// `icon` and `color_index` are presentation-only and opaque to the
/// core. `data_type` is the legacy single-kind field, kept equal to
/// `types[0]` on write for entries created before multi-kind trackers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<FieldKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<FieldKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_index: Option<u32>,
}

impl Tracker {
    /// Uniform multi-kind view over old and new trackers: `types` if
    /// present, else the single-element legacy `data_type`.
    pub fn effective_types(&self) -> Vec<FieldKind> {
        match &self.types {
            Some(types) => types.clone(),
            None => self.data_type.into_iter().collect(),
        }
    }
}

/// Legacy entry value: a string or a boolean, written by entries that
/// predate the typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyValue {
    Bool(bool),
    Text(String),
}

/// One recorded observation against a tracker.
///
/// `tracker_id` may dangle after tracker deletion; callers resolve it
/// with [`resolve_tracker`] and fall back to a generic label. `date`
/// is a user-editable ISO-8601 local date-time string and need not
/// equal creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub tracker_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale5: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale10: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<LegacyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An entry's classified value, produced by [`Entry::classify`].
///
/// One variant per kind rather than an open field bag, so the fixed
/// priority rule stays enforceable and testable.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Scale5(u8),
    Scale10(u8),
    Number(f64),
    Duration(u32),
    Boolean(bool),
    /// Legacy `value` field coerced to a number (booleans as 1/0).
    Legacy(f64),
    /// Legacy `value` that failed numeric coercion; excluded from
    /// numeric aggregation.
    Text(String),
}

impl EntryValue {
    /// Numeric form used by aggregation; `None` for non-numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EntryValue::Scale5(v) => Some(f64::from(*v)),
            EntryValue::Scale10(v) => Some(f64::from(*v)),
            EntryValue::Number(v) => Some(*v),
            EntryValue::Duration(v) => Some(f64::from(*v)),
            EntryValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            EntryValue::Legacy(v) => Some(*v),
            EntryValue::Text(_) => None,
        }
    }
}

impl Entry {
    /// Classify the entry's value by checking present fields in fixed
    /// priority order `scale5 -> scale10 -> number -> duration ->
    /// boolean -> value`, taking the first present field as *the*
    /// value. Returns `None` when no value field is present at all.
    pub fn classify(&self) -> Option<EntryValue> {
        if let Some(v) = self.scale5 {
            return Some(EntryValue::Scale5(v));
        }
        if let Some(v) = self.scale10 {
            return Some(EntryValue::Scale10(v));
        }
        if let Some(v) = self.number {
            return Some(EntryValue::Number(v));
        }
        if let Some(v) = self.duration {
            return Some(EntryValue::Duration(v));
        }
        if let Some(b) = self.boolean {
            return Some(EntryValue::Boolean(b));
        }
        match &self.value {
            Some(LegacyValue::Bool(b)) => Some(EntryValue::Legacy(if *b { 1.0 } else { 0.0 })),
            Some(LegacyValue::Text(raw)) => match raw.trim().parse::<f64>() {
                Ok(n) => Some(EntryValue::Legacy(n)),
                Err(_) => Some(EntryValue::Text(raw.clone())),
            },
            None => None,
        }
    }
}

/// A scheduled recurring treatment.
///
/// `times` are zero-padded `HH:MM` clock strings; duplicates are
/// allowed and expand to independently markable dose instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    pub times: Vec<String>,
    pub active: bool,
}

/// A single proof-of-adherence event.
///
/// Existence of the record is the "taken" signal: logs are created
/// when a dose is marked taken and deleted when un-marked, never
/// updated in place. At most one log should exist per
/// `(medication_id, date, time)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLog {
    pub id: String,
    pub medication_id: String,
    /// `YYYY-MM-DD`, no time component.
    pub date: String,
    /// Matches one of the medication's scheduled `HH:MM` strings.
    pub time: String,
    #[serde(default = "default_taken")]
    pub taken: bool,
}

fn default_taken() -> bool {
    true
}

/// Draft for creating a tracker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTracker {
    pub name: String,
    pub types: Vec<FieldKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_index: Option<u32>,
}

impl NewTracker {
    pub fn new(name: impl Into<String>, types: Vec<FieldKind>) -> Self {
        Self {
            name: name.into(),
            types,
            icon: None,
            color_index: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color_index(mut self, color_index: u32) -> Self {
        self.color_index = Some(color_index);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TrackError::Validation("Tracker name is required".to_string()));
        }
        if self.types.is_empty() {
            return Err(TrackError::Validation(
                "Tracker needs at least one data field".to_string(),
            ));
        }
        Ok(())
    }
}

/// Draft for creating an entry, also used as the full-field payload
/// when editing (an edit replaces every field of the record).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub tracker_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale5: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale10: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewEntry {
    pub fn new(tracker_id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            tracker_id: tracker_id.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    pub fn with_boolean(mut self, value: bool) -> Self {
        self.boolean = Some(value);
        self
    }

    pub fn with_scale5(mut self, value: u8) -> Self {
        self.scale5 = Some(value);
        self
    }

    pub fn with_scale10(mut self, value: u8) -> Self {
        self.scale10 = Some(value);
        self
    }

    pub fn with_number(mut self, value: f64) -> Self {
        self.number = Some(value);
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.tracker_id.trim().is_empty() {
            return Err(TrackError::Validation("Entry needs a tracker".to_string()));
        }
        if parse_entry_date(&self.date).is_none() {
            return Err(TrackError::Validation(format!(
                "Entry date \"{}\" is not an ISO-8601 date-time",
                self.date
            )));
        }
        if let Some(v) = self.scale5 {
            if !(1..=5).contains(&v) {
                return Err(TrackError::Validation(format!(
                    "Scale value {} out of range 1-5",
                    v
                )));
            }
        }
        if let Some(v) = self.scale10 {
            if !(1..=10).contains(&v) {
                return Err(TrackError::Validation(format!(
                    "Scale value {} out of range 1-10",
                    v
                )));
            }
        }
        Ok(())
    }
}

/// Draft for creating a medication. Medications start active.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub times: Vec<String>,
}

impl NewMedication {
    pub fn new(name: impl Into<String>, dosage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            frequency: "Daily".to_string(),
            times: Vec::new(),
        }
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = frequency.into();
        self
    }

    pub fn with_times(mut self, times: Vec<String>) -> Self {
        self.times = times;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TrackError::Validation(
                "Medication name is required".to_string(),
            ));
        }
        if self.times.is_empty() {
            return Err(TrackError::Validation(
                "Medication needs at least one scheduled time".to_string(),
            ));
        }
        for time in &self.times {
            // Parsing alone is too lenient ("8:00" parses); logs match
            // schedule slots by string equality, so require the
            // canonical zero-padded form.
            let canonical = NaiveTime::parse_from_str(time, "%H:%M")
                .ok()
                .map(|t| t.format("%H:%M").to_string());
            if canonical.as_deref() != Some(time.as_str()) {
                return Err(TrackError::Validation(format!(
                    "Scheduled time \"{}\" is not a zero-padded HH:MM clock time",
                    time
                )));
            }
        }
        Ok(())
    }
}

/// Find the tracker an entry references, or `None` for a dangling
/// reference (deleted tracker). Callers fall back to a generic label,
/// never an error.
pub fn resolve_tracker<'a>(entry: &Entry, trackers: &'a [Tracker]) -> Option<&'a Tracker> {
    trackers.iter().find(|t| t.id == entry.tracker_id)
}

/// Produce human-readable fragments for an entry.
///
/// Fields are checked in fixed priority order `boolean -> scale5 ->
/// scale10 -> number -> duration -> text`, appending a fragment for
/// each field that is present. The legacy `value` is the fallback when
/// no typed field is present, and `notes` is appended only when `text`
/// did not already contribute free text. The ordering is deliberate
/// display parity with the original views and is not configurable.
pub fn summarize(entry: &Entry) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(b) = entry.boolean {
        parts.push(yes_no(b).to_string());
    }
    if let Some(v) = entry.scale5 {
        parts.push(format!("Rating: {}/5", v));
    }
    if let Some(v) = entry.scale10 {
        parts.push(format!("Level: {}/10", v));
    }
    if let Some(v) = entry.number {
        parts.push(format!("Val: {}", format_number(v)));
    }
    if let Some(v) = entry.duration {
        parts.push(format!("{}m", v));
    }
    if let Some(text) = &entry.text {
        parts.push(format!("\"{}\"", text));
    }
    if parts.is_empty() {
        match &entry.value {
            Some(LegacyValue::Bool(b)) => parts.push(yes_no(*b).to_string()),
            Some(LegacyValue::Text(raw)) => parts.push(raw.clone()),
            None => {}
        }
    }
    if let Some(notes) = &entry.notes {
        if entry.text.is_none() {
            parts.push(notes.clone());
        }
    }
    parts
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Render a float without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Lenient parse for user-edited entry dates: RFC 3339 first, then the
/// `datetime-local` shapes the original UI wrote, then a bare date.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

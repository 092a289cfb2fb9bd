//! Weekly aggregation over heterogeneous entries.
//!
//! Classifies a trailing week of entries per tracker and derives the
//! summary statistic matching the first-seen value kind. Pure functions
//! of the synchronized collections.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::model::{parse_entry_date, Entry, EntryValue, Tracker};

/// Value kind driving a bucket's statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scale5,
    Scale10,
    Number,
    Duration,
    Boolean,
    /// Legacy `value` field that coerced to a number.
    Legacy,
}

/// Per-kind summary statistic for one tracker's week.
#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    /// Arithmetic mean of scale ratings, rounded to one decimal.
    /// `scale_max` is 5 or 10, for rendering the range.
    AverageScore { average: f64, scale_max: u8 },
    /// Sum over the week plus the sum/7 daily average.
    WeeklyTotal { total: f64, daily_average: f64 },
    /// Count-of-true over count-of-logged for yes/no entries.
    Occurrences { occurred: u32, logged: u32 },
}

/// One tracker's aggregation bucket.
///
/// Every known tracker gets a bucket even with zero matching entries,
/// so a reporting view can show "no data" (`stat` is `None` then).
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerReport {
    pub tracker: Tracker,
    /// First-seen value kind; authoritative for mixed-kind weeks.
    pub kind: Option<ValueKind>,
    pub values: Vec<f64>,
    pub stat: Option<Stat>,
}

/// Aggregate the trailing week `[now - 7 days, now]`, inclusive of the
/// lower bound, into one bucket per known tracker.
///
/// Entries whose tracker no longer resolves are skipped silently, as
/// are entries with no value field and legacy values that fail numeric
/// coercion.
pub fn weekly_report(
    entries: &[Entry],
    trackers: &[Tracker],
    now: NaiveDateTime,
) -> Vec<TrackerReport> {
    let window_start = now - Duration::days(7);

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<TrackerReport> = Vec::with_capacity(trackers.len());
    for (slot, tracker) in trackers.iter().enumerate() {
        index.insert(tracker.id.as_str(), slot);
        buckets.push(TrackerReport {
            tracker: tracker.clone(),
            kind: None,
            values: Vec::new(),
            stat: None,
        });
    }

    for entry in entries {
        let Some(&slot) = index.get(entry.tracker_id.as_str()) else {
            continue; // orphaned entry
        };
        let Some(date) = parse_entry_date(&entry.date) else {
            continue;
        };
        if date < window_start || date > now {
            continue;
        }
        let Some(value) = entry.classify() else {
            continue;
        };
        let kind = match &value {
            EntryValue::Scale5(_) => ValueKind::Scale5,
            EntryValue::Scale10(_) => ValueKind::Scale10,
            EntryValue::Number(_) => ValueKind::Number,
            EntryValue::Duration(_) => ValueKind::Duration,
            EntryValue::Boolean(_) => ValueKind::Boolean,
            EntryValue::Legacy(_) => ValueKind::Legacy,
            EntryValue::Text(_) => continue, // non-numeric, excluded
        };
        let Some(number) = value.as_number() else {
            continue;
        };
        let bucket = &mut buckets[slot];
        bucket.values.push(number);
        bucket.kind.get_or_insert(kind);
    }

    for bucket in &mut buckets {
        bucket.stat = derive_stat(bucket.kind, &bucket.values);
    }
    buckets
}

fn derive_stat(kind: Option<ValueKind>, values: &[f64]) -> Option<Stat> {
    if values.is_empty() {
        return None;
    }
    let kind = kind?;
    let total: f64 = values.iter().sum();
    let stat = match kind {
        ValueKind::Scale5 => Stat::AverageScore {
            average: round1(total / values.len() as f64),
            scale_max: 5,
        },
        ValueKind::Scale10 => Stat::AverageScore {
            average: round1(total / values.len() as f64),
            scale_max: 10,
        },
        ValueKind::Number | ValueKind::Duration | ValueKind::Legacy => Stat::WeeklyTotal {
            total,
            daily_average: round1(total / 7.0),
        },
        ValueKind::Boolean => Stat::Occurrences {
            occurred: total as u32,
            logged: values.len() as u32,
        },
    };
    Some(stat)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

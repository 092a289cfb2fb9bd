//! Medication schedule expansion.
//!
//! Expands medication definitions into a per-day dosage checklist and
//! merges in the adherence logs. Pure functions of the synchronized
//! collections; the toggle-taken write path lives on the sync engine.

use chrono::NaiveDate;

use crate::model::{Medication, MedicationLog};

/// One (medication, scheduled time) pair expanded for a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseInstance {
    pub medication: Medication,
    /// Zero-padded `HH:MM` clock string.
    pub scheduled_time: String,
    pub taken: bool,
}

/// Expand every active medication's scheduled times into dose
/// instances for `today`, marking each taken iff an adherence log
/// matches the `(medication, date, time)` triple.
///
/// Inactive medications contribute no instances. Duplicate times in a
/// schedule produce duplicate, independently markable instances. The
/// result is sorted ascending by scheduled time; lexicographic order
/// is correct because the format is zero-padded and fixed-width.
pub fn todays_schedule(
    medications: &[Medication],
    logs: &[MedicationLog],
    today: NaiveDate,
) -> Vec<DoseInstance> {
    let date = today.format("%Y-%m-%d").to_string();
    let mut instances = Vec::new();
    for medication in medications.iter().filter(|m| m.active) {
        for time in &medication.times {
            instances.push(DoseInstance {
                medication: medication.clone(),
                scheduled_time: time.clone(),
                taken: find_log(logs, &medication.id, &date, time).is_some(),
            });
        }
    }
    instances.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
    instances
}

/// Look up the adherence log for a `(medication, date, time)` triple.
pub fn find_log<'a>(
    logs: &'a [MedicationLog],
    medication_id: &str,
    date: &str,
    time: &str,
) -> Option<&'a MedicationLog> {
    logs.iter()
        .find(|log| log.medication_id == medication_id && log.date == date && log.time == time)
}

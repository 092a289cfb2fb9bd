//! Output formatting helpers for the CLI.

use lifetrack_core::model::format_number;
use lifetrack_core::{
    resolve_tracker, summarize, DoseInstance, Entry, Medication, Stat, Tracker, TrackerReport,
};

pub fn tracker_line(tracker: &Tracker) -> String {
    let kinds: Vec<&str> = tracker
        .effective_types()
        .iter()
        .map(|k| k.label())
        .collect();
    format!("{}  [{}]  {}", tracker.name, tracker.id, kinds.join(", "))
}

pub fn tracker_json(tracker: &Tracker) -> serde_json::Value {
    serde_json::json!({
        "id": tracker.id,
        "name": tracker.name,
        "types": tracker.effective_types(),
        "icon": tracker.icon,
        "colorIndex": tracker.color_index,
    })
}

pub fn entry_line(entry: &Entry, trackers: &[Tracker]) -> String {
    let name = resolve_tracker(entry, trackers)
        .map(|t| t.name.as_str())
        .unwrap_or("Unknown Tracker");
    let summary = summarize(entry).join(" \u{2022} ");
    format!("{}  {}  {}", entry.date, name, summary)
}

pub fn entry_json(entry: &Entry, trackers: &[Tracker]) -> serde_json::Value {
    let name = resolve_tracker(entry, trackers).map(|t| t.name.clone());
    serde_json::json!({
        "id": entry.id,
        "trackerId": entry.tracker_id,
        "tracker": name,
        "date": entry.date,
        "summary": summarize(entry),
    })
}

pub fn medication_line(medication: &Medication) -> String {
    format!(
        "{}  [{}]  {} \u{2022} {} \u{2022} {}",
        medication.name,
        medication.id,
        medication.dosage,
        medication.frequency,
        medication.times.join(", ")
    )
}

pub fn medication_json(medication: &Medication) -> serde_json::Value {
    serde_json::json!({
        "id": medication.id,
        "name": medication.name,
        "dosage": medication.dosage,
        "frequency": medication.frequency,
        "times": medication.times,
        "active": medication.active,
    })
}

pub fn dose_line(dose: &DoseInstance) -> String {
    let mark = if dose.taken { "x" } else { " " };
    format!(
        "[{}] {}  {}  {}",
        mark, dose.scheduled_time, dose.medication.name, dose.medication.dosage
    )
}

pub fn dose_json(dose: &DoseInstance) -> serde_json::Value {
    serde_json::json!({
        "medicationId": dose.medication.id,
        "medication": dose.medication.name,
        "time": dose.scheduled_time,
        "taken": dose.taken,
    })
}

pub fn report_line(report: &TrackerReport) -> String {
    let body = match &report.stat {
        Some(Stat::AverageScore { average, scale_max }) => format!(
            "avg {:.1}/{} over {} entries",
            average,
            scale_max,
            report.values.len()
        ),
        Some(Stat::WeeklyTotal {
            total,
            daily_average,
        }) => format!(
            "total {} (daily avg {:.1})",
            format_number(*total),
            daily_average
        ),
        Some(Stat::Occurrences { occurred, logged }) => {
            format!("{} / {} times", occurred, logged)
        }
        None => "no data".to_string(),
    };
    format!("{}: {}", report.tracker.name, body)
}

pub fn report_json(report: &TrackerReport) -> serde_json::Value {
    let stat = match &report.stat {
        Some(Stat::AverageScore { average, scale_max }) => serde_json::json!({
            "kind": "average",
            "average": average,
            "scaleMax": scale_max,
        }),
        Some(Stat::WeeklyTotal {
            total,
            daily_average,
        }) => serde_json::json!({
            "kind": "total",
            "total": total,
            "dailyAverage": daily_average,
        }),
        Some(Stat::Occurrences { occurred, logged }) => serde_json::json!({
            "kind": "occurrences",
            "occurred": occurred,
            "logged": logged,
        }),
        None => serde_json::Value::Null,
    };
    serde_json::json!({
        "trackerId": report.tracker.id,
        "tracker": report.tracker.name,
        "values": report.values,
        "stat": stat,
    })
}

//! Parsing and lookup helpers shared by the command handlers.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate, NaiveDateTime};

use lifetrack_core::{parse_entry_date, FieldKind, Medication, SyncEngine, Tracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn parse_output_format(raw: &str) -> anyhow::Result<OutputFormat> {
    match raw {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => bail!("Unknown output format \"{}\" (expected text or json)", other),
    }
}

pub fn parse_kind(raw: &str) -> anyhow::Result<FieldKind> {
    let kind = match raw {
        "scale5" => FieldKind::Scale5,
        "scale10" => FieldKind::Scale10,
        "number" => FieldKind::Number,
        "boolean" => FieldKind::Boolean,
        "duration" => FieldKind::Duration,
        "text" => FieldKind::Text,
        other => bail!(
            "Unknown field kind \"{}\" (expected scale5, scale10, number, boolean, duration or text)",
            other
        ),
    };
    Ok(kind)
}

pub fn parse_yes_no(raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => bail!("Expected yes or no, got \"{}\"", other),
    }
}

/// Entry date argument, defaulting to the current local minute.
pub fn entry_date_or_now(raw: Option<&str>) -> anyhow::Result<String> {
    match raw {
        Some(raw) => {
            if parse_entry_date(raw).is_none() {
                bail!("\"{}\" is not an ISO-8601 date-time", raw);
            }
            Ok(raw.to_string())
        }
        None => Ok(Local::now().format("%Y-%m-%dT%H:%M").to_string()),
    }
}

/// Day argument (`YYYY-MM-DD`), defaulting to today.
pub fn day_or_today(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("\"{}\" is not a YYYY-MM-DD date", raw)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Reference time argument, defaulting to now.
pub fn reference_time_or_now(raw: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    match raw {
        Some(raw) => {
            parse_entry_date(raw).ok_or_else(|| anyhow!("\"{}\" is not an ISO-8601 date-time", raw))
        }
        None => Ok(Local::now().naive_local()),
    }
}

/// Resolve a tracker by exact id or case-insensitive name.
pub fn resolve_tracker_arg(engine: &SyncEngine, needle: &str) -> anyhow::Result<Tracker> {
    let trackers = engine.trackers();
    if let Some(tracker) = trackers.iter().find(|t| t.id == needle) {
        return Ok(tracker.clone());
    }
    let mut matches = trackers
        .iter()
        .filter(|t| t.name.eq_ignore_ascii_case(needle));
    match (matches.next(), matches.next()) {
        (Some(tracker), None) => Ok(tracker.clone()),
        (Some(_), Some(_)) => bail!(
            "Multiple trackers named \"{}\"; use the tracker id (see `lifetrack tracker list`)",
            needle
        ),
        _ => bail!(
            "Tracker \"{}\" not found. Run `lifetrack tracker list` to see trackers.",
            needle
        ),
    }
}

/// Resolve a medication by exact id or case-insensitive name.
pub fn resolve_medication_arg(engine: &SyncEngine, needle: &str) -> anyhow::Result<Medication> {
    let medications = engine.medications();
    if let Some(medication) = medications.iter().find(|m| m.id == needle) {
        return Ok(medication.clone());
    }
    let mut matches = medications
        .iter()
        .filter(|m| m.name.eq_ignore_ascii_case(needle));
    match (matches.next(), matches.next()) {
        (Some(medication), None) => Ok(medication.clone()),
        (Some(_), Some(_)) => bail!(
            "Multiple medications named \"{}\"; use the medication id (see `lifetrack med list`)",
            needle
        ),
        _ => bail!(
            "Medication \"{}\" not found. Run `lifetrack med list` to see medications.",
            needle
        ),
    }
}

/// Write a file atomically: temp file in the same directory, synced,
/// then renamed over the destination.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("Invalid data path {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("Cannot create {}", parent.display()))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System time error")?
        .as_nanos();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid data filename {}", path.display()))?;
    let temp_path = parent.join(format!("{}.{}.tmp", filename, nanos));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| format!("Temp file create failed at {}", temp_path.display()))?;
    file.write_all(data).context("Temp file write failed")?;
    file.sync_all().context("Temp file sync failed")?;

    if fs::rename(&temp_path, path).is_ok() {
        return Ok(());
    }
    // Some platforms refuse to rename over an existing file; clear the
    // destination and try once more.
    let _ = fs::remove_file(path);
    fs::rename(&temp_path, path).map_err(|err| {
        let _ = fs::remove_file(&temp_path);
        anyhow!("Cannot replace {}: {}", path.display(), err)
    })
}

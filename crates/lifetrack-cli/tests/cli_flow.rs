use std::path::{Path, PathBuf};
use std::process::Command;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lifetrack"))
}

/// Isolated config and data paths inside a fresh temp dir. The dir
/// guard must stay alive for the duration of the test.
fn workspace() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.toml");
    let data = dir.path().join("lifetrack.json");
    (dir, config, data)
}

fn lifetrack(config: &Path, data: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.arg("--config").arg(config).arg("--data").arg(data);
    cmd
}

fn run_ok(mut cmd: Command) -> String {
    let output = cmd.output().expect("run lifetrack");
    assert!(
        output.status.success(),
        "command failed: stdout={}, stderr={}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn run_json(mut cmd: Command) -> serde_json::Value {
    cmd.arg("--format").arg("json");
    let stdout = run_ok(cmd);
    serde_json::from_str(&stdout).expect("parse json output")
}

fn init(config: &Path, data: &Path) {
    let mut cmd = lifetrack(config, data);
    cmd.arg("init").arg("--user").arg("test-user");
    run_ok(cmd);
}

#[test]
fn test_cli_init_writes_config() {
    let (_dir, config, data) = workspace();

    let mut cmd = lifetrack(&config, &data);
    cmd.arg("init").arg("--user").arg("u-abc");
    let stdout = run_ok(cmd);
    assert!(stdout.contains("Identity: u-abc"));
    assert!(config.exists(), "config file should exist");

    let contents = std::fs::read_to_string(&config).expect("read config");
    let value: toml::Value = contents.parse().expect("parse config");
    assert_eq!(
        value
            .get("user")
            .and_then(|section| section.get("id"))
            .and_then(|id| id.as_str()),
        Some("u-abc")
    );
    assert_eq!(
        value
            .get("data")
            .and_then(|section| section.get("path"))
            .and_then(|path| path.as_str()),
        Some(data.to_string_lossy().as_ref())
    );
}

#[test]
fn test_cli_init_refuses_existing_config() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut again = lifetrack(&config, &data);
    again.arg("init");
    let output = again.output().expect("run init");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config already exists"));
}

#[test]
fn test_cli_missing_config_message() {
    let (_dir, config, data) = workspace();

    let mut list = lifetrack(&config, &data);
    list.arg("tracker").arg("list");
    let output = list.output().expect("run list");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No config at"));
    assert!(stderr.contains("lifetrack init"));
}

#[test]
fn test_cli_tracker_log_entries_flow() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Mood").arg("-k").arg("scale5");
    run_ok(add);

    let mut first = lifetrack(&config, &data);
    first
        .arg("log")
        .arg("Mood")
        .arg("--scale5")
        .arg("4")
        .arg("--date")
        .arg("2026-08-18T08:00");
    run_ok(first);

    let mut second = lifetrack(&config, &data);
    second
        .arg("log")
        .arg("mood")
        .arg("--scale5")
        .arg("5")
        .arg("--notes")
        .arg("slept well")
        .arg("--date")
        .arg("2026-08-19T08:00");
    run_ok(second);

    let mut entries = lifetrack(&config, &data);
    entries.arg("entries").arg("list");
    let value = run_json(entries);
    let array = value.as_array().expect("entries array");
    assert_eq!(array.len(), 2);

    // Newest first.
    assert_eq!(
        array[0].get("date").and_then(|v| v.as_str()),
        Some("2026-08-19T08:00")
    );
    assert_eq!(
        array[0].get("tracker").and_then(|v| v.as_str()),
        Some("Mood")
    );
    let summary = array[0].get("summary").and_then(|v| v.as_array()).expect("summary");
    assert_eq!(summary[0].as_str(), Some("Rating: 5/5"));
}

#[test]
fn test_cli_log_edit_replaces_entry() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Mood").arg("-k").arg("scale5");
    run_ok(add);

    let mut log = lifetrack(&config, &data);
    log.arg("log")
        .arg("Mood")
        .arg("--scale5")
        .arg("2")
        .arg("--date")
        .arg("2026-08-18T08:00");
    run_ok(log);

    let mut entries = lifetrack(&config, &data);
    entries.arg("entries").arg("list");
    let value = run_json(entries);
    let entry_id = value.as_array().expect("entries array")[0]
        .get("id")
        .and_then(|v| v.as_str())
        .expect("entry id")
        .to_string();

    let mut edit = lifetrack(&config, &data);
    edit.arg("log")
        .arg("Mood")
        .arg("--edit")
        .arg(&entry_id)
        .arg("--scale5")
        .arg("4")
        .arg("--date")
        .arg("2026-08-18T09:00");
    run_ok(edit);

    let mut after = lifetrack(&config, &data);
    after.arg("entries").arg("list");
    let value = run_json(after);
    let array = value.as_array().expect("entries array");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0].get("id").and_then(|v| v.as_str()), Some(entry_id.as_str()));
    assert_eq!(
        array[0].get("date").and_then(|v| v.as_str()),
        Some("2026-08-18T09:00")
    );
    let summary = array[0].get("summary").and_then(|v| v.as_array()).expect("summary");
    assert_eq!(summary[0].as_str(), Some("Rating: 4/5"));
}

#[test]
fn test_cli_entries_rm_deletes_entry() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Mood").arg("-k").arg("scale5");
    run_ok(add);

    let mut log = lifetrack(&config, &data);
    log.arg("log")
        .arg("Mood")
        .arg("--scale5")
        .arg("3")
        .arg("--date")
        .arg("2026-08-18T08:00");
    run_ok(log);

    let mut entries = lifetrack(&config, &data);
    entries.arg("entries").arg("list");
    let value = run_json(entries);
    let entry_id = value.as_array().expect("entries array")[0]
        .get("id")
        .and_then(|v| v.as_str())
        .expect("entry id")
        .to_string();

    let mut rm = lifetrack(&config, &data);
    rm.arg("entries").arg("rm").arg(&entry_id);
    run_ok(rm);

    let mut after = lifetrack(&config, &data);
    after.arg("entries").arg("list");
    let value = run_json(after);
    assert_eq!(value.as_array().expect("entries array").len(), 0);

    // Deleting it again reports not-found.
    let mut again = lifetrack(&config, &data);
    again.arg("entries").arg("rm").arg(&entry_id);
    let output = again.output().expect("run rm");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_cli_log_unknown_tracker_errors() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut log = lifetrack(&config, &data);
    log.arg("log").arg("Nope").arg("--scale5").arg("3");
    let output = log.output().expect("run log");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_cli_tracker_rm_leaves_entries() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Water").arg("-k").arg("number");
    run_ok(add);

    let mut log = lifetrack(&config, &data);
    log.arg("log")
        .arg("Water")
        .arg("--number")
        .arg("6")
        .arg("--date")
        .arg("2026-08-18T08:00");
    run_ok(log);

    let mut rm = lifetrack(&config, &data);
    rm.arg("tracker").arg("rm").arg("Water");
    run_ok(rm);

    let mut trackers = lifetrack(&config, &data);
    trackers.arg("tracker").arg("list");
    let value = run_json(trackers);
    assert_eq!(value.as_array().expect("trackers array").len(), 0);

    // The orphaned entry survives, rendered without a tracker name.
    let mut entries = lifetrack(&config, &data);
    entries.arg("entries").arg("list");
    let value = run_json(entries);
    let array = value.as_array().expect("entries array");
    assert_eq!(array.len(), 1);
    assert!(array[0].get("tracker").expect("tracker field").is_null());
}

#[test]
fn test_cli_weekly_report() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Mood").arg("-k").arg("scale5");
    run_ok(add);

    for (date, score) in [("2026-08-18T08:00", "4"), ("2026-08-19T08:00", "5")] {
        let mut log = lifetrack(&config, &data);
        log.arg("log")
            .arg("Mood")
            .arg("--scale5")
            .arg(score)
            .arg("--date")
            .arg(date);
        run_ok(log);
    }

    // Well outside the trailing week.
    let mut old = lifetrack(&config, &data);
    old.arg("log")
        .arg("Mood")
        .arg("--scale5")
        .arg("1")
        .arg("--date")
        .arg("2026-08-01T08:00");
    run_ok(old);

    let mut report = lifetrack(&config, &data);
    report.arg("report").arg("--now").arg("2026-08-20T12:00");
    let value = run_json(report);
    let array = value.as_array().expect("report array");
    assert_eq!(array.len(), 1);

    let stat = array[0].get("stat").expect("stat");
    assert_eq!(stat.get("kind").and_then(|v| v.as_str()), Some("average"));
    assert_eq!(stat.get("average").and_then(|v| v.as_f64()), Some(4.5));
    assert_eq!(stat.get("scaleMax").and_then(|v| v.as_u64()), Some(5));
    assert_eq!(
        array[0].get("values").and_then(|v| v.as_array()).map(|v| v.len()),
        Some(2)
    );
}

#[test]
fn test_cli_medication_schedule_and_toggle() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("med")
        .arg("add")
        .arg("Aspirin")
        .arg("--dosage")
        .arg("100mg")
        .arg("-t")
        .arg("08:00")
        .arg("-t")
        .arg("20:00");
    run_ok(add);

    let mut schedule = lifetrack(&config, &data);
    schedule.arg("schedule").arg("--date").arg("2026-08-20");
    let value = run_json(schedule);
    let doses = value.as_array().expect("schedule array");
    assert_eq!(doses.len(), 2);
    assert_eq!(doses[0].get("time").and_then(|v| v.as_str()), Some("08:00"));
    assert_eq!(doses[0].get("taken").and_then(|v| v.as_bool()), Some(false));

    let mut toggle = lifetrack(&config, &data);
    toggle
        .arg("med")
        .arg("toggle")
        .arg("Aspirin")
        .arg("08:00")
        .arg("--date")
        .arg("2026-08-20");
    let stdout = run_ok(toggle);
    assert!(stdout.contains("marked taken"));

    let mut schedule = lifetrack(&config, &data);
    schedule.arg("schedule").arg("--date").arg("2026-08-20");
    let value = run_json(schedule);
    let doses = value.as_array().expect("schedule array");
    assert_eq!(doses[0].get("taken").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(doses[1].get("taken").and_then(|v| v.as_bool()), Some(false));

    // Toggling again undoes the mark.
    let mut toggle = lifetrack(&config, &data);
    toggle
        .arg("med")
        .arg("toggle")
        .arg("Aspirin")
        .arg("08:00")
        .arg("--date")
        .arg("2026-08-20");
    let stdout = run_ok(toggle);
    assert!(stdout.contains("marked not taken"));
}

#[test]
fn test_cli_toggle_unscheduled_time_errors() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("med").arg("add").arg("Aspirin").arg("-t").arg("08:00");
    run_ok(add);

    let mut toggle = lifetrack(&config, &data);
    toggle
        .arg("med")
        .arg("toggle")
        .arg("Aspirin")
        .arg("12:00")
        .arg("--date")
        .arg("2026-08-20");
    let output = toggle.output().expect("run toggle");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("has no 12:00 dose"));
}

#[test]
fn test_cli_entries_respects_limit() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Water").arg("-k").arg("number");
    run_ok(add);

    for day in 10..15 {
        let mut log = lifetrack(&config, &data);
        log.arg("log")
            .arg("Water")
            .arg("--number")
            .arg("1")
            .arg("--date")
            .arg(format!("2026-08-{}T08:00", day));
        run_ok(log);
    }

    let mut entries = lifetrack(&config, &data);
    entries.arg("entries").arg("list").arg("--limit").arg("3");
    let value = run_json(entries);
    assert_eq!(value.as_array().expect("entries array").len(), 3);
}

#[test]
fn test_cli_quiet_suppresses_output() {
    let (_dir, config, data) = workspace();

    let mut cmd = lifetrack(&config, &data);
    cmd.arg("--quiet").arg("init").arg("--user").arg("test-user");
    let stdout = run_ok(cmd);
    assert!(stdout.trim().is_empty());
}

#[test]
fn test_cli_invalid_kind_errors() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Mood").arg("-k").arg("scale");
    let output = add.output().expect("run add");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown field kind"));
}

#[test]
fn test_cli_scale_out_of_range_errors() {
    let (_dir, config, data) = workspace();
    init(&config, &data);

    let mut add = lifetrack(&config, &data);
    add.arg("tracker").arg("add").arg("Mood").arg("-k").arg("scale5");
    run_ok(add);

    let mut log = lifetrack(&config, &data);
    log.arg("log").arg("Mood").arg("--scale5").arg("7");
    let output = log.output().expect("run log");
    assert!(!output.status.success());
}

use lifetrack_core::NewEntry;

use crate::app::App;
use crate::cli::{Cli, LogArgs};
use crate::helpers::{
    entry_date_or_now, parse_output_format, parse_yes_no, resolve_tracker_arg, OutputFormat,
};
use crate::output::{entry_json, entry_line};

pub fn handle_log(cli: &Cli, args: &LogArgs) -> anyhow::Result<()> {
    let app = App::open(cli)?;
    let tracker = resolve_tracker_arg(&app.engine, &args.tracker)?;
    let date = entry_date_or_now(args.date.as_deref())?;

    let mut draft = NewEntry::new(tracker.id.clone(), date);
    if let Some(raw) = &args.done {
        draft = draft.with_boolean(parse_yes_no(raw)?);
    }
    if let Some(v) = args.scale5 {
        draft = draft.with_scale5(v);
    }
    if let Some(v) = args.scale10 {
        draft = draft.with_scale10(v);
    }
    if let Some(v) = args.number {
        draft = draft.with_number(v);
    }
    if let Some(v) = args.duration {
        draft = draft.with_duration(v);
    }
    if let Some(text) = &args.text {
        draft = draft.with_text(text.clone());
    }
    if let Some(notes) = &args.notes {
        draft = draft.with_notes(notes.clone());
    }

    match &args.edit {
        Some(entry_id) => {
            app.engine.update_entry(entry_id, &draft)?;
            app.persist()?;
            if !cli.quiet {
                println!("Updated entry {}", entry_id);
            }
        }
        None => {
            let id = app.engine.save_entry(&draft)?;
            app.persist()?;
            if !cli.quiet {
                println!("Logged {} entry {}", tracker.name, id);
            }
        }
    }
    Ok(())
}

pub fn handle_rm(cli: &Cli, entry_id: &str) -> anyhow::Result<()> {
    let app = App::open(cli)?;
    if !app.engine.entries().iter().any(|e| e.id == entry_id) {
        anyhow::bail!(
            "Entry \"{}\" not found. Run `lifetrack entries list` to see entries.",
            entry_id
        );
    }
    app.engine.delete_entry(entry_id)?;
    app.persist()?;

    if !cli.quiet {
        println!("Deleted entry {}", entry_id);
    }
    Ok(())
}

pub fn handle_list(cli: &Cli, limit: usize, format: &str) -> anyhow::Result<()> {
    let format = parse_output_format(format)?;
    let app = App::open(cli)?;
    let trackers = app.engine.trackers();
    let entries = app.engine.entries();
    let entries = &entries[..entries.len().min(limit)];

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = entries.iter().map(|e| entry_json(e, &trackers)).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                if !cli.quiet {
                    println!("No entries yet.");
                }
                return Ok(());
            }
            for entry in entries {
                println!("{}", entry_line(entry, &trackers));
            }
        }
    }
    Ok(())
}

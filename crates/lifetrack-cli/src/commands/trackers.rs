use lifetrack_core::NewTracker;

use crate::app::App;
use crate::cli::{Cli, TrackerAddArgs};
use crate::helpers::{parse_kind, parse_output_format, resolve_tracker_arg, OutputFormat};
use crate::output::{tracker_json, tracker_line};

pub fn handle_add(cli: &Cli, args: &TrackerAddArgs) -> anyhow::Result<()> {
    let kinds = args
        .kinds
        .iter()
        .map(|raw| parse_kind(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut draft = NewTracker::new(args.name.clone(), kinds);
    if let Some(icon) = &args.icon {
        draft = draft.with_icon(icon.clone());
    }
    if let Some(color) = args.color {
        draft = draft.with_color_index(color);
    }

    let app = App::open(cli)?;
    let id = app.engine.save_tracker(&draft)?;
    app.persist()?;

    if !cli.quiet {
        println!("Created tracker {}", id);
    }
    Ok(())
}

pub fn handle_list(cli: &Cli, format: &str) -> anyhow::Result<()> {
    let format = parse_output_format(format)?;
    let app = App::open(cli)?;
    let trackers = app.engine.trackers();

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = trackers.iter().map(tracker_json).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if trackers.is_empty() {
                if !cli.quiet {
                    println!("No trackers defined.");
                }
                return Ok(());
            }
            for tracker in &trackers {
                println!("{}", tracker_line(tracker));
            }
        }
    }
    Ok(())
}

pub fn handle_rm(cli: &Cli, needle: &str) -> anyhow::Result<()> {
    let app = App::open(cli)?;
    let tracker = resolve_tracker_arg(&app.engine, needle)?;
    app.engine.delete_tracker(&tracker.id)?;
    app.persist()?;

    if !cli.quiet {
        println!("Deleted tracker {} (entries remain)", tracker.name);
    }
    Ok(())
}

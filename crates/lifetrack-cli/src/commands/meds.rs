use lifetrack_core::NewMedication;

use crate::app::App;
use crate::cli::{Cli, MedAddArgs};
use crate::helpers::{day_or_today, parse_output_format, resolve_medication_arg, OutputFormat};
use crate::output::{medication_json, medication_line};

pub fn handle_add(cli: &Cli, args: &MedAddArgs) -> anyhow::Result<()> {
    let draft = NewMedication::new(args.name.clone(), args.dosage.clone())
        .with_frequency(args.frequency.clone())
        .with_times(args.times.clone());

    let app = App::open(cli)?;
    let id = app.engine.save_medication(&draft)?;
    app.persist()?;

    if !cli.quiet {
        println!("Added medication {}", id);
    }
    Ok(())
}

pub fn handle_list(cli: &Cli, format: &str) -> anyhow::Result<()> {
    let format = parse_output_format(format)?;
    let app = App::open(cli)?;
    let medications = app.engine.medications();

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = medications.iter().map(medication_json).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if medications.is_empty() {
                if !cli.quiet {
                    println!("No medications added yet.");
                }
                return Ok(());
            }
            for medication in &medications {
                println!("{}", medication_line(medication));
            }
        }
    }
    Ok(())
}

pub fn handle_rm(cli: &Cli, needle: &str) -> anyhow::Result<()> {
    let app = App::open(cli)?;
    let medication = resolve_medication_arg(&app.engine, needle)?;
    app.engine.delete_medication(&medication.id)?;
    app.persist()?;

    if !cli.quiet {
        println!("Deleted medication {}", medication.name);
    }
    Ok(())
}

pub fn handle_toggle(
    cli: &Cli,
    needle: &str,
    time: &str,
    date: Option<&str>,
) -> anyhow::Result<()> {
    let day = day_or_today(date)?;
    let app = App::open(cli)?;
    let medication = resolve_medication_arg(&app.engine, needle)?;
    if !medication.times.iter().any(|t| t == time) {
        anyhow::bail!(
            "{} has no {} dose (scheduled: {})",
            medication.name,
            time,
            medication.times.join(", ")
        );
    }

    app.engine.toggle_taken(&medication.id, time, day)?;
    app.persist()?;

    if !cli.quiet {
        let taken = app
            .engine
            .todays_schedule(day)
            .into_iter()
            .any(|dose| dose.medication.id == medication.id && dose.scheduled_time == time && dose.taken);
        let state = if taken { "taken" } else { "not taken" };
        println!("{} {} on {} marked {}", medication.name, time, day, state);
    }
    Ok(())
}

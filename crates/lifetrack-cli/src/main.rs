//! LifeTrack CLI - record health observations against user-defined
//! trackers, manage medication schedules, and view weekly trends.
//!
//! This is the command-line interface for LifeTrack. It is a thin
//! presentation layer over `lifetrack-core`: every command opens the
//! synchronized collections, issues at most one mutation intent, and
//! renders the resulting views.

mod app;
mod cli;
mod commands;
mod config;
mod helpers;
mod output;

use clap::Parser;

use cli::{Cli, Commands, EntriesCommands, MedCommands, TrackerCommands};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { user } => commands::init::handle_init(&cli, user.as_deref()),
        Commands::Tracker { command } => match command {
            TrackerCommands::Add(args) => commands::trackers::handle_add(&cli, args),
            TrackerCommands::List { format } => commands::trackers::handle_list(&cli, format),
            TrackerCommands::Rm { tracker } => commands::trackers::handle_rm(&cli, tracker),
        },
        Commands::Log(args) => commands::entries::handle_log(&cli, args),
        Commands::Entries { command } => match command {
            EntriesCommands::List { limit, format } => {
                commands::entries::handle_list(&cli, *limit, format)
            }
            EntriesCommands::Rm { entry } => commands::entries::handle_rm(&cli, entry),
        },
        Commands::Med { command } => match command {
            MedCommands::Add(args) => commands::meds::handle_add(&cli, args),
            MedCommands::List { format } => commands::meds::handle_list(&cli, format),
            MedCommands::Rm { medication } => commands::meds::handle_rm(&cli, medication),
            MedCommands::Toggle {
                medication,
                time,
                date,
            } => commands::meds::handle_toggle(&cli, medication, time, date.as_deref()),
        },
        Commands::Schedule { date, format } => {
            commands::schedule::handle_schedule(&cli, date.as_deref(), format)
        }
        Commands::Report { now, format } => {
            commands::report::handle_report(&cli, now.as_deref(), format)
        }
    }
}

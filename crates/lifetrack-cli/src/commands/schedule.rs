use crate::app::App;
use crate::cli::Cli;
use crate::helpers::{day_or_today, parse_output_format, OutputFormat};
use crate::output::{dose_json, dose_line};

pub fn handle_schedule(cli: &Cli, date: Option<&str>, format: &str) -> anyhow::Result<()> {
    let format = parse_output_format(format)?;
    let day = day_or_today(date)?;
    let app = App::open(cli)?;
    let schedule = app.engine.todays_schedule(day);

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = schedule.iter().map(dose_json).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if schedule.is_empty() {
                if !cli.quiet {
                    println!("No medications scheduled for {}.", day);
                }
                return Ok(());
            }
            for dose in &schedule {
                println!("{}", dose_line(dose));
            }
        }
    }
    Ok(())
}

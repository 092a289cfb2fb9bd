use crate::app::App;
use crate::cli::Cli;
use crate::helpers::{parse_output_format, reference_time_or_now, OutputFormat};
use crate::output::{report_json, report_line};

pub fn handle_report(cli: &Cli, now: Option<&str>, format: &str) -> anyhow::Result<()> {
    let format = parse_output_format(format)?;
    let now = reference_time_or_now(now)?;
    let app = App::open(cli)?;
    let report = app.engine.weekly_report(now);

    match format {
        OutputFormat::Json => {
            let json: Vec<_> = report.iter().map(report_json).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if report.is_empty() {
                if !cli.quiet {
                    println!("No trackers to report on.");
                }
                return Ok(());
            }
            for bucket in &report {
                println!("{}", report_line(bucket));
            }
        }
    }
    Ok(())
}

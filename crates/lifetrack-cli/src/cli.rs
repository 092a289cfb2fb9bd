use clap::{Args, Parser, Subcommand};

use lifetrack_core::VERSION;

/// LifeTrack - personal health tracking from the command line
#[derive(Parser)]
#[command(name = "lifetrack")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, env = "LIFETRACK_CONFIG")]
    pub config: Option<String>,

    /// Path to the data file (overrides config)
    #[arg(short, long, global = true, env = "LIFETRACK_DATA")]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize config and data file with a fresh identity
    Init {
        /// Identity to bind instead of a generated one
        #[arg(long)]
        user: Option<String>,
    },

    /// Manage trackers
    Tracker {
        #[command(subcommand)]
        command: TrackerCommands,
    },

    /// Record an entry against a tracker
    Log(LogArgs),

    /// Inspect or delete recorded entries
    Entries {
        #[command(subcommand)]
        command: EntriesCommands,
    },

    /// Manage medications and adherence
    Med {
        #[command(subcommand)]
        command: MedCommands,
    },

    /// Show the dosage checklist for a day
    Schedule {
        /// Day to expand (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the weekly summary per tracker
    Report {
        /// Reference time (ISO-8601, default now)
        #[arg(long)]
        now: Option<String>,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum EntriesCommands {
    /// List entries, newest first
    List {
        /// Maximum number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete an entry
    Rm {
        /// Entry id (see `lifetrack entries list`)
        entry: String,
    },
}

#[derive(Subcommand)]
pub enum TrackerCommands {
    /// Create a tracker
    Add(TrackerAddArgs),

    /// List trackers
    List {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a tracker (its entries remain)
    Rm {
        /// Tracker name or id
        tracker: String,
    },
}

/// Arguments for `tracker add`
#[derive(Args)]
pub struct TrackerAddArgs {
    /// Display name
    pub name: String,

    /// Field kind (repeatable): scale5, scale10, number, boolean, duration, text
    #[arg(short = 'k', long = "kind", value_name = "KIND", required = true)]
    pub kinds: Vec<String>,

    /// Icon name (presentation-only)
    #[arg(long)]
    pub icon: Option<String>,

    /// Color palette index (presentation-only)
    #[arg(long)]
    pub color: Option<u32>,
}

/// Arguments for `log`
#[derive(Args)]
pub struct LogArgs {
    /// Tracker name or id
    pub tracker: String,

    /// Replace an existing entry instead of creating one
    #[arg(long, value_name = "ENTRY_ID")]
    pub edit: Option<String>,

    /// 1-5 rating
    #[arg(long)]
    pub scale5: Option<u8>,

    /// 1-10 rating
    #[arg(long)]
    pub scale10: Option<u8>,

    /// Numeric value (weight, water, steps, ...)
    #[arg(long)]
    pub number: Option<f64>,

    /// Yes/no observation
    #[arg(long, value_name = "yes|no")]
    pub done: Option<String>,

    /// Duration in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Free-text note
    #[arg(long)]
    pub text: Option<String>,

    /// Additional notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Entry date-time (ISO-8601, default now)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Subcommand)]
pub enum MedCommands {
    /// Add a medication schedule
    Add(MedAddArgs),

    /// List medications
    List {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a medication
    Rm {
        /// Medication name or id
        medication: String,
    },

    /// Toggle a dose between taken and not taken
    Toggle {
        /// Medication name or id
        medication: String,

        /// Scheduled time slot (HH:MM)
        time: String,

        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
}

/// Arguments for `med add`
#[derive(Args)]
pub struct MedAddArgs {
    /// Medication name
    pub name: String,

    /// Dosage label (e.g., 10mg)
    #[arg(long, default_value = "")]
    pub dosage: String,

    /// Frequency label (informational only)
    #[arg(long, default_value = "Daily")]
    pub frequency: String,

    /// Scheduled time (repeatable, HH:MM)
    #[arg(short = 't', long = "time", value_name = "HH:MM", required = true)]
    pub times: Vec<String>,
}

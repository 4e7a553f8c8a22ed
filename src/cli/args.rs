use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "waqt", version, author, about = "Prayer times with a live countdown to the next prayer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// First-run setup wizard (location, method, madhab, language, theme)
    Setup {
        /// Reset existing configuration
        #[arg(long)]
        reset: bool,
    },
    /// Show a day's prayer times with current and upcoming marked
    Times {
        /// Day to show (YYYY-MM-DD); defaults to today at the location
        #[arg(long)]
        date: Option<String>,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Show only the upcoming prayer and the time left
    Next {
        /// Include seconds in the countdown
        #[arg(long)]
        seconds: bool,
    },
    /// Show a month of prayer times
    Month {
        /// Month number (1-12); defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        /// Year; defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Cache prayer times from a saved JSON response
    Import {
        /// Path to the JSON file
        file: PathBuf,
        /// Shape of the response
        #[arg(long, value_enum, default_value_t = ImportFormat::Aladhan)]
        format: ImportFormat,
    },
    /// Switch to a popular location
    Location {
        /// Preset slug or city name (e.g. kazan, "new york")
        preset: Option<String>,
        /// List the available presets
        #[arg(long)]
        list: bool,
    },
    /// Change a setting: language, theme, countdown, clock, method, madhab, hijri-offset, timezone
    Set {
        key: String,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportFormat {
    /// Public prayer-times API, daily or calendar response
    Aladhan,
    /// Local prayer service response
    Service,
}

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::models::{PeriodGranularity, RegressionTarget};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Fuel fill-up insights: MPG, cost per mile and trends from a CSV log
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fuel-insights",
    about = "Fuel fill-up insights: MPG, cost per mile and trends from a CSV log",
    version
)]
pub struct Settings {
    /// Fill-up CSV (columns: date, miles, dollars, gallons, tank%_used)
    #[arg(long, env = "FUEL_DATA_FILE")]
    pub data: Option<PathBuf>,

    /// Period used to bucket the insight table
    #[arg(long, value_enum, default_value_t = PeriodGranularity::Monthly)]
    pub period: PeriodGranularity,

    /// Moving-average window (number of fill-ups)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..=365))]
    pub window: u16,

    /// Number of most recent fill-ups to list
    #[arg(long, default_value_t = 10)]
    pub recent: usize,

    /// Metric regressed against miles driven per fill-up
    #[arg(long, value_enum, default_value_t = RegressionTarget::CostPerMile)]
    pub regression: RegressionTarget,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    Text,
    /// One pretty-printed JSON document.
    Json,
}

impl Settings {
    /// Parse settings from an explicit argument list (first item is the
    /// program name) and apply `--debug`.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::resolve)
    }

    /// Parse settings from the process arguments, exiting on `--help` or
    /// invalid input.
    pub fn load() -> Self {
        Self::resolve(Self::parse())
    }

    /// Effective log level after `--debug` is taken into account.
    pub fn effective_log_level(&self) -> &str {
        &self.log_level
    }

    fn resolve(mut settings: Settings) -> Settings {
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

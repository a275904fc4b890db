use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name looked up when `--data` is not given.
pub const DEFAULT_DATA_FILE: &str = "fuel_data.csv";

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is one of the `--log-level` choices and is mapped to an
/// [`EnvFilter`] directive; `RUST_LOG` is ignored so the flag stays
/// authoritative. Output goes to stderr, leaving stdout for the report.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(tracing_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

/// Map a `--log-level` name to a tracing level directive.
fn tracing_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

// ── Data-file discovery ────────────────────────────────────────────────────────

/// Resolve the fill-up CSV to read.
///
/// An explicit path always wins, whether or not it exists (a missing file is
/// reported by the loader). Otherwise checks, in order:
/// 1. `./fuel_data.csv`
/// 2. `~/.fuel-insights/fuel_data.csv`
pub fn resolve_data_file(explicit: Option<&Path>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_data_file(explicit, &cwd, dirs::home_dir().as_deref())
}

fn find_data_file(explicit: Option<&Path>, cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let mut candidates = vec![cwd.join(DEFAULT_DATA_FILE)];
    if let Some(home) = home {
        candidates.push(home.join(".fuel-insights").join(DEFAULT_DATA_FILE));
    }
    candidates.into_iter().find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

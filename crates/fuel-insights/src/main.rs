mod bootstrap;
mod report;

use anyhow::{Context, Result};
use fuel_core::error::InsightsError;
use fuel_core::settings::{OutputFormat, Settings};
use fuel_data::analysis::{analyze_fillups, AnalysisOptions};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("Fuel Insights v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Period: {:?}, Window: {}, Regression: {:?}",
        settings.period,
        settings.window,
        settings.regression
    );

    let data_file = bootstrap::resolve_data_file(settings.data.as_deref()).ok_or_else(|| {
        InsightsError::Config(format!(
            "no fill-up CSV found; pass --data or create ./{}",
            bootstrap::DEFAULT_DATA_FILE
        ))
    })?;

    let options = AnalysisOptions {
        granularity: settings.period,
        window: usize::from(settings.window),
    };
    let analysis = analyze_fillups(&data_file, &options)
        .with_context(|| format!("Could not analyze {}", data_file.display()))?;

    // A degenerate regression should not hide the rest of the report.
    let regression = analysis.regression(settings.regression);
    if let Err(e) = &regression {
        tracing::warn!("Regression skipped: {e}");
    }

    match settings.format {
        OutputFormat::Text => {
            print!("{}", report::render_text(&analysis, settings.recent, &regression));
        }
        OutputFormat::Json => {
            let doc = report::JsonReport::new(&analysis, settings.recent, &regression);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    Ok(())
}

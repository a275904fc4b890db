//! Analysis pipeline for fuel insights.
//!
//! Loads the fill-up log once, derives the period table, the overall
//! summary and the moving averages, and returns a [`FuelAnalysis`] snapshot
//! that presentation layers share by reference. Regressions are run on
//! demand against that snapshot.

use std::path::Path;

use chrono::Utc;
use fuel_core::calculations::{fit_linear_regression, moving_average};
use fuel_core::error::Result;
use fuel_core::models::{
    FillupLog, FillupRecord, PeriodGranularity, PeriodInsight, RegressionResult, RegressionTarget,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::InsightAggregator;
use crate::reader::load_records_from_path;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for [`analyze_fillups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Bucket size of the insight table.
    pub granularity: PeriodGranularity,
    /// Moving-average window, in fill-ups.
    pub window: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            granularity: PeriodGranularity::Monthly,
            window: 5,
        }
    }
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Where the records came from.
    pub source: String,
    /// Number of fill-ups loaded.
    pub records_loaded: usize,
    /// Number of non-empty period buckets.
    pub periods_created: usize,
    /// Wall-clock seconds spent reading the CSV.
    pub load_time_seconds: f64,
}

/// Trailing moving averages of per-fill-up metrics, aligned with the log.
#[derive(Debug, Clone, Serialize)]
pub struct MovingAverages {
    pub window: usize,
    pub mpg: Vec<Option<f64>>,
    pub gallon_cost: Vec<Option<f64>>,
}

/// A regression of one metric against miles driven per fill-up, with the
/// points it was fitted on.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionFit {
    pub target: RegressionTarget,
    /// Miles driven of the records where the target is defined.
    pub x: Vec<f64>,
    /// Target values, aligned with `x`.
    pub y: Vec<f64>,
    pub result: RegressionResult,
}

/// The complete output of [`analyze_fillups`].
#[derive(Debug, Clone, Serialize)]
pub struct FuelAnalysis {
    pub granularity: PeriodGranularity,
    pub records: FillupLog,
    pub insights: Vec<PeriodInsight>,
    pub overall: PeriodInsight,
    pub moving_averages: MovingAverages,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full analysis pipeline over the CSV at `path`.
///
/// 1. Load and derive the fill-up log.
/// 2. Bucket it into period insights plus an overall insight.
/// 3. Compute moving averages of MPG and gallon cost.
pub fn analyze_fillups(path: &Path, options: &AnalysisOptions) -> Result<FuelAnalysis> {
    let load_start = std::time::Instant::now();
    let log = load_records_from_path(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let analysis = FuelAnalysis::from_log(log, options, path.display().to_string(), load_time)?;
    info!(
        "Analyzed {} fill-ups into {} periods",
        analysis.metadata.records_loaded, analysis.metadata.periods_created
    );
    Ok(analysis)
}

/// Fit `target` against miles driven over every record where both are
/// defined. The baseline record never contributes.
pub fn regress_against_miles_driven(
    records: &[FillupRecord],
    target: RegressionTarget,
) -> Result<RegressionFit> {
    let (x, y): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| Some((r.miles_driven?, target.value(r)?)))
        .unzip();

    let result = fit_linear_regression(&x, &y)?;
    debug!(
        "Regression of {:?} over {} points: slope={}, r2={}",
        target,
        x.len(),
        result.slope,
        result.r_squared
    );

    Ok(RegressionFit {
        target,
        x,
        y,
        result,
    })
}

impl FuelAnalysis {
    /// Build the analysis from an already loaded log.
    pub fn from_log(
        log: FillupLog,
        options: &AnalysisOptions,
        source: String,
        load_time_seconds: f64,
    ) -> Result<Self> {
        let insights = InsightAggregator::aggregate(log.records(), options.granularity)?;
        let overall = InsightAggregator::overall(log.records())?;

        let moving_averages = MovingAverages {
            window: options.window,
            mpg: moving_average(&log.mpg_series(), options.window)?,
            gallon_cost: moving_average(&log.gallon_cost_series(), options.window)?,
        };

        let metadata = AnalysisMetadata {
            generated_at: Utc::now().to_rfc3339(),
            source,
            records_loaded: log.len(),
            periods_created: insights.len(),
            load_time_seconds,
        };

        Ok(Self {
            granularity: options.granularity,
            records: log,
            insights,
            overall,
            moving_averages,
            metadata,
        })
    }

    /// The last `n` fill-ups, newest first.
    pub fn recent(&self, n: usize) -> Vec<&FillupRecord> {
        self.records.recent(n)
    }

    /// Regress `target` against miles driven for this log.
    pub fn regression(&self, target: RegressionTarget) -> Result<RegressionFit> {
        regress_against_miles_driven(self.records.records(), target)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Period bucketing of fill-up records.
//!
//! Records arrive date-ordered, so buckets are built in one linear pass by
//! grouping consecutive records that share a period label.

use chrono::NaiveDate;
use fuel_core::calculations::mean_defined;
use fuel_core::error::{InsightsError, Result};
use fuel_core::models::{FillupRecord, PeriodGranularity, PeriodInsight};
use tracing::debug;

/// Fewest records from which any per-record metric can be derived.
pub const MIN_RECORDS: usize = 2;

/// Label of the insight spanning every record.
pub const OVERALL_LABEL: &str = "All time";

// ── Public API ────────────────────────────────────────────────────────────────

/// Monthly insights, oldest month first.
///
/// Totals and averages only include records that have a baseline (the first
/// record of the log does not). `average_cost_per_mile_cents` is the mean of
/// per-record `dollars_per_mile` times 100, left unrounded; presentation
/// layers typically show it to two decimals.
///
/// Fails with [`InsightsError::EmptyInput`] for fewer than two records.
pub fn compute_period_insights(records: &[FillupRecord]) -> Result<Vec<PeriodInsight>> {
    InsightAggregator::aggregate(records, PeriodGranularity::Monthly)
}

/// One insight across the whole history, labelled [`OVERALL_LABEL`].
pub fn compute_overall_insight(records: &[FillupRecord]) -> Result<PeriodInsight> {
    InsightAggregator::overall(records)
}

// ── InsightAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups fill-up records by time period.
pub struct InsightAggregator;

impl InsightAggregator {
    /// Aggregate `records` with one of the built-in granularities.
    pub fn aggregate(
        records: &[FillupRecord],
        granularity: PeriodGranularity,
    ) -> Result<Vec<PeriodInsight>> {
        Self::aggregate_by_period(records, |date| granularity.label(date))
    }

    /// Aggregate `records` with an arbitrary bucket function.
    ///
    /// `label_fn` maps a record's date to its period label; consecutive
    /// records with equal labels form one bucket. Buckets with no
    /// contributing record are omitted.
    pub fn aggregate_by_period(
        records: &[FillupRecord],
        label_fn: impl Fn(NaiveDate) -> String,
    ) -> Result<Vec<PeriodInsight>> {
        ensure_enough(records)?;

        let mut insights = Vec::new();
        let mut current: Option<(String, Vec<&FillupRecord>)> = None;

        for record in records {
            let label = label_fn(record.date);
            match current.as_mut() {
                Some((open_label, members)) if *open_label == label => {
                    members.push(record);
                    continue;
                }
                _ => {}
            }
            if let Some((done_label, members)) = current.replace((label, vec![record])) {
                insights.extend(summarize(done_label, &members));
            }
        }
        if let Some((done_label, members)) = current {
            insights.extend(summarize(done_label, &members));
        }

        debug!(
            "Aggregated {} records into {} periods",
            records.len(),
            insights.len()
        );
        Ok(insights)
    }

    /// Summarize every record into a single insight.
    pub fn overall(records: &[FillupRecord]) -> Result<PeriodInsight> {
        ensure_enough(records)?;
        let members: Vec<&FillupRecord> = records.iter().collect();
        summarize(OVERALL_LABEL.to_string(), &members).ok_or(InsightsError::EmptyInput {
            required: MIN_RECORDS,
            found: records.len(),
        })
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

fn ensure_enough(records: &[FillupRecord]) -> Result<()> {
    if records.len() < MIN_RECORDS {
        return Err(InsightsError::EmptyInput {
            required: MIN_RECORDS,
            found: records.len(),
        });
    }
    Ok(())
}

/// Build the insight for one bucket, or `None` if no member has a baseline.
fn summarize(period_label: String, members: &[&FillupRecord]) -> Option<PeriodInsight> {
    let contributing: Vec<&FillupRecord> = members
        .iter()
        .copied()
        .filter(|r| r.has_baseline())
        .collect();
    if contributing.is_empty() {
        return None;
    }

    let total_miles: f64 = contributing.iter().filter_map(|r| r.miles_driven).sum();
    let total_dollars: f64 = contributing.iter().map(|r| r.dollars_spent).sum();
    let total_gallons: f64 = contributing.iter().map(|r| r.gallons_purchased).sum();

    // mpg is defined whenever miles_driven is, so these means always exist.
    let average_mpg = mean_defined(contributing.iter().map(|r| r.mpg))?;
    let average_gallon_cost = mean_defined(contributing.iter().map(|r| Some(r.gallon_cost)))?;

    let average_cost_per_mile_cents =
        mean_defined(contributing.iter().map(|r| r.dollars_per_mile)).map(|d| d * 100.0);
    let average_miles_per_day = mean_defined(contributing.iter().map(|r| r.miles_per_day));

    Some(PeriodInsight {
        period_label,
        fillup_count: contributing.len(),
        total_miles,
        total_dollars,
        total_gallons,
        average_mpg,
        average_gallon_cost,
        average_cost_per_mile_cents,
        average_miles_per_day,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

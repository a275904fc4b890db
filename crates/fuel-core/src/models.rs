use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One row of the fill-up source exactly as read, before any derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFillup {
    /// Calendar date of the fill-up.
    pub date: NaiveDate,
    /// Cumulative odometer reading.
    pub odometer_miles: f64,
    /// Amount paid in dollars.
    pub dollars_spent: f64,
    /// Volume purchased in gallons (always > 0 once validated).
    pub gallons_purchased: f64,
    /// Fraction of the tank that was used since the previous fill-up, in (0, 1].
    pub tank_percent_used: f64,
}

/// A single fueling event with its derived per-fill-up metrics.
///
/// The metrics that need a previous fill-up as baseline are `None` for the
/// first record of a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillupRecord {
    pub date: NaiveDate,
    pub odometer_miles: f64,
    pub dollars_spent: f64,
    pub gallons_purchased: f64,
    pub tank_percent_used: f64,
    /// Odometer delta against the previous fill-up.
    pub miles_driven: Option<f64>,
    /// `miles_driven / gallons_purchased`.
    pub mpg: Option<f64>,
    /// `dollars_spent / gallons_purchased`.
    pub gallon_cost: f64,
    /// `dollars_spent / miles_driven`; `None` when no miles were driven.
    pub dollars_per_mile: Option<f64>,
    /// `miles_driven` divided by the days since the previous fill-up;
    /// `None` for same-day fill-ups.
    pub miles_per_day: Option<f64>,
}

impl FillupRecord {
    /// Derive a record from `raw`, using `previous` as the baseline.
    pub fn derive(raw: &RawFillup, previous: Option<&RawFillup>) -> Self {
        let gallon_cost = raw.dollars_spent / raw.gallons_purchased;

        let (miles_driven, mpg, dollars_per_mile, miles_per_day) = match previous {
            None => (None, None, None, None),
            Some(prev) => {
                let miles = raw.odometer_miles - prev.odometer_miles;
                let days = (raw.date - prev.date).num_days();
                let dollars_per_mile = (miles != 0.0).then(|| raw.dollars_spent / miles);
                let miles_per_day = (days > 0).then(|| miles / days as f64);
                (
                    Some(miles),
                    Some(miles / raw.gallons_purchased),
                    dollars_per_mile,
                    miles_per_day,
                )
            }
        };

        Self {
            date: raw.date,
            odometer_miles: raw.odometer_miles,
            dollars_spent: raw.dollars_spent,
            gallons_purchased: raw.gallons_purchased,
            tank_percent_used: raw.tank_percent_used,
            miles_driven,
            mpg,
            gallon_cost,
            dollars_per_mile,
            miles_per_day,
        }
    }

    /// Whether this record has a baseline and therefore contributes to
    /// per-record metric aggregation.
    pub fn has_baseline(&self) -> bool {
        self.miles_driven.is_some()
    }

    /// Cost to drive one mile, in cents.
    pub fn cents_per_mile(&self) -> Option<f64> {
        self.dollars_per_mile.map(|d| d * 100.0)
    }
}

// ── FillupLog ─────────────────────────────────────────────────────────────────

/// The full, date-ordered history of fill-ups.
///
/// Built once from raw rows and never mutated afterwards; consumers only get
/// shared slices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FillupLog {
    records: Vec<FillupRecord>,
}

impl FillupLog {
    /// Sort `rows` ascending by date (stable on ties) and derive every record
    /// against its immediate predecessor.
    pub fn from_raw(mut rows: Vec<RawFillup>) -> Self {
        rows.sort_by_key(|r| r.date);

        let mut records = Vec::with_capacity(rows.len());
        let mut previous: Option<&RawFillup> = None;
        for raw in &rows {
            if let Some(prev) = previous {
                if raw.odometer_miles < prev.odometer_miles {
                    warn!(
                        "Odometer went backwards on {}: {} -> {}",
                        raw.date, prev.odometer_miles, raw.odometer_miles
                    );
                }
                if raw.date == prev.date {
                    warn!("Multiple fill-ups on {}; miles per day left undefined", raw.date);
                }
            }
            records.push(FillupRecord::derive(raw, previous));
            previous = Some(raw);
        }

        Self { records }
    }

    pub fn records(&self) -> &[FillupRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` fill-ups, newest first.
    pub fn recent(&self, n: usize) -> Vec<&FillupRecord> {
        self.records.iter().rev().take(n).collect()
    }

    /// Per-record MPG in date order.
    pub fn mpg_series(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.mpg).collect()
    }

    /// Per-record gallon cost in date order.
    pub fn gallon_cost_series(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| Some(r.gallon_cost)).collect()
    }
}

// ── PeriodInsight ─────────────────────────────────────────────────────────────

/// Aggregate figures for one period bucket.
///
/// Totals and averages only cover records that have a baseline. Averages are
/// means of the per-record values (so `average_mpg` is *not*
/// `total_miles / total_gallons`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInsight {
    /// Bucket label, e.g. `"Jan 2023"`.
    pub period_label: String,
    /// Number of records that contributed.
    pub fillup_count: usize,
    pub total_miles: f64,
    pub total_dollars: f64,
    pub total_gallons: f64,
    pub average_mpg: f64,
    pub average_gallon_cost: f64,
    /// Mean of per-record `dollars_per_mile`, times 100. Unrounded.
    pub average_cost_per_mile_cents: Option<f64>,
    pub average_miles_per_day: Option<f64>,
}

// ── Period granularity ────────────────────────────────────────────────────────

/// Built-in period bucket functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGranularity {
    /// Calendar month, labelled `"Jan 2023"`.
    #[default]
    Monthly,
    /// Calendar quarter, labelled `"Q1 2023"`.
    Quarterly,
    /// Calendar year, labelled `"2023"`.
    Yearly,
}

impl PeriodGranularity {
    /// Label of the bucket `date` falls into.
    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Monthly => date.format("%b %Y").to_string(),
            Self::Quarterly => format!("Q{} {}", date.month0() / 3 + 1, date.year()),
            Self::Yearly => date.year().to_string(),
        }
    }
}

// ── Regression ────────────────────────────────────────────────────────────────

/// Ordinary-least-squares fit of `y = slope * x + intercept`.
///
/// All values are full precision; rounding is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// `slope * x[i] + intercept`, same order as the input.
    pub predicted_values: Vec<f64>,
    pub root_mean_squared_error: f64,
    pub r_squared: f64,
}

/// Which per-record metric is regressed against miles driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RegressionTarget {
    /// Miles per gallon.
    Mpg,
    /// Cost to drive one mile, in cents.
    #[default]
    CostPerMile,
}

impl RegressionTarget {
    /// Value of this metric for `record`, if defined.
    pub fn value(self, record: &FillupRecord) -> Option<f64> {
        match self {
            Self::Mpg => record.mpg,
            Self::CostPerMile => record.cents_per_mile(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mpg => "Miles Per Gallon",
            Self::CostPerMile => "Cost To Drive One Mile (in cents)",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

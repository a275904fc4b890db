//! Terminal and JSON rendering of a [`FuelAnalysis`].
//!
//! All rounding and currency formatting happens here; the analysis itself
//! carries full-precision numbers.

use fuel_core::formatting::{
    format_cents_as_dollars, format_currency, format_number, format_optional, format_percent,
    round_to,
};
use fuel_core::models::{FillupRecord, PeriodInsight, RegressionTarget};
use fuel_data::analysis::{FuelAnalysis, RegressionFit};
use serde::Serialize;

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Everything the JSON output contains.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub analysis: &'a FuelAnalysis,
    pub recent: Vec<&'a FillupRecord>,
    pub regression: Option<&'a RegressionFit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regression_error: Option<String>,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        analysis: &'a FuelAnalysis,
        recent: usize,
        regression: &'a Result<RegressionFit, fuel_core::error::InsightsError>,
    ) -> Self {
        Self {
            analysis,
            recent: analysis.recent(recent),
            regression: regression.as_ref().ok(),
            regression_error: regression.as_ref().err().map(|e| e.to_string()),
        }
    }
}

// ── Text ──────────────────────────────────────────────────────────────────────

/// Render the full text report.
pub fn render_text(
    analysis: &FuelAnalysis,
    recent: usize,
    regression: &Result<RegressionFit, fuel_core::error::InsightsError>,
) -> String {
    let mut out = String::new();

    out.push_str(&section("Gas Insights"));
    out.push_str(&insight_table(&analysis.insights, &analysis.overall));

    out.push('\n');
    out.push_str(&section(&format!("Last {recent} Fillups")));
    out.push_str(&recent_table(&analysis.recent(recent)));

    out.push('\n');
    out.push_str(&section(&format!(
        "Moving Averages (n={})",
        analysis.moving_averages.window
    )));
    let latest_mpg = last_defined(&analysis.moving_averages.mpg);
    let latest_cost = last_defined(&analysis.moving_averages.gallon_cost);
    out.push_str(&format!(
        "Miles Per Gallon: {}\nGallon Cost: {}\n",
        format_optional(latest_mpg, |v| format_number(v, 2)),
        format_optional(latest_cost, format_currency),
    ));

    out.push('\n');
    out.push_str(&section("Regression"));
    match regression {
        Ok(fit) => out.push_str(&regression_summary(fit, &analysis.overall)),
        Err(e) => out.push_str(&format!("Regression unavailable: {e}\n")),
    }

    out
}

fn section(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

fn insight_table(insights: &[PeriodInsight], overall: &PeriodInsight) -> String {
    let headers = [
        "Time period",
        "Fill-ups",
        "Miles",
        "Dollars",
        "Gallons",
        "MPG",
        "Avg gallon cost",
        "Cost to go one mile",
        "Average miles per day",
    ];
    let rows = insights
        .iter()
        .chain(std::iter::once(overall))
        .map(|i| {
            vec![
                i.period_label.clone(),
                i.fillup_count.to_string(),
                format_number(i.total_miles, 0),
                format_currency(i.total_dollars),
                format_number(i.total_gallons, 2),
                format_number(i.average_mpg, 2),
                format_currency(i.average_gallon_cost),
                format_optional(i.average_cost_per_mile_cents, format_cents_as_dollars),
                format_optional(i.average_miles_per_day, |v| format_number(v, 2)),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

fn recent_table(records: &[&FillupRecord]) -> String {
    let headers = [
        "Date",
        "Miles",
        "Dollars",
        "Gallons",
        "MPG",
        "Gallon cost",
        "Tank % Used",
        "Cost to go one mile",
        "Average miles per day",
    ];
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.date.format("%b %d %Y").to_string(),
                format_optional(r.miles_driven, |v| format_number(v, 0)),
                format_currency(r.dollars_spent),
                format_number(r.gallons_purchased, 2),
                format_optional(r.mpg, |v| format_number(v, 2)),
                format_currency(r.gallon_cost),
                format_percent(r.tank_percent_used, 2),
                format_optional(r.dollars_per_mile, format_currency),
                format_optional(r.miles_per_day, |v| format_number(v, 2)),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

fn regression_summary(fit: &RegressionFit, overall: &PeriodInsight) -> String {
    let r = &fit.result;
    let mut out = format!(
        "Miles Driven vs. {} ({} points)\n\
         y = {}x + {}\n\
         r^2 = {}\n\
         RMSE = {}\n",
        fit.target.label(),
        fit.x.len(),
        round_to(r.slope, 3),
        round_to(r.intercept, 2),
        round_to(r.r_squared, 2),
        round_to(r.root_mean_squared_error, 2),
    );

    let annotation = match fit.target {
        RegressionTarget::Mpg => Some(format!(
            "On average, I get {} miles per gallon",
            format_number(overall.average_mpg, 2)
        )),
        RegressionTarget::CostPerMile => overall.average_cost_per_mile_cents.map(|c| {
            format!(
                "On average, it costs {} cents to drive one mile",
                format_number(c, 2)
            )
        }),
    };
    if let Some(line) = annotation {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn last_defined(values: &[Option<f64>]) -> Option<f64> {
    values.iter().rev().find_map(|v| *v)
}

/// Left-aligned, space-padded columns with a dashed rule under the header.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = format_line(headers.iter().copied(), &widths);
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
    out.push_str(&rule);
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

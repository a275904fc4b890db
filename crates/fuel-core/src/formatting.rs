//! Display helpers for presentation layers.
//!
//! The calculations never round; these helpers are the only place where
//! numbers turn into text.

/// Placeholder shown for undefined metrics.
pub const UNDEFINED: &str = "-";

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use fuel_core::formatting::format_number;
///
/// assert_eq!(format_number(10_300.0, 0), "10,300");
/// assert_eq!(format_number(1234.567, 2), "1,234.57");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // "-0.00" reads badly; only show the sign for non-zero output.
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format dollars with a `$` prefix, two decimals and thousands separators.
///
/// # Examples
///
/// ```
/// use fuel_core::formatting::format_currency;
///
/// assert_eq!(format_currency(3.1), "$3.10");
/// assert_eq!(format_currency(1234.5), "$1,234.50");
/// assert_eq!(format_currency(-9.99), "-$9.99");
/// ```
pub fn format_currency(amount: f64) -> String {
    let body = format_number(amount.abs(), 2);
    if amount < 0.0 && body != "0.00" {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

/// Format a cost expressed in cents as dollars, e.g. `10.67` → `"$0.11"`.
pub fn format_cents_as_dollars(cents: f64) -> String {
    format_currency(cents / 100.0)
}

/// Format a fraction as a percentage, e.g. `0.825` → `"82.50%"`.
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{}%", format_number(fraction * 100.0, decimals))
}

/// Apply `format` to a defined value, or return [`UNDEFINED`].
pub fn format_optional(value: Option<f64>, format: impl Fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| UNDEFINED.to_string())
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

// ── Tests ──────────────────────────────────────────────────────────────────────

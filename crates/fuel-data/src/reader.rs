//! CSV loading for fill-up records.
//!
//! Reads the flat fill-up table, validates every row and turns the result
//! into a date-ordered [`FillupLog`]. Any bad row fails the whole load: a
//! silently skipped fill-up would corrupt every derived total after it.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use fuel_core::error::{InsightsError, Result};
use fuel_core::models::{FillupLog, RawFillup};
use tracing::debug;

/// Column names the source must provide (case-insensitive).
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "miles", "dollars", "gallons", "tank%_used"];

/// Date layouts accepted in the `date` column, tried in order.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y", "%Y/%m/%d", "%b %d %Y"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Read fill-up rows from `source` and derive the ordered record log.
///
/// Fails with [`InsightsError::MalformedInput`] when a required column is
/// missing or appears twice, a numeric field is non-numeric or negative, `gallons` is zero,
/// `tank%_used` is outside `(0, 1]`, or a date cannot be parsed.
pub fn load_records<R: Read>(source: R) -> Result<FillupLog> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| InsightsError::MalformedInput(format!("failed to read CSV header: {e}")))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; lines are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| InsightsError::MalformedInput(format!("line {line}: {e}")))?;
        let row = columns
            .parse_row(&record)
            .map_err(|reason| InsightsError::MalformedInput(format!("line {line}: {reason}")))?;
        rows.push(row);
    }

    let log = FillupLog::from_raw(rows);
    debug!("Loaded {} fill-up records", log.len());
    Ok(log)
}

/// Open `path`, read it fully with [`load_records`], and close it.
pub fn load_records_from_path(path: &Path) -> Result<FillupLog> {
    let file = File::open(path).map_err(|source| InsightsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Reading fill-ups from {}", path.display());
    load_records(file)
}

/// Parse a calendar date in any of the accepted layouts.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Positions of the required columns within a header row.
struct ColumnIndex {
    date: usize,
    miles: usize,
    dollars: usize,
    gallons: usize,
    tank_used: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (idx, raw) in headers.iter().enumerate() {
            let name = normalize_header(raw);
            if by_name.contains_key(&name) && REQUIRED_COLUMNS.contains(&name.as_str()) {
                return Err(InsightsError::MalformedInput(format!(
                    "duplicate column `{name}`"
                )));
            }
            by_name.insert(name, idx);
        }

        let lookup = |name: &str| {
            by_name.get(name).copied().ok_or_else(|| {
                InsightsError::MalformedInput(format!("missing required column `{name}`"))
            })
        };

        let [date, miles, dollars, gallons, tank_used] = REQUIRED_COLUMNS.map(lookup);
        Ok(Self {
            date: date?,
            miles: miles?,
            dollars: dollars?,
            gallons: gallons?,
            tank_used: tank_used?,
        })
    }

    fn parse_row(&self, record: &StringRecord) -> std::result::Result<RawFillup, String> {
        let date_str = field(record, self.date, "date")?;
        let date = parse_date(date_str).ok_or_else(|| format!("invalid date '{date_str}'"))?;

        let odometer_miles = parse_non_negative(record, self.miles, "miles")?;
        let dollars_spent = parse_non_negative(record, self.dollars, "dollars")?;
        let gallons_purchased = parse_non_negative(record, self.gallons, "gallons")?;
        if gallons_purchased == 0.0 {
            return Err("`gallons` must be greater than zero".to_string());
        }
        let tank_percent_used = parse_non_negative(record, self.tank_used, "tank%_used")?;
        if tank_percent_used == 0.0 || tank_percent_used > 1.0 {
            return Err(format!(
                "`tank%_used` must be a fraction in (0, 1], got {tank_percent_used}"
            ));
        }

        Ok(RawFillup {
            date,
            odometer_miles,
            dollars_spent,
            gallons_purchased,
            tank_percent_used,
        })
    }
}

fn normalize_header(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn field<'a>(
    record: &'a StringRecord,
    idx: usize,
    name: &str,
) -> std::result::Result<&'a str, String> {
    record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for `{name}`"))
}

fn parse_non_negative(
    record: &StringRecord,
    idx: usize,
    name: &str,
) -> std::result::Result<f64, String> {
    let raw = field(record, idx, name)?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{name}` is not a number: '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("`{name}` must be finite, got '{raw}'"));
    }
    if value < 0.0 {
        return Err(format!("`{name}` must not be negative, got {value}"));
    }
    Ok(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "date,miles,dollars,gallons,tank%_used\n";

    fn load(body: &str) -> Result<FillupLog> {
        let csv = format!("{HEADER}{body}");
        load_records(csv.as_bytes())
    }

    fn assert_malformed(result: Result<FillupLog>, needle: &str) {
        match result {
            Err(InsightsError::MalformedInput(msg)) => {
                assert!(msg.contains(needle), "message '{msg}' lacks '{needle}'")
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    // ── load_records ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_sorts_and_derives() {
        let log = load(
            "2023-02-10,10600,31,10,0.9\n\
             2023-01-05,10000,30,10,0.8\n\
             2023-01-20,10300,32,10,0.85\n",
        )
        .unwrap();

        assert_eq!(log.len(), 3);
        let records = log.records();
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(records[0].miles_driven, None);
        assert_eq!(records[1].miles_driven, Some(300.0));
        assert_eq!(records[1].mpg, Some(30.0));
        assert_eq!(records[2].miles_driven, Some(300.0));
        assert_eq!(records[2].mpg, Some(30.0));
        assert!(records.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_load_header_only_is_empty() {
        let log = load("").unwrap();
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_ignores_extra_columns_and_header_case() {
        let csv = "\u{feff}Date, Miles ,Dollars,Gallons,TANK%_USED,notes\n\
                   2023-01-05,10000,30,10,0.8,first\n\
                   2023-01-20,10300,32,10,0.85,\n";
        let log = load_records(csv.as_bytes()).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1].miles_driven, Some(300.0));
    }

    #[test]
    fn test_load_missing_column() {
        let csv = "date,miles,dollars,tank%_used\n2023-01-05,10000,30,0.8\n";
        assert_malformed(load_records(csv.as_bytes()), "`gallons`");
    }

    #[test]
    fn test_load_duplicate_required_column() {
        let csv = "date,Miles,dollars,gallons,tank%_used, miles\n\
                   2023-01-05,10000,30,10,0.8,9000\n";
        assert_malformed(load_records(csv.as_bytes()), "duplicate column `miles`");
    }

    #[test]
    fn test_load_duplicate_extra_column_is_ignored() {
        let csv = "date,miles,dollars,gallons,tank%_used,notes,Notes\n\
                   2023-01-05,10000,30,10,0.8,a,b\n";
        assert_eq!(load_records(csv.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_load_zero_gallons() {
        assert_malformed(
            load("2023-01-05,10000,30,10,0.8\n2023-01-20,10300,32,0,0.85\n"),
            "line 3",
        );
    }

    #[test]
    fn test_load_negative_value() {
        assert_malformed(load("2023-01-05,10000,-30,10,0.8\n"), "must not be negative");
    }

    #[test]
    fn test_load_non_numeric_value() {
        assert_malformed(load("2023-01-05,ten,30,10,0.8\n"), "`miles` is not a number");
    }

    #[test]
    fn test_load_bad_date() {
        assert_malformed(load("not-a-date,10000,30,10,0.8\n"), "invalid date");
    }

    #[test]
    fn test_load_empty_value() {
        assert_malformed(load("2023-01-05,10000,,10,0.8\n"), "missing value for `dollars`");
    }

    #[test]
    fn test_load_tank_fraction_out_of_range() {
        assert_malformed(load("2023-01-05,10000,30,10,85\n"), "tank%_used");
        assert_malformed(load("2023-01-05,10000,30,10,0\n"), "tank%_used");
    }

    #[test]
    fn test_load_short_row() {
        assert_malformed(load("2023-01-05,10000,30\n"), "line 2");
    }

    // ── load_records_from_path ────────────────────────────────────────────────

    #[test]
    fn test_load_from_path() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(
            file,
            "{HEADER}01/05/2023,10000,30,10,0.8\n01/20/2023,10300,32,10,0.85\n"
        )
        .unwrap();

        let log = load_records_from_path(file.path()).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[1].miles_per_day, Some(20.0));
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = load_records_from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, InsightsError::FileRead { .. }));
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        for s in ["2023-01-05", "20230105", "01/05/2023", "1/5/2023", "2023/01/05", "Jan 05 2023"] {
            assert_eq!(parse_date(s), Some(expected), "format {s}");
        }
        assert_eq!(parse_date("05.01.2023"), None);
    }
}

// Cashflow loader
// First column is the activity name, every other column is one fiscal year

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CashflowRow {
    pub activity: String,
    /// One entry per year column, `None` when the cell was blank or not a number
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cashflow {
    pub years: Vec<String>,
    pub rows: Vec<CashflowRow>,
}

impl Cashflow {
    /// "2021 - 2025" style label built from the first and last year headers
    pub fn year_span(&self) -> String {
        match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) if first != last => format!("{} - {}", first, last),
            (Some(only), _) => only.clone(),
            _ => String::new(),
        }
    }

    /// Net cashflow per year; missing cells are skipped
    pub fn totals(&self) -> Vec<f64> {
        (0..self.years.len())
            .map(|i| {
                self.rows
                    .iter()
                    .filter_map(|row| row.values.get(i).copied().flatten())
                    .sum()
            })
            .collect()
    }
}

/// Lenient numeric parse: anything that isn't a plain finite number becomes missing
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn load_cashflow(path: &Path) -> Result<Cashflow> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open cashflow statement: {}", path.display()))?;

    read_cashflow(file)
        .with_context(|| format!("Failed to read cashflow statement: {}", path.display()))
}

pub fn read_cashflow<R: Read>(reader: R) -> Result<Cashflow> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    // Whatever the first header says, it is the activity column
    let years: Vec<String> = rdr
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .skip(1)
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV line {}", index + 2))?;

        let activity = record.get(0).unwrap_or("").trim();
        if activity.is_empty() {
            debug!(line = index + 2, "Dropping cashflow row without activity");
            continue;
        }

        let values: Vec<Option<f64>> = (1..=years.len())
            .map(|col| {
                let cell = record.get(col).unwrap_or("");
                let value = coerce_numeric(cell);
                if value.is_none() && !cell.trim().is_empty() {
                    warn!(activity, year = %years[col - 1], cell, "Non-numeric cashflow cell treated as missing");
                }
                value
            })
            .collect();

        rows.push(CashflowRow {
            activity: activity.to_string(),
            values,
        });
    }

    info!(years = years.len(), activities = rows.len(), "Loaded cashflow statement");

    Ok(Cashflow { years, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &[u8] = include_bytes!("../data/NTPC_CashFlow_2025.csv");

    #[rstest]
    #[case("46932", Some(46932.0))]
    #[case(" -38461 ", Some(-38461.0))]
    #[case("12.5", Some(12.5))]
    #[case("", None)]
    #[case("   ", None)]
    #[case("-", None)]
    #[case("1,234", None)]
    #[case("n/a", None)]
    #[case("NaN", None)]
    #[case("inf", None)]
    #[case("-infinity", None)]
    #[case("5e-324", Some(5e-324))]
    fn test_coerce_numeric(#[case] cell: &str, #[case] expected: Option<f64>) {
        assert_eq!(coerce_numeric(cell), expected);
    }

    #[test]
    fn test_sample_cashflow() {
        let cashflow = read_cashflow(SAMPLE).unwrap();

        assert_eq!(cashflow.years, ["2021", "2022", "2023", "2024", "2025"]);
        assert_eq!(cashflow.rows.len(), 3);
        assert_eq!(cashflow.rows[0].activity, "Operating Activities");
        assert_eq!(cashflow.rows[1].values[4], Some(-38461.0));
    }

    #[test]
    fn test_first_column_is_activity_whatever_its_header() {
        let csv = b"\
,FY24,FY25
Operating Activities,10,20
";
        let cashflow = read_cashflow(&csv[..]).unwrap();

        assert_eq!(cashflow.years, ["FY24", "FY25"]);
        assert_eq!(cashflow.rows[0].activity, "Operating Activities");
    }

    #[test]
    fn test_malformed_cells_become_missing() {
        let csv = b"\
Activity,2024,2025
Operating Activities,abc,20
Investing Activities,-5
";
        let cashflow = read_cashflow(&csv[..]).unwrap();

        assert_eq!(cashflow.rows[0].values, [None, Some(20.0)]);
        assert_eq!(cashflow.rows[1].values, [Some(-5.0), None]);
    }

    #[test]
    fn test_rows_without_activity_are_dropped() {
        let csv = b"\
Activity,2024
Operating Activities,10
,99
Financing Activities,-3
";
        let cashflow = read_cashflow(&csv[..]).unwrap();

        let names: Vec<_> = cashflow.rows.iter().map(|r| r.activity.as_str()).collect();
        assert_eq!(names, ["Operating Activities", "Financing Activities"]);
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let csv = b"\
Activity,2024
Operating Activities,10,11,12
";
        let cashflow = read_cashflow(&csv[..]).unwrap();

        assert_eq!(cashflow.rows[0].values, [Some(10.0)]);
    }

    #[test]
    fn test_year_span() {
        let cashflow = read_cashflow(SAMPLE).unwrap();
        assert_eq!(cashflow.year_span(), "2021 - 2025");

        let single = Cashflow {
            years: vec!["2025".to_string()],
            rows: vec![],
        };
        assert_eq!(single.year_span(), "2025");
        assert_eq!(Cashflow::default().year_span(), "");
    }

    #[test]
    fn test_totals_skip_missing_cells() {
        let csv = b"\
Activity,2024,2025
Operating Activities,10,20
Investing Activities,-4,x
";
        let cashflow = read_cashflow(&csv[..]).unwrap();

        assert_eq!(cashflow.totals(), [6.0, 20.0]);
    }
}

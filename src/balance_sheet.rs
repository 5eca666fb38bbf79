// Balance sheet loader
// Splits the side-by-side Asset/Amount | Liabilities/Amount layout into two tables

use crate::error::FilingError;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One line of the balance sheet after reshaping: a label and its amount
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

impl CategoryAmount {
    pub fn new(category: impl Into<String>, amount: f64) -> Self {
        CategoryAmount {
            category: category.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    pub assets: Vec<CategoryAmount>,
    pub liabilities: Vec<CategoryAmount>,
}

impl BalanceSheet {
    pub fn total_assets(&self) -> f64 {
        self.assets.iter().map(|a| a.amount).sum()
    }

    pub fn total_liabilities(&self) -> f64 {
        self.liabilities.iter().map(|l| l.amount).sum()
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Minimum layout: label + amount for assets, label + amount for liabilities
const MIN_COLUMNS: usize = 4;

pub fn load_balance_sheet(path: &Path) -> Result<BalanceSheet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open balance sheet: {}", path.display()))?;

    read_balance_sheet(file)
        .with_context(|| format!("Failed to read balance sheet: {}", path.display()))
}

/// Reads a balance sheet CSV.
///
/// Columns are picked by position: the first two hold assets, the last two
/// hold liabilities. Both amount headers are usually just "Amount", so
/// looking them up by name would return the asset column twice.
pub fn read_balance_sheet<R: Read>(reader: R) -> Result<BalanceSheet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let width = rdr.headers().context("Failed to read CSV header")?.len();
    if width < MIN_COLUMNS {
        return Err(FilingError::MissingColumns {
            table: "Balance sheet",
            expected: MIN_COLUMNS,
            found: width,
        }
        .into());
    }
    let (liability_col, liability_amount_col) = (width - 2, width - 1);

    let mut sheet = BalanceSheet::default();

    for (index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV line {}", index + 2))?;
        let line = record.position().map(|p| p.line()).unwrap_or(index as u64 + 2);

        if let Some(asset) = pick(&record, 0, 1, line)? {
            sheet.assets.push(asset);
        }
        if let Some(liability) = pick(&record, liability_col, liability_amount_col, line)? {
            sheet.liabilities.push(liability);
        }
    }

    info!(
        assets = sheet.assets.len(),
        liabilities = sheet.liabilities.len(),
        "Loaded balance sheet"
    );

    Ok(sheet)
}

/// Reads one label/amount pair; an empty label means "no row on this side"
fn pick(
    record: &csv::StringRecord,
    label_col: usize,
    amount_col: usize,
    line: u64,
) -> Result<Option<CategoryAmount>, FilingError> {
    let label = record.get(label_col).unwrap_or("").trim();
    if label.is_empty() {
        debug!(line, column = label_col, "Dropping row with empty category");
        return Ok(None);
    }

    let raw = record.get(amount_col).unwrap_or("").trim();
    let amount = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FilingError::InvalidAmount {
            category: label.to_string(),
            value: raw.to_string(),
            line,
        })?;

    Ok(Some(CategoryAmount::new(label, amount)))
}

// Console summary - indexed, column-aligned tables plus totals

use crate::balance_sheet::{BalanceSheet, CategoryAmount};
use crate::cashflow::Cashflow;
use std::fmt;
use std::io::{self, Write};

/// Plain text table with a leading row index, right-aligned columns
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn from_categories(items: &[CategoryAmount]) -> Self {
        TextTable {
            headers: vec!["Category".to_string(), "Amount".to_string()],
            rows: items
                .iter()
                .map(|item| vec![item.category.clone(), format_amount(Some(item.amount))])
                .collect(),
        }
    }

    pub fn from_cashflow(cashflow: &Cashflow) -> Self {
        let mut headers = vec!["Activity".to_string()];
        headers.extend(cashflow.years.iter().cloned());

        let rows = cashflow
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.activity.clone()];
                cells.extend(row.values.iter().map(|v| format_amount(*v)));
                cells
            })
            .collect();

        TextTable { headers, rows }
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths = self.column_widths();

        write!(f, "{:index_width$}", "")?;
        for (header, &width) in self.headers.iter().zip(&widths) {
            write!(f, "  {:>width$}", header)?;
        }
        writeln!(f)?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{:<index_width$}", i)?;
            for (col, &width) in widths.iter().enumerate() {
                write!(f, "  {:>width$}", row.get(col).map(String::as_str).unwrap_or(""))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Missing cells print as `NaN`, everything else in shortest form
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "NaN".to_string(),
    }
}

/// "2024: -12, 2025: 0" - one net total per year column
fn net_cashflow_line(cashflow: &Cashflow) -> String {
    cashflow
        .years
        .iter()
        .zip(cashflow.totals())
        .map(|(year, total)| format!("{}: {}", year, format_amount(Some(total))))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn write_summary<W: Write>(
    mut out: W,
    sheet: &BalanceSheet,
    cashflow: &Cashflow,
) -> io::Result<()> {
    writeln!(out, "Assets:")?;
    write!(out, "{}", TextTable::from_categories(&sheet.assets))?;
    writeln!(out, "\nTotal Assets: {}", format_amount(Some(sheet.total_assets())))?;

    writeln!(out, "\nLiabilities:")?;
    write!(out, "{}", TextTable::from_categories(&sheet.liabilities))?;
    writeln!(
        out,
        "\nTotal Liabilities: {}",
        format_amount(Some(sheet.total_liabilities()))
    )?;

    writeln!(out, "\nCashflow Data:")?;
    write!(out, "{}", TextTable::from_cashflow(cashflow))?;
    if !cashflow.years.is_empty() {
        writeln!(out, "\nNet Cashflow: {}", net_cashflow_line(cashflow))?;
    }

    out.flush()
}

//! Run configuration: where the filing CSVs live and how charts are titled.

use serde::Deserialize;
use std::path::PathBuf;

/// Optional config file, looked up in the working directory (`.toml` implied).
pub const CONFIG_FILE: &str = "filing-charts";

/// Environment variables override the file, e.g. `FILING_CASHFLOW_PATH`.
pub const ENV_PREFIX: &str = "FILING";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportConfig {
    /// Balance sheet CSV (Asset/Amount and Liabilities/Amount column pairs).
    #[serde(default = "default_balance_sheet_path")]
    pub balance_sheet_path: PathBuf,
    /// Cashflow CSV (activity column followed by one column per year).
    #[serde(default = "default_cashflow_path")]
    pub cashflow_path: PathBuf,
    #[serde(default = "default_company")]
    pub company: String,
    /// Year shown in the balance sheet chart titles.
    #[serde(default = "default_fiscal_year")]
    pub fiscal_year: String,
}

fn default_balance_sheet_path() -> PathBuf {
    PathBuf::from("NTPC_Balancesheet_2025.csv")
}

fn default_cashflow_path() -> PathBuf {
    PathBuf::from("NTPC_CashFlow_2025.csv")
}

fn default_company() -> String {
    "NTPC".to_string()
}

fn default_fiscal_year() -> String {
    "2025".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            balance_sheet_path: default_balance_sheet_path(),
            cashflow_path: default_cashflow_path(),
            company: default_company(),
            fiscal_year: default_fiscal_year(),
        }
    }
}

impl ReportConfig {
    /// Loads configuration from `filing-charts.toml` (if present) and the
    /// `FILING_*` environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or a value has the wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn assets_title(&self) -> String {
        format!("{} Balance Sheet ({}) - Assets", self.company, self.fiscal_year)
    }

    pub fn liabilities_title(&self) -> String {
        format!("{} Balance Sheet ({}) - Liabilities", self.company, self.fiscal_year)
    }

    pub fn cashflow_title(&self, year_span: &str) -> String {
        format!("{} Cashflow ({})", self.company, year_span)
    }
}

// Filing Charts - Core Library
// Loaders, chart layout and console summary; the terminal UI lives in the binary

pub mod balance_sheet;
pub mod cashflow;
pub mod chart;
pub mod config;
pub mod error;
pub mod summary;

// Re-export commonly used types
pub use balance_sheet::{load_balance_sheet, read_balance_sheet, BalanceSheet, CategoryAmount};
pub use cashflow::{coerce_numeric, load_cashflow, read_cashflow, Cashflow, CashflowRow};
pub use chart::{bar_layout, pie_slices, Bar, PieSlice, Rgb};
pub use config::ReportConfig;
pub use error::FilingError;
pub use summary::{write_summary, TextTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use thiserror::Error;

/// Domain failures while reshaping the filing CSVs. I/O and CSV syntax errors
/// are not listed here, they travel as `anyhow` errors with file context.
#[derive(Error, Debug, PartialEq)]
pub enum FilingError {
    #[error("{table} needs at least {expected} columns, found {found}")]
    MissingColumns {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Invalid amount '{value}' for '{category}' on line {line}")]
    InvalidAmount {
        category: String,
        value: String,
        line: u64,
    },
}

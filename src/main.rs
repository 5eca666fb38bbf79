// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filing_charts::{
    load_balance_sheet, load_cashflow, write_summary, BalanceSheet, Cashflow, ReportConfig,
};

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr so the printed summary stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filing_charts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ReportConfig::load().context("Failed to load configuration")?;
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("report") => run_report(&config)?,
        None => run_ui_mode(config)?,
        Some(other) => anyhow::bail!("unknown command '{}'\nusage: {} [report]", other, args[0]),
    }

    Ok(())
}

fn load(config: &ReportConfig) -> Result<(BalanceSheet, Cashflow)> {
    println!("📂 Loading {}...", config.balance_sheet_path.display());
    let sheet = load_balance_sheet(&config.balance_sheet_path)?;
    println!(
        "✓ {} assets, {} liabilities",
        sheet.assets.len(),
        sheet.liabilities.len()
    );
    for item in sheet
        .assets
        .iter()
        .chain(&sheet.liabilities)
        .filter(|item| item.amount <= 0.0)
    {
        warn!(category = %item.category, amount = item.amount, "Non-positive amount left out of the pie chart");
    }

    println!("📂 Loading {}...", config.cashflow_path.display());
    let cashflow = load_cashflow(&config.cashflow_path)?;
    println!(
        "✓ {} activities over {} years\n",
        cashflow.rows.len(),
        cashflow.years.len()
    );

    Ok((sheet, cashflow))
}

fn run_report(config: &ReportConfig) -> Result<()> {
    let (sheet, cashflow) = load(config)?;
    write_summary(std::io::stdout().lock(), &sheet, &cashflow)?;
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: ReportConfig) -> Result<()> {
    let (sheet, cashflow) = load(&config)?;

    println!("Starting charts... (Press 'q' to quit)\n");

    let mut app = ui::App::new(sheet, cashflow, config);
    ui::run_ui(&mut app)?;

    write_summary(std::io::stdout().lock(), &app.sheet, &app.cashflow)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: ReportConfig) -> Result<()> {
    eprintln!("❌ Chart mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the tables only: cargo run -- report");
    std::process::exit(1);
}

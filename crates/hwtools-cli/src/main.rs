use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use hwtools_bom::AugmentOptions;
use std::path::PathBuf;

mod logging;

use logging::LogLevel;

#[derive(Parser)]
#[command(name = "bom-prices")]
#[command(about = "Add Digi-Key quantity-1 unit prices to a bill-of-materials CSV")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,

    /// Append an empty "Single Price" cell to rows that could not be priced
    #[arg(long)]
    pad_unpriced: bool,

    /// BOM to price; needs "Supplier - Digikey" and "LibRef" columns.
    /// The result is written to <BOM>-prices.csv
    bom: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // No BOM is not an error: show usage and leave.
    let Some(bom) = cli.bom else {
        println!("{}", Cli::command().render_usage());
        return Ok(());
    };

    logging::init(cli.log_level, cli.utc);

    let source = hwtools_acquire::digikey::price_source()
        .context("Failed to set up the Digi-Key client")?;
    let options = AugmentOptions {
        pad_unpriced: cli.pad_unpriced,
    };

    tracing::info!(bom = %bom.display(), "Pricing BOM");
    let summary = hwtools_bom::run(&bom, &source, &options).await?;

    let report = &summary.report;
    if report.priced() < report.outcomes.len() {
        tracing::warn!(
            unpriced = report.outcomes.len() - report.priced(),
            "Some line items have no price"
        );
    }
    println!("{}", summary.output.display());

    Ok(())
}

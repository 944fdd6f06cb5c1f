use anyhow::{Context, Result};
use clap::Parser;
use hwtools_smps::DesignInputs;

mod logging;

use logging::LogLevel;

#[derive(Parser)]
#[command(name = "smps-calc")]
#[command(about = "Dimension the buck converter inductor, sense resistor, and MOSFET")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,

    /// Current sense resistor in ohms
    #[arg(long, default_value_t = DesignInputs::default().sense_resistance)]
    sense_resistance: f64,

    /// Maximum output current in amperes
    #[arg(long, default_value_t = DesignInputs::default().output_current)]
    output_current: f64,

    /// Input voltage in volts
    #[arg(long, default_value_t = DesignInputs::default().input_voltage)]
    input_voltage: f64,

    /// Switching frequency in hertz
    #[arg(long, default_value_t = DesignInputs::default().switching_frequency)]
    switching_frequency: f64,

    /// MOSFET on-resistance in ohms
    #[arg(long, default_value_t = DesignInputs::default().on_resistance)]
    on_resistance: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level, cli.utc);

    let inputs = DesignInputs {
        sense_resistance: cli.sense_resistance,
        output_current: cli.output_current,
        input_voltage: cli.input_voltage,
        switching_frequency: cli.switching_frequency,
        on_resistance: cli.on_resistance,
    };
    tracing::debug!(?inputs, "Dimensioning");

    let dimensioning = hwtools_smps::dimension(&inputs).context("Invalid design inputs")?;
    println!("{dimensioning}");

    Ok(())
}

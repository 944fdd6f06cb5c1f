use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::EnvFilter;

/// Timestamp format: 2026-02-14 19:44:09.123 -08:00
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %:z";

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive; the HTML parser crates are noisy below warn.
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
            LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
        }
    }
}

/// Install the global fmt subscriber. `RUST_LOG` overrides `level`.
///
/// Logs go to stderr so stdout carries only the tool's own output.
pub fn init(level: LogLevel, utc: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if utc {
        builder
            .with_timer(ChronoUtc::new(TIME_FORMAT.to_string()))
            .init();
    } else {
        builder
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
            .init();
    }
}

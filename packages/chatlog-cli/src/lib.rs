use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const FALLBACK_LOG_FILTER: &str = "info";

/// Terminal styles shared by the chatlog binaries.
pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Builds the log filter from a directive such as `info` or `chatlog_service=debug`.
///
/// Falls back to `info` when the directive does not parse.
pub fn log_filter(directive: &str) -> EnvFilter {
	EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_FILTER))
}

/// Installs the global fmt subscriber. Logs go to stderr so stdout stays machine readable.
pub fn init_tracing(directive: &str) {
	tracing_subscriber::fmt()
		.with_env_filter(log_filter(directive))
		.with_writer(std::io::stderr)
		.init();
}

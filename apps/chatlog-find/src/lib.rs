use std::{path::PathBuf, time::Instant};

use clap::Parser;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use chatlog_service::{FindRequest, MessageService};

#[derive(Debug, Parser)]
#[command(
	version = chatlog_cli::VERSION,
	rename_all = "kebab",
	styles = chatlog_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, value_name = "ID", default_value_t = 0)]
	pub from_id: i64,
	#[arg(long, value_name = "ID", default_value_t = 0)]
	pub to_id: i64,
	#[arg(long, value_name = "ID", default_value_t = 0)]
	pub user_id: i64,
	/// Epoch millis or an RFC 3339 timestamp.
	#[arg(long, value_name = "TIME", value_parser = parse_instant)]
	pub begin: Option<i64>,
	/// Epoch millis or an RFC 3339 timestamp.
	#[arg(long, value_name = "TIME", value_parser = parse_instant)]
	pub end: Option<i64>,
	#[arg(long, short = 'n', value_name = "N", default_value_t = 0)]
	pub limit: i64,
	#[arg(long, value_name = "N", default_value_t = 0)]
	pub offset: i64,
	/// Sort field, prefix with `-` for descending. May be repeated.
	#[arg(long, value_name = "FIELD", allow_hyphen_values = true)]
	pub sort: Vec<String>,
}
impl Args {
	pub fn request(&self) -> FindRequest {
		FindRequest {
			from_id: self.from_id,
			to_id: self.to_id,
			user_id: self.user_id,
			begin: self.begin.unwrap_or_default(),
			end: self.end.unwrap_or_default(),
			limit: self.limit,
			offset: self.offset,
			sort: self.sort.clone(),
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = chatlog_config::load(&args.config)?;

	chatlog_cli::init_tracing(&config.service.log_level);

	let service = MessageService::new(config)?;
	let request = args.request();
	let started = Instant::now();
	let response = service.find_messages(request).await?;

	tracing::info!(
		total = response.total,
		items = response.items.len(),
		elapsed_ms = started.elapsed().as_millis() as u64,
		"Lookup finished."
	);

	let json = serde_json::to_string_pretty(&response)?;

	println!("{json}");

	Ok(())
}

/// Accepts epoch millis or an RFC 3339 timestamp and returns epoch millis.
pub fn parse_instant(raw: &str) -> Result<i64, String> {
	let raw = raw.trim();

	if let Ok(millis) = raw.parse::<i64>() {
		return Ok(millis);
	}

	let at = OffsetDateTime::parse(raw, &Rfc3339)
		.map_err(|err| format!("{raw:?} is neither epoch millis nor RFC 3339: {err}"))?;

	Ok((at.unix_timestamp_nanos() / 1_000_000) as i64)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_millis_and_rfc3339() {
		assert_eq!(parse_instant("1583020800000"), Ok(1_583_020_800_000));
		assert_eq!(parse_instant(" 2020-03-01T00:00:00Z "), Ok(1_583_020_800_000));
		assert_eq!(parse_instant("2020-03-01T08:00:00+08:00"), Ok(1_583_020_800_000));
		assert!(parse_instant("yesterday").is_err());
	}

	#[test]
	fn builds_request_from_flags() {
		let args = Args::try_parse_from([
			"chatlog-find",
			"-c",
			"chatlog.toml",
			"--from-id",
			"100",
			"--to-id",
			"231",
			"--begin",
			"2020-03-01T00:00:00Z",
			"--sort",
			"-created_timestamp",
			"--sort",
			"uuid",
			"-n",
			"50",
		])
		.expect("Flags must parse.");
		let request = args.request();

		assert_eq!(request.from_id, 100);
		assert_eq!(request.to_id, 231);
		assert_eq!(request.user_id, 0);
		assert_eq!(request.begin, 1_583_020_800_000);
		assert_eq!(request.end, 0);
		assert_eq!(request.limit, 50);
		assert_eq!(request.sort, vec!["-created_timestamp".to_string(), "uuid".to_string()]);
	}
}

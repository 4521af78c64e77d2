use serde::Deserialize;
use serde_json::{Map, Value};
use time::{UtcOffset, macros::format_description};

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Backend {
	pub url: String,
	/// Index name pattern. The literal `{year}` is replaced with the partition year; a pattern
	/// without it targets the same index for every partition.
	pub index: String,
	/// Optional. Legacy mapping type inserted into the search path.
	pub doc_type: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub max_retries: u32,
	#[serde(default = "default_retry_backoff_ms")]
	pub retry_backoff_ms: u64,
	#[serde(default)]
	pub pretty: bool,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl Backend {
	pub fn index_for_year(&self, year: i32) -> String {
		self.index.replace(YEAR_PLACEHOLDER, &year.to_string())
	}
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Offset used as "local time" when deriving calendar years, e.g. "+08:00".
	#[serde(default = "default_utc_offset")]
	pub utc_offset: String,
	#[serde(default = "default_lookback_days")]
	pub lookback_days: i64,
	#[serde(default = "default_limit")]
	pub default_limit: i64,
	#[serde(default = "default_max_limit")]
	pub max_limit: i64,
	#[serde(default = "default_deadline_ms")]
	pub deadline_ms: u64,
}
impl Search {
	pub fn offset(&self) -> Result<UtcOffset> {
		parse_utc_offset(&self.utc_offset)
	}
}
impl Default for Search {
	fn default() -> Self {
		Self {
			utc_offset: default_utc_offset(),
			lookback_days: default_lookback_days(),
			default_limit: default_limit(),
			max_limit: default_max_limit(),
			deadline_ms: default_deadline_ms(),
		}
	}
}

pub const YEAR_PLACEHOLDER: &str = "{year}";
/// Upper bound for `search.lookback_days`, roughly one hundred years.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

fn parse_utc_offset(raw: &str) -> Result<UtcOffset> {
	let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");

	UtcOffset::parse(raw.trim(), format).map_err(|err| Error::Validation {
		message: format!("search.utc_offset must look like +08:00 ({err})."),
	})
}

fn default_retry_backoff_ms() -> u64 {
	200
}

fn default_utc_offset() -> String {
	"+00:00".to_string()
}

fn default_lookback_days() -> i64 {
	7
}

fn default_limit() -> i64 {
	100
}

fn default_max_limit() -> i64 {
	10_000
}

fn default_deadline_ms() -> u64 {
	5_000
}

pub mod wire;

mod error;

pub use error::{Error, Result};
pub use wire::SearchPage;

use std::time::Duration;

use reqwest::{
	Client, RequestBuilder, Response, StatusCode,
	header::{HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

use chatlog_domain::query::QuerySpec;

/// HTTP client for an Elasticsearch-compatible search backend.
///
/// Connection failures, timeouts and 5xx responses are retried with exponential backoff; any other
/// failure is returned to the caller as is.
pub struct EsClient {
	client: Client,
	base_url: String,
	doc_type: Option<String>,
	pretty: bool,
	max_retries: u32,
	retry_backoff: Duration,
}
impl EsClient {
	pub fn new(cfg: &chatlog_config::Backend) -> Result<Self> {
		if cfg.url.trim().is_empty() {
			return Err(Error::InvalidConfig {
				message: "Backend url must be non-empty.".to_string(),
			});
		}

		let client = Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(default_headers(&cfg.default_headers)?)
			.build()?;

		Ok(Self {
			client,
			base_url: cfg.url.trim_end_matches('/').to_string(),
			doc_type: cfg.doc_type.clone(),
			pretty: cfg.pretty,
			max_retries: cfg.max_retries,
			retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
		})
	}

	pub async fn index_exists(&self, index: &str) -> Result<bool> {
		let url = format!("{}/{index}", self.base_url);
		let res = self.send_with_retry(|| self.client.head(&url)).await?;

		match res.status() {
			status if status.is_success() => Ok(true),
			StatusCode::NOT_FOUND => Ok(false),
			status => Err(Error::Status { status: status.as_u16(), body: String::new() }),
		}
	}

	pub async fn search(&self, index: &str, spec: &QuerySpec) -> Result<SearchPage> {
		let url = match self.doc_type.as_deref() {
			Some(doc_type) => format!("{}/{index}/{doc_type}/_search", self.base_url),
			None => format!("{}/{index}/_search", self.base_url),
		};
		let body = wire::search_body(spec);
		let res = self
			.send_with_retry(|| {
				let req = self.client.post(&url).json(&body);

				if self.pretty { req.query(&[("pretty", "true")]) } else { req }
			})
			.await?;
		let status = res.status();

		if !status.is_success() {
			let body = res.text().await.unwrap_or_default();

			return Err(Error::Status { status: status.as_u16(), body });
		}

		let json: Value = res.json().await?;

		wire::parse_search_response(json)
	}

	async fn send_with_retry<F>(&self, build: F) -> Result<Response>
	where
		F: Fn() -> RequestBuilder,
	{
		let mut attempt = 0;

		loop {
			match build().send().await {
				Ok(res) if res.status().is_server_error() && attempt < self.max_retries => {
					tracing::warn!(status = %res.status(), attempt, "Backend returned a server error.");
				},
				Ok(res) => return Ok(res),
				Err(err) if (err.is_connect() || err.is_timeout()) && attempt < self.max_retries => {
					tracing::warn!(error = %err, attempt, "Backend request failed.");
				},
				Err(err) => return Err(err.into()),
			}

			tokio::time::sleep(self.backoff(attempt)).await;

			attempt += 1;
		}
	}

	fn backoff(&self, attempt: u32) -> Duration {
		self.retry_backoff.saturating_mul(2_u32.saturating_pow(attempt))
	}
}

pub fn default_headers(default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

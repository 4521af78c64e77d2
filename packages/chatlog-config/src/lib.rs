mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, MAX_LOOKBACK_DAYS, Search, Service, YEAR_PLACEHOLDER};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.url.starts_with("http://") && !cfg.backend.url.starts_with("https://") {
		return Err(Error::Validation {
			message: "backend.url must start with http:// or https://.".to_string(),
		});
	}
	if cfg.backend.index.trim().is_empty() {
		return Err(Error::Validation { message: "backend.index must be non-empty.".to_string() });
	}
	if cfg.backend.index.contains('/') {
		return Err(Error::Validation {
			message: "backend.index must not contain '/'.".to_string(),
		});
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.backend.max_retries > 0 && cfg.backend.retry_backoff_ms == 0 {
		return Err(Error::Validation {
			message: "backend.retry_backoff_ms must be greater than zero when retries are enabled."
				.to_string(),
		});
	}

	for (key, value) in &cfg.backend.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("backend.default_headers.{key} must be a string."),
			});
		}
	}

	cfg.search.offset()?;

	if cfg.search.lookback_days <= 0 {
		return Err(Error::Validation {
			message: "search.lookback_days must be greater than zero.".to_string(),
		});
	}
	if cfg.search.lookback_days > MAX_LOOKBACK_DAYS {
		return Err(Error::Validation {
			message: format!("search.lookback_days must be at most {MAX_LOOKBACK_DAYS}."),
		});
	}
	if cfg.search.default_limit <= 0 {
		return Err(Error::Validation {
			message: "search.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit < cfg.search.default_limit {
		return Err(Error::Validation {
			message: "search.max_limit must be greater than or equal to search.default_limit."
				.to_string(),
		});
	}
	if cfg.search.deadline_ms == 0 {
		return Err(Error::Validation {
			message: "search.deadline_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.backend.doc_type.as_deref().map(|doc_type| doc_type.trim().is_empty()).unwrap_or(false)
	{
		cfg.backend.doc_type = None;
	}

	let url = cfg.backend.url.trim().trim_end_matches('/').to_string();

	cfg.backend.url = url;
	cfg.backend.index = cfg.backend.index.trim().to_string();
}

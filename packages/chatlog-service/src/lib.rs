pub mod executor;
pub mod find;
pub mod message;

mod error;

pub use chatlog_backend::{EsClient, SearchPage};
pub use error::{Error, Result};
pub use executor::{Deadline, PartitionResult};
pub use find::{FindRequest, FindResponse, clamp_limit};
pub use message::Message;

use std::{future::Future, pin::Pin, sync::Arc};

use time::UtcOffset;

use chatlog_config::Config;
use chatlog_domain::query::QuerySpec;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The search backend as seen by the lookup logic.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn index_exists<'a>(&'a self, index: &'a str) -> BoxFuture<'a, chatlog_backend::Result<bool>>;

	fn search<'a>(
		&'a self,
		index: &'a str,
		spec: &'a QuerySpec,
	) -> BoxFuture<'a, chatlog_backend::Result<SearchPage>>;
}

pub struct MessageService {
	pub cfg: Config,
	pub backend: Arc<dyn SearchBackend>,
	/// Parsed `search.utc_offset`, the local time of the calendar years.
	offset: UtcOffset,
}

impl SearchBackend for EsClient {
	fn index_exists<'a>(&'a self, index: &'a str) -> BoxFuture<'a, chatlog_backend::Result<bool>> {
		Box::pin(EsClient::index_exists(self, index))
	}

	fn search<'a>(
		&'a self,
		index: &'a str,
		spec: &'a QuerySpec,
	) -> BoxFuture<'a, chatlog_backend::Result<SearchPage>> {
		Box::pin(EsClient::search(self, index, spec))
	}
}

impl MessageService {
	pub fn new(cfg: Config) -> Result<Self> {
		let client = EsClient::new(&cfg.backend)?;

		Self::with_backend(cfg, Arc::new(client))
	}

	pub fn with_backend(cfg: Config, backend: Arc<dyn SearchBackend>) -> Result<Self> {
		let offset = cfg.search.offset()?;

		Ok(Self { cfg, backend, offset })
	}

	pub fn offset(&self) -> UtcOffset {
		self.offset
	}
}

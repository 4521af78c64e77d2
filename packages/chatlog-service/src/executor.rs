use std::{future::Future, time::Duration};

use serde_json::Value;
use tokio::time::Instant;

use chatlog_domain::query::QuerySpec;

use crate::{Error, Message, Result, SearchBackend};

/// One deadline shared by every backend call of a request.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
	at: Instant,
	budget: Duration,
}
impl Deadline {
	pub fn after(budget: Duration) -> Self {
		Self { at: Instant::now() + budget, budget }
	}

	pub async fn bound<F>(&self, fut: F) -> Result<F::Output>
	where
		F: Future,
	{
		tokio::time::timeout_at(self.at, fut)
			.await
			.map_err(|_| Error::DeadlineExceeded { deadline_ms: self.budget.as_millis() as u64 })
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionResult {
	pub items: Vec<Message>,
	pub total_matched: i64,
}

/// Runs `spec` against one partition index.
pub async fn execute(
	deadline: &Deadline,
	backend: &dyn SearchBackend,
	spec: &QuerySpec,
	index: &str,
) -> Result<PartitionResult> {
	if !deadline.bound(backend.index_exists(index)).await?? {
		return Err(Error::BackendUnavailable { message: format!("Index {index} does not exist.") });
	}

	let page = deadline.bound(backend.search(index, spec)).await??;

	if page.total == 0 {
		return Ok(PartitionResult::default());
	}

	let items = decode_messages(page.hits)?;

	Ok(PartitionResult { items, total_matched: page.total })
}

pub fn decode_messages(hits: Vec<Value>) -> Result<Vec<Message>> {
	let mut items = Vec::with_capacity(hits.len());

	for (position, hit) in hits.into_iter().enumerate() {
		if !hit.is_object() {
			return Err(Error::Decode {
				message: format!("Hit {position} carries no message document."),
			});
		}

		let item: Message = serde_json::from_value(hit).map_err(|err| Error::Decode {
			message: format!("Hit {position} is not a valid message: {err}"),
		})?;

		tracing::trace!(uuid = %item.uuid, "Decoded message.");

		items.push(item);
	}

	Ok(items)
}

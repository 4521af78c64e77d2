use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use chatlog_domain::{
	partition::{self, PartitionPlan},
	query::{IdentityFilter, QueryBuilder},
};

use crate::{
	Message, MessageService, Result, SearchBackend,
	executor::{self, Deadline},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FindRequest {
	/// Sender; zero or negative leaves the sender unconstrained.
	pub from_id: i64,
	/// Recipient; zero or negative leaves the recipient unconstrained.
	pub to_id: i64,
	/// Participant searching on their own behalf; zero requests a directed query.
	pub user_id: i64,
	/// Epoch millis; zero or negative falls back to the lookback window.
	pub begin: i64,
	/// Epoch millis; zero, negative or future values fall back to now.
	pub end: i64,
	pub limit: i64,
	pub offset: i64,
	/// Field names, `-field` for descending.
	pub sort: Vec<String>,
}
impl FindRequest {
	pub fn identity(&self) -> IdentityFilter {
		IdentityFilter { from_id: self.from_id, to_id: self.to_id, user_id: self.user_id }
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResponse {
	pub items: Vec<Message>,
	pub total: i64,
}

pub(crate) struct AggregateArgs<'a> {
	pub(crate) backend: &'a dyn SearchBackend,
	pub(crate) index_naming: &'a chatlog_config::Backend,
	pub(crate) plan: &'a PartitionPlan,
	pub(crate) identity: IdentityFilter,
	pub(crate) limit: i64,
	pub(crate) offset: i64,
	pub(crate) sort: &'a [String],
	pub(crate) deadline: &'a Deadline,
}

impl MessageService {
	pub async fn find_messages(&self, req: FindRequest) -> Result<FindResponse> {
		let now = OffsetDateTime::now_utc().to_offset(self.offset);

		self.find_messages_at(req, now).await
	}

	/// Same as [`MessageService::find_messages`] with an explicit clock. Calendar years are
	/// evaluated at `now`'s offset.
	pub async fn find_messages_at(
		&self,
		req: FindRequest,
		now: OffsetDateTime,
	) -> Result<FindResponse> {
		let deadline = Deadline::after(Duration::from_millis(self.cfg.search.deadline_ms));
		let limit = clamp_limit(req.limit, self.cfg.search.default_limit, self.cfg.search.max_limit);
		let plan = partition::plan_with_lookback(
			req.begin,
			req.end,
			now,
			time::Duration::days(self.cfg.search.lookback_days),
		)?;

		tracing::debug!(
			years = ?plan.years(),
			begin = plan.range().begin,
			end = plan.range().end,
			limit,
			"Planned message lookup."
		);

		aggregate(AggregateArgs {
			backend: self.backend.as_ref(),
			index_naming: &self.cfg.backend,
			plan: &plan,
			identity: req.identity(),
			limit,
			offset: req.offset,
			sort: &req.sort,
			deadline: &deadline,
		})
		.await
	}
}

/// Non-positive limits fall back to `default_limit`; anything above `max_limit` is capped.
pub fn clamp_limit(limit: i64, default_limit: i64, max_limit: i64) -> i64 {
	if limit <= 0 {
		default_limit
	} else if limit > max_limit {
		max_limit
	} else {
		limit
	}
}

/// Visits partitions oldest first and stops as soon as the running total reaches `limit`.
///
/// Any failure discards what was accumulated so far.
pub(crate) async fn aggregate(args: AggregateArgs<'_>) -> Result<FindResponse> {
	let AggregateArgs { backend, index_naming, plan, identity, limit, offset, sort, deadline } =
		args;
	let mut response = FindResponse::default();

	for window in plan.windows()? {
		let index = index_naming.index_for_year(window.year);
		let spec = QueryBuilder::new(identity, window.range())
			.offset(offset)
			.limit(limit)
			.sort(sort.iter().cloned())
			.build();
		let result = executor::execute(deadline, backend, &spec, &index).await?;

		response.total = response.total.saturating_add(result.total_matched);

		tracing::info!(
			year = window.year,
			index = %index,
			items = result.items.len(),
			running_total = response.total,
			"Partition queried."
		);

		response.items.extend(result.items);

		if response.total >= limit {
			tracing::debug!(year = window.year, limit, "Limit reached, skipping later partitions.");

			break;
		}
	}

	Ok(response)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamps_limit_into_bounds() {
		assert_eq!(clamp_limit(0, 100, 10_000), 100);
		assert_eq!(clamp_limit(-7, 100, 10_000), 100);
		assert_eq!(clamp_limit(10_001, 100, 10_000), 10_000);
		assert_eq!(clamp_limit(100, 100, 10_000), 100);
		assert_eq!(clamp_limit(2_500, 100, 10_000), 2_500);
		assert_eq!(clamp_limit(10_000, 100, 10_000), 10_000);
	}
}

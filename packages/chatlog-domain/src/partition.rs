//! Year partitioning of a message time range.
//!
//! Messages are sharded into one index per calendar year. A request's time range is normalized
//! against an injected clock and mapped onto the years it touches; calendar years are evaluated at
//! the clock's UTC offset.

use serde::Serialize;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::{Error, Result};

pub const DEFAULT_LOOKBACK: Duration = Duration::days(7);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimeRange {
	pub begin: i64,
	pub end: i64,
}

/// One partition query window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PartitionWindow {
	pub year: i32,
	pub begin: i64,
	pub end: i64,
}
impl PartitionWindow {
	pub fn range(&self) -> TimeRange {
		TimeRange { begin: self.begin, end: self.end }
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionPlan {
	spans_multiple_years: bool,
	years: Vec<i32>,
	range: TimeRange,
	offset: UtcOffset,
}
impl PartitionPlan {
	pub fn spans_multiple_years(&self) -> bool {
		self.spans_multiple_years
	}

	/// Ascending, contiguous, never empty.
	pub fn years(&self) -> &[i32] {
		&self.years
	}

	/// The normalized overall range.
	pub fn range(&self) -> TimeRange {
		self.range
	}

	pub fn offset(&self) -> UtcOffset {
		self.offset
	}

	/// Query windows in ascending year order.
	///
	/// Every window starts at the overall begin. All but the final window close at the last second
	/// of their year; the final one closes at the overall end.
	pub fn windows(&self) -> Result<Vec<PartitionWindow>> {
		let last = self.years.len() - 1;
		let mut windows = Vec::with_capacity(self.years.len());

		for (i, year) in self.years.iter().copied().enumerate() {
			let end = if i == last { self.range.end } else { year_end_millis(year, self.offset)? };

			windows.push(PartitionWindow { year, begin: self.range.begin, end });
		}

		Ok(windows)
	}
}

pub fn plan(begin: i64, end: i64, now: OffsetDateTime) -> Result<PartitionPlan> {
	plan_with_lookback(begin, end, now, DEFAULT_LOOKBACK)
}

pub fn plan_with_lookback(
	begin: i64,
	end: i64,
	now: OffsetDateTime,
	lookback: Duration,
) -> Result<PartitionPlan> {
	let offset = now.offset();
	let now_ms = unix_millis(now);
	let end_in_future = end > now_ms;
	let end = if end <= 0 || end_in_future { now_ms } else { end };
	// A future end also resets the begin, not only a missing one.
	let begin = if begin <= 0 || end_in_future { lookback_start(now, lookback)? } else { begin };

	if begin > end {
		return Err(Error::InvalidRange { begin, end });
	}

	let begin_year = year_of(begin, offset)?;
	let end_year = year_of(end, offset)?;
	let years: Vec<i32> = (begin_year..=end_year).collect();

	Ok(PartitionPlan {
		spans_multiple_years: begin_year != end_year,
		years,
		range: TimeRange { begin, end },
		offset,
	})
}

/// 23:59:59 on December 31 of `year` at `offset`, in epoch millis.
pub fn year_end_millis(year: i32, offset: UtcOffset) -> Result<i64> {
	let last_second = Date::from_calendar_date(year, Month::December, 31)?
		.with_hms(23, 59, 59)?
		.assume_offset(offset);

	Ok(last_second.unix_timestamp() * 1_000)
}

pub fn year_of(millis: i64, offset: UtcOffset) -> Result<i32> {
	let at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)?;

	Ok(at.to_offset(offset).year())
}

fn lookback_start(now: OffsetDateTime, lookback: Duration) -> Result<i64> {
	let start = now.checked_sub(lookback).ok_or_else(|| Error::OutOfRange {
		message: format!("lookback of {} days starts before year -9999", lookback.whole_days()),
	})?;

	Ok(unix_millis(start))
}

fn unix_millis(at: OffsetDateTime) -> i64 {
	(at.unix_timestamp_nanos() / 1_000_000) as i64
}

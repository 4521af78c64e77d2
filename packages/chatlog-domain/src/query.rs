use serde::Serialize;

use crate::partition::TimeRange;

pub const SUBTYPE_FIELD: &str = "subtype";
pub const CREATED_TIMESTAMP_FIELD: &str = "created_timestamp";
pub const FROM_ID_FIELD: &str = "from_id";
pub const TO_ID_FIELD: &str = "to_id";
/// Subtype of an ordinary chat message.
pub const NORMAL_CHAT_SUBTYPE: i64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
	/// Restricts matches and contributes to scoring.
	Must,
	/// Restricts matches without scoring.
	Filter,
	/// Scoring only while any must or filter clause is present.
	Should,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
	Term { field: &'static str, value: i64 },
	Range { field: &'static str, gte: i64, lte: i64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Clause {
	pub kind: ClauseKind,
	pub condition: Condition,
}
impl Clause {
	fn term(kind: ClauseKind, field: &'static str, value: i64) -> Self {
		Self { kind, condition: Condition::Term { field, value } }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IdentityFilter {
	pub from_id: i64,
	pub to_id: i64,
	pub user_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortField {
	pub field: String,
	pub ascending: bool,
}
impl SortField {
	/// `-field` sorts descending, `field` ascending. Blank input yields `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		let (field, ascending) = match raw.strip_prefix('-') {
			Some(field) => (field.trim(), false),
			None => (raw, true),
		};

		if field.is_empty() {
			return None;
		}

		Some(Self { field: field.to_string(), ascending })
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
	pub offset: i64,
	pub limit: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuerySpec {
	clauses: Vec<Clause>,
	window: TimeRange,
	offset: Option<i64>,
	limit: Option<i64>,
	sort: Vec<SortField>,
}
impl QuerySpec {
	pub fn clauses(&self) -> &[Clause] {
		&self.clauses
	}

	pub fn clauses_of(&self, kind: ClauseKind) -> impl Iterator<Item = &Condition> {
		self.clauses.iter().filter(move |clause| clause.kind == kind).map(|clause| &clause.condition)
	}

	pub fn window(&self) -> TimeRange {
		self.window
	}

	pub fn offset(&self) -> Option<i64> {
		self.offset
	}

	pub fn limit(&self) -> Option<i64> {
		self.limit
	}

	pub fn sort(&self) -> &[SortField] {
		&self.sort
	}
}

#[derive(Clone, Debug)]
pub struct QueryBuilder {
	identity: IdentityFilter,
	window: TimeRange,
	pagination: Pagination,
	sort: Vec<String>,
}
impl QueryBuilder {
	pub fn new(identity: IdentityFilter, window: TimeRange) -> Self {
		Self { identity, window, pagination: Pagination::default(), sort: Vec::new() }
	}

	pub fn offset(mut self, offset: i64) -> Self {
		self.pagination.offset = offset;

		self
	}

	pub fn limit(mut self, limit: i64) -> Self {
		self.pagination.limit = limit;

		self
	}

	pub fn sort<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.sort = fields.into_iter().map(Into::into).collect();

		self
	}

	pub fn build(self) -> QuerySpec {
		compose(self.identity, self.window, self.pagination, &self.sort)
	}
}

pub fn compose(
	identity: IdentityFilter,
	window: TimeRange,
	pagination: Pagination,
	sort: &[String],
) -> QuerySpec {
	let mut clauses = vec![
		Clause::term(ClauseKind::Must, SUBTYPE_FIELD, NORMAL_CHAT_SUBTYPE),
		Clause {
			kind: ClauseKind::Filter,
			condition: Condition::Range {
				field: CREATED_TIMESTAMP_FIELD,
				gte: window.begin,
				lte: window.end,
			},
		},
	];

	clauses.extend(identity_clauses(identity));

	QuerySpec {
		clauses,
		window,
		offset: (pagination.offset > 0).then_some(pagination.offset),
		limit: (pagination.limit > 0).then_some(pagination.limit),
		sort: sort_fields(sort),
	}
}

/// Identity constraints.
///
/// Directed constraints only apply when no participant is given. The participant disjunction is
/// added whenever `user_id` is non-negative, independently of the directed block.
pub fn identity_clauses(identity: IdentityFilter) -> Vec<Clause> {
	let IdentityFilter { from_id, to_id, user_id } = identity;
	let mut clauses = Vec::new();

	if user_id == 0 {
		if from_id > 0 {
			clauses.push(Clause::term(ClauseKind::Must, FROM_ID_FIELD, from_id));
		}
		if to_id > 0 {
			clauses.push(Clause::term(ClauseKind::Must, TO_ID_FIELD, to_id));
		}
	}
	if user_id >= 0 {
		clauses.push(Clause::term(ClauseKind::Should, FROM_ID_FIELD, from_id));
		clauses.push(Clause::term(ClauseKind::Should, TO_ID_FIELD, to_id));
	}

	clauses
}

fn sort_fields(requested: &[String]) -> Vec<SortField> {
	let fields: Vec<SortField> = requested.iter().filter_map(|raw| SortField::parse(raw)).collect();

	if fields.is_empty() {
		return vec![SortField { field: CREATED_TIMESTAMP_FIELD.to_string(), ascending: false }];
	}

	fields
}

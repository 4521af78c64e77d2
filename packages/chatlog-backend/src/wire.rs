//! Translation between [`QuerySpec`] and the search backend's JSON wire format.

use serde_json::{Map, Value, json};

use chatlog_domain::query::{ClauseKind, Condition, QuerySpec};

use crate::{Error, Result};

/// Raw hits of one search call, in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
	/// `_source` documents of the returned hits; `Null` where a hit carried none.
	pub hits: Vec<Value>,
	/// Total number of matching documents, independent of paging.
	pub total: i64,
}

pub fn search_body(spec: &QuerySpec) -> Value {
	let mut bool_query = Map::new();

	for (kind, key) in
		[(ClauseKind::Must, "must"), (ClauseKind::Filter, "filter"), (ClauseKind::Should, "should")]
	{
		let conditions: Vec<Value> = spec.clauses_of(kind).map(condition_json).collect();

		if !conditions.is_empty() {
			bool_query.insert(key.to_string(), Value::Array(conditions));
		}
	}

	let sort: Vec<Value> = spec
		.sort()
		.iter()
		.map(|field| {
			let order = if field.ascending { "asc" } else { "desc" };

			json!({ field.field.as_str(): { "order": order } })
		})
		.collect();
	let mut body = json!({
		"query": { "bool": bool_query },
		"sort": sort,
	});

	if let Some(offset) = spec.offset() {
		body["from"] = json!(offset);
	}
	if let Some(limit) = spec.limit() {
		body["size"] = json!(limit);
	}

	body
}

pub fn parse_search_response(json: Value) -> Result<SearchPage> {
	let hits = json.get("hits").ok_or_else(|| Error::InvalidResponse {
		message: "Search response is missing hits.".to_string(),
	})?;
	let total = match hits.get("total") {
		Some(Value::Number(total)) => total.as_i64(),
		Some(Value::Object(total)) => total.get("value").and_then(Value::as_i64),
		_ => None,
	}
	.ok_or_else(|| Error::InvalidResponse {
		message: "Search response is missing hits.total.".to_string(),
	})?;
	let raw_hits = match hits.get("hits") {
		Some(Value::Array(raw_hits)) => raw_hits.as_slice(),
		None | Some(Value::Null) => &[],
		Some(_) => {
			return Err(Error::InvalidResponse {
				message: "Search response hits.hits must be an array.".to_string(),
			});
		},
	};
	let sources =
		raw_hits.iter().map(|hit| hit.get("_source").cloned().unwrap_or(Value::Null)).collect();

	Ok(SearchPage { hits: sources, total })
}

fn condition_json(condition: &Condition) -> Value {
	match *condition {
		Condition::Term { field, value } => json!({ "term": { field: value } }),
		Condition::Range { field, gte, lte } => {
			json!({ "range": { field: { "gte": gte, "lte": lte } } })
		},
	}
}

#[cfg(test)]
mod tests {
	use chatlog_domain::{
		partition::TimeRange,
		query::{IdentityFilter, QueryBuilder},
	};

	use super::*;

	#[test]
	fn builds_bool_query_with_sort_and_size() {
		let spec = QueryBuilder::new(
			IdentityFilter { from_id: 100, to_id: 231, user_id: 121 },
			TimeRange { begin: 1_580_046_211_000, end: 1_584_546_239_000 },
		)
		.limit(1_000)
		.build();
		let body = search_body(&spec);

		assert_eq!(
			body,
			json!({
				"query": {
					"bool": {
						"must": [{ "term": { "subtype": 1 } }],
						"filter": [{
							"range": {
								"created_timestamp": {
									"gte": 1_580_046_211_000_i64,
									"lte": 1_584_546_239_000_i64
								}
							}
						}],
						"should": [
							{ "term": { "from_id": 100 } },
							{ "term": { "to_id": 231 } }
						]
					}
				},
				"sort": [{ "created_timestamp": { "order": "desc" } }],
				"size": 1_000
			})
		);
	}

	#[test]
	fn accepts_object_and_numeric_totals() {
		let legacy = json!({ "hits": { "total": 3, "hits": [{ "_source": { "uuid": "a" } }] } });
		let current = json!({ "hits": { "total": { "value": 3, "relation": "eq" }, "hits": [] } });

		assert_eq!(parse_search_response(legacy).expect("parse failed").total, 3);
		assert_eq!(parse_search_response(current).expect("parse failed").total, 3);
	}

	#[test]
	fn keeps_hit_order() {
		let json = json!({
			"hits": {
				"total": 2,
				"hits": [
					{ "_source": { "uuid": "second" } },
					{ "_source": { "uuid": "first" } }
				]
			}
		});
		let page = parse_search_response(json).expect("parse failed");

		assert_eq!(page.hits[0]["uuid"], "second");
		assert_eq!(page.hits[1]["uuid"], "first");
	}

	#[test]
	fn hit_without_source_is_kept_as_null() {
		let json = json!({ "hits": { "total": 2, "hits": [{ "_id": "x" }, { "_source": {} }] } });
		let page = parse_search_response(json).expect("parse failed");

		assert_eq!(page.hits, vec![Value::Null, json!({})]);
	}
}

use serde::{Deserialize, Serialize};

/// A stored chat message as indexed by the search backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
	#[serde(skip_serializing_if = "String::is_empty")]
	pub uuid: String,
	pub from_id: i64,
	pub to_id: i64,
	pub at_id: i64,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub thread: String,
	pub message_type: i64,
	pub content_type: i64,
	pub subtype: i64,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub message_body: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub created_time: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub ext: String,
	pub created_timestamp: i64,
}

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TrackEventDto {
	#[garde(pattern(r"^[a-z][a-z0-9_]{0,63}$"))]
	pub event_name: String,

	#[garde(length(chars, min = 1, max = 2048))]
	pub page_path: String,

	#[garde(length(chars, max = 256))]
	#[serde(default)]
	pub element_id: String,

	#[garde(length(chars, max = 512))]
	#[serde(default)]
	pub element_text: String,

	#[garde(length(chars, max = 2048))]
	#[serde(default)]
	pub target_url: String,

	#[garde(skip)]
	#[serde(default)]
	pub metadata: Map<String, Value>,

	#[garde(skip)]
	#[serde(default = "Utc::now")]
	pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TrackRequestDto {
	#[garde(length(min = 1, max = 50), dive)]
	pub events: Vec<TrackEventDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackResponse {
	pub accepted: usize,
	pub rejected: usize,
	pub message: String,
	pub errors: Vec<String>,
}

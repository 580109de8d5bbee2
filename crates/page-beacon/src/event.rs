//! Telemetry event model.
//!
//! Events are captured once, at enqueue time, and never modified afterwards.
//! The wire shape is the JSON envelope `{ "events": [...] }` accepted by the
//! collection endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Maximum number of characters kept in `element_text`.
pub const MAX_ELEMENT_TEXT_CHARS: usize = 512;

/// Name of a telemetry event.
///
/// Well-known names get their own variant; anything declared by a page element
/// through `data-analytics-event` travels as [`EventName::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventName {
	PageView,
	Click,
	OutboundClick,
	SectionScroll,
	Custom(String),
}

impl EventName {
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			Self::PageView => "page_view",
			Self::Click => "click",
			Self::OutboundClick => "outbound_click",
			Self::SectionScroll => "section_scroll",
			Self::Custom(name) => name,
		}
	}
}

impl From<&str> for EventName {
	fn from(name: &str) -> Self {
		match name {
			"page_view" => Self::PageView,
			"click" => Self::Click,
			"outbound_click" => Self::OutboundClick,
			"section_scroll" => Self::SectionScroll,
			other => Self::Custom(other.to_string()),
		}
	}
}

impl From<String> for EventName {
	fn from(name: String) -> Self {
		Self::from(name.as_str())
	}
}

impl From<EventName> for String {
	fn from(name: EventName) -> Self {
		match name {
			EventName::Custom(name) => name,
			known => known.as_str().to_string(),
		}
	}
}

impl fmt::Display for EventName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single queued telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
	pub event_name: EventName,
	pub page_path: String,
	#[serde(default)]
	pub element_id: String,
	#[serde(default)]
	pub element_text: String,
	#[serde(default)]
	pub target_url: String,
	#[serde(default)]
	pub metadata: Map<String, Value>,
	pub occurred_at: DateTime<Utc>,
}

impl TelemetryEvent {
	/// Capture an event now.
	///
	/// An empty or missing `page_path` falls back to `current_path`, and
	/// `element_text` is cut to `text_limit` characters.
	#[must_use]
	pub fn capture(event_name: EventName, fields: EventFields, current_path: &str, text_limit: usize) -> Self {
		let page_path = fields.page_path.filter(|p| !p.is_empty()).unwrap_or_else(|| current_path.to_string());

		Self {
			event_name,
			page_path,
			element_id: fields.element_id,
			element_text: truncate_chars(&fields.element_text, text_limit),
			target_url: fields.target_url,
			metadata: fields.metadata,
			occurred_at: Utc::now(),
		}
	}
}

/// Optional parts of an event, as resolved by a producer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFields {
	pub page_path: Option<String>,
	pub element_id: String,
	pub element_text: String,
	pub target_url: String,
	pub metadata: Map<String, Value>,
}

impl EventFields {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn page_path(mut self, path: impl Into<String>) -> Self {
		self.page_path = Some(path.into());
		self
	}

	#[must_use]
	pub fn element_id(mut self, id: impl Into<String>) -> Self {
		self.element_id = id.into();
		self
	}

	#[must_use]
	pub fn element_text(mut self, text: impl Into<String>) -> Self {
		self.element_text = text.into();
		self
	}

	#[must_use]
	pub fn target_url(mut self, url: impl Into<String>) -> Self {
		self.target_url = url.into();
		self
	}

	#[must_use]
	pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.metadata.insert(key.into(), value.into());
		self
	}
}

/// Body of a `POST` to the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRequest {
	pub events: Vec<TelemetryEvent>,
}

/// Keep at most `limit` chars of `text`.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
	match text.char_indices().nth(limit) {
		Some((cut, _)) => text[..cut].to_string(),
		None => text.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_event_name_wire_format() {
		assert_eq!(serde_json::to_string(&EventName::OutboundClick).unwrap(), "\"outbound_click\"");
		assert_eq!(serde_json::to_string(&EventName::Custom("cv_download".into())).unwrap(), "\"cv_download\"");

		let parsed: EventName = serde_json::from_str("\"section_scroll\"").unwrap();
		assert_eq!(parsed, EventName::SectionScroll);
	}

	#[test]
	fn test_custom_name_matching_known_name_collapses() {
		assert_eq!(EventName::from("click"), EventName::Click);
		assert_eq!(EventName::from("newsletter"), EventName::Custom("newsletter".into()));
	}

	#[test]
	fn test_capture_truncates_text_to_exact_limit() {
		let long = "x".repeat(600);
		let event = TelemetryEvent::capture(EventName::Click, EventFields::new().element_text(long), "/", MAX_ELEMENT_TEXT_CHARS);

		assert_eq!(event.element_text.chars().count(), 512);
	}

	#[test]
	fn test_truncate_respects_char_boundaries() {
		let text = "ção".repeat(300);
		let cut = truncate_chars(&text, 512);

		assert_eq!(cut.chars().count(), 512);
		assert!(text.starts_with(&cut));
	}

	#[test]
	fn test_capture_falls_back_to_current_path() {
		let event = TelemetryEvent::capture(EventName::PageView, EventFields::new().page_path(""), "/blog", 512);
		assert_eq!(event.page_path, "/blog");

		let event = TelemetryEvent::capture(EventName::PageView, EventFields::new().page_path("/about"), "/blog", 512);
		assert_eq!(event.page_path, "/about");
	}

	#[test]
	fn test_envelope_shape() {
		let event = TelemetryEvent::capture(EventName::PageView, EventFields::new().meta("referrer", ""), "/", 512);
		let json = serde_json::to_value(TrackRequest { events: vec![event] }).unwrap();

		let first = &json["events"][0];
		assert_eq!(first["event_name"], "page_view");
		assert_eq!(first["page_path"], "/");
		assert_eq!(first["element_id"], "");
		assert_eq!(first["metadata"]["referrer"], "");
		assert!(first["occurred_at"].as_str().unwrap().contains('T'));
	}
}

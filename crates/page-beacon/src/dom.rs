//! Minimal document model the producers work against.
//!
//! The host environment translates its real DOM nodes into [`Element`]s; the
//! producers only ever read tag name, id, class list, text content and
//! attributes.

use crate::error::{BeaconError, Result};
use std::collections::BTreeMap;
use url::Url;

/// Custom event name for a clicked element.
pub const ATTR_EVENT: &str = "data-analytics-event";
/// Overrides the recorded target URL.
pub const ATTR_TARGET: &str = "data-analytics-target";
/// Overrides the recorded label text.
pub const ATTR_LABEL: &str = "data-analytics-label";
/// Overrides the recorded element id.
pub const ATTR_ID: &str = "data-analytics-id";
/// Overrides the recorded page path.
pub const ATTR_PATH: &str = "data-analytics-path";
/// Marks an arbitrary element as click-trackable.
pub const ATTR_TRACK: &str = "data-analytics-track";
/// Marks a container as a visibility-tracked section; the value is its label.
pub const ATTR_SECTION: &str = "data-analytics-section";

const ATTR_PREFIX: &str = "data-analytics-";
const SECTION_CLASS: &str = "snap-section";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
	pub tag: String,
	pub id: String,
	pub class_name: String,
	pub text: String,
	pub attributes: BTreeMap<String, String>,
}

impl Element {
	#[must_use]
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = id.into();
		self
	}

	#[must_use]
	pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
		self.class_name = class_name.into();
		self
	}

	#[must_use]
	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = text.into();
		self
	}

	#[must_use]
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	#[must_use]
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Attribute value, treating a blank value as absent
	#[must_use]
	pub fn declared(&self, name: &str) -> Option<&str> {
		self.attr(name).map(str::trim).filter(|v| !v.is_empty())
	}

	#[must_use]
	pub fn has_class(&self, class: &str) -> bool {
		self.class_name.split_whitespace().any(|c| c == class)
	}

	/// Whether the element matches `a, button, [data-analytics-event], [data-analytics-track]`.
	#[must_use]
	pub fn is_trackable(&self) -> bool {
		self.tag.eq_ignore_ascii_case("a") || self.tag.eq_ignore_ascii_case("button") || self.attributes.contains_key(ATTR_EVENT) || self.attributes.contains_key(ATTR_TRACK)
	}

	#[must_use]
	pub fn is_tracked_section(&self) -> bool {
		self.attributes.contains_key(ATTR_SECTION) || self.has_class(SECTION_CLASS)
	}

	/// Whether any `data-analytics-*` attribute is present.
	#[must_use]
	pub fn has_tracking_attributes(&self) -> bool {
		self.attributes.keys().any(|k| k.starts_with(ATTR_PREFIX))
	}

	/// Label recorded when this section becomes visible.
	#[must_use]
	pub fn section_label(&self) -> &str {
		self.declared(ATTR_SECTION).or_else(|| Some(self.id.trim()).filter(|id| !id.is_empty())).unwrap_or(SECTION_CLASS)
	}
}

/// First trackable element along a click's propagation path (target first).
#[must_use]
pub fn closest_trackable(path: &[Element]) -> Option<&Element> {
	path.iter().find(|el| el.is_trackable())
}

/// Where the page currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
	url: Url,
}

impl Location {
	pub fn parse(href: &str) -> Result<Self> {
		let url = Url::parse(href).map_err(|source| BeaconError::InvalidUrl { input: href.to_string(), source })?;
		Ok(Self { url })
	}

	#[must_use]
	pub fn pathname(&self) -> &str {
		self.url.path()
	}

	/// Serialized origin, e.g. `https://example.com`
	#[must_use]
	pub fn origin(&self) -> String {
		self.url.origin().ascii_serialization()
	}

	#[must_use]
	pub const fn url(&self) -> &Url {
		&self.url
	}

	/// Resolve `endpoint` against the page the way a relative `fetch` would.
	pub fn resolve(&self, endpoint: &str) -> Result<Url> {
		self.url.join(endpoint).map_err(|source| BeaconError::InvalidUrl { input: endpoint.to_string(), source })
	}

	/// Whether `href` is an absolute http(s) URL on a different origin.
	///
	/// Relative links, fragments and non-http schemes (`mailto:`, `tel:`) are
	/// never outbound.
	#[must_use]
	pub fn is_outbound(&self, href: &str) -> bool {
		match Url::parse(href.trim()) {
			Ok(target) => matches!(target.scheme(), "http" | "https") && target.origin() != self.url.origin(),
			Err(_) => false,
		}
	}
}

//! Event producers.
//!
//! Each producer turns one observation from the page into an event name plus
//! its fields. They never fail: missing or malformed attributes fall back to
//! the element's own values or to empty strings.

use crate::config::OutboundPolicy;
use crate::dom::{closest_trackable, Element, Location, ATTR_EVENT, ATTR_ID, ATTR_LABEL, ATTR_PATH, ATTR_TARGET};
use crate::environment::IntersectionEntry;
use crate::event::{EventFields, EventName};

pub type Produced = (EventName, EventFields);

/// The single page view recorded when a session starts.
#[must_use]
pub fn page_view(location: &Location, referrer: &str) -> Produced {
	let fields = EventFields::new().page_path(location.pathname()).meta("referrer", referrer);
	(EventName::PageView, fields)
}

/// Resolve a delegated click. `path` is the propagation path, target first.
///
/// Returns `None` when nothing along the path is trackable.
#[must_use]
pub fn click(path: &[Element], location: &Location, policy: OutboundPolicy) -> Option<Produced> {
	let el = closest_trackable(path)?;

	let href = el.attr("href").unwrap_or_default();
	let declared_name = el.declared(ATTR_EVENT);
	let outbound = location.is_outbound(href);

	let name = match (policy, declared_name) {
		(OutboundPolicy::OutboundWins, _) if outbound => EventName::OutboundClick,
		(_, Some(custom)) => EventName::from(custom),
		(OutboundPolicy::DeclaredNameWins, None) if outbound && !el.has_tracking_attributes() => EventName::OutboundClick,
		_ => EventName::Click,
	};

	let fields = EventFields::new()
		.page_path(el.declared(ATTR_PATH).unwrap_or_else(|| location.pathname()))
		.element_id(el.declared(ATTR_ID).unwrap_or(el.id.as_str()))
		.element_text(el.declared(ATTR_LABEL).unwrap_or_else(|| el.text.trim()))
		.target_url(el.declared(ATTR_TARGET).unwrap_or(href))
		.meta("tag", el.tag.to_lowercase())
		.meta("class_name", el.class_name.clone());

	Some((name, fields))
}

/// A section crossing into view. Entries leaving the viewport produce nothing.
#[must_use]
pub fn section_visible(entry: &IntersectionEntry, location: &Location) -> Option<Produced> {
	if !entry.is_intersecting {
		return None;
	}

	let fields = EventFields::new().page_path(location.pathname()).element_id(entry.target.section_label());
	Some((EventName::SectionScroll, fields))
}

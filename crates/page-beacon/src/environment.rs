//! Capabilities a page session needs from its host.
//!
//! A browser binding implements [`Environment`] by forwarding DOM listeners
//! into the [`SignalSender`] it is handed; tests use
//! [`SimulatedPage`](crate::simulated::SimulatedPage).

use crate::dom::{Element, Location};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Name of the meta tag that opts a page out of telemetry.
pub const OPT_OUT_META: &str = "analytics-enabled";

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSignal {
	/// A click, with its propagation path (target first)
	Click(Vec<Element>),
	VisibilityHidden,
	Unload,
	Intersection(Vec<IntersectionEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
	pub target: Element,
	pub is_intersecting: bool,
}

impl IntersectionEntry {
	#[must_use]
	pub const fn new(target: Element, is_intersecting: bool) -> Self {
		Self { target, is_intersecting }
	}
}

pub type SignalSender = mpsc::UnboundedSender<PageSignal>;
pub type SignalReceiver = mpsc::UnboundedReceiver<PageSignal>;

/// A fire-and-forget request that outlives page navigation.
pub trait BeaconSink: Send + Sync {
	/// Queue `body` for delivery to `url`. Returns `false` if the host refused
	/// to queue it; nothing is ever reported after that.
	fn send_beacon(&self, url: &str, body: Bytes, content_type: &str) -> bool;
}

pub trait Environment: Send + 'static {
	fn location(&self) -> Location;

	fn referrer(&self) -> String;

	/// `content` of `<meta name="...">`, if the tag exists.
	fn meta_content(&self, name: &str) -> Option<String>;

	/// Beacon capability, when the host has one.
	fn beacon(&self) -> Option<Arc<dyn BeaconSink>>;

	/// `Cookie` header sent with same-origin requests.
	fn credentials(&self) -> Option<String> {
		None
	}

	/// Sections present in the document right now.
	fn trackable_sections(&self) -> Vec<Element>;

	/// Register a delegated click listener on the document root.
	fn on_click(&mut self, tx: SignalSender);

	/// Register for visibility transitions to hidden.
	fn on_visibility_hidden(&mut self, tx: SignalSender);

	fn on_unload(&mut self, tx: SignalSender);

	/// Observe `sections`, reporting each crossing of `threshold`.
	fn observe_intersection(&mut self, sections: Vec<Element>, threshold: f64, tx: SignalSender);

	/// Telemetry is on unless the opt-out meta tag says exactly `false`.
	fn analytics_enabled(&self) -> bool {
		self.meta_content(OPT_OUT_META).as_deref() != Some("false")
	}
}

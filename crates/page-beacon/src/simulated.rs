//! In-memory page for driving a session without a browser.
//!
//! [`SimulatedPage`] is the [`Environment`]; a cloneable [`PageHandle`] plays
//! the user (clicks, scrolling, tab switches, navigation) and records every
//! beacon the session sends.

use crate::dom::{Element, Location};
use crate::environment::{BeaconSink, Environment, IntersectionEntry, PageSignal, SignalSender};
use crate::error::Result;
use crate::event::{TelemetryEvent, TrackRequest};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// One beacon handed to the simulated host.
#[derive(Debug, Clone)]
pub struct Delivery {
	pub url: String,
	pub content_type: String,
	pub body: Bytes,
}

impl Delivery {
	pub fn events(&self) -> serde_json::Result<Vec<TelemetryEvent>> {
		serde_json::from_slice::<TrackRequest>(&self.body).map(|r| r.events)
	}
}

struct ObservedSection {
	element: Element,
	threshold: f64,
	visible: bool,
	tx: SignalSender,
}

#[derive(Default)]
struct PageState {
	sections: Vec<Element>,
	click: Vec<SignalSender>,
	hidden: Vec<SignalSender>,
	unload: Vec<SignalSender>,
	observed: Vec<ObservedSection>,
	deliveries: Vec<Delivery>,
}

struct Shared {
	state: Mutex<PageState>,
	delivered: watch::Sender<usize>,
}

impl Shared {
	fn lock(&self) -> MutexGuard<'_, PageState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

struct SimulatedBeacon {
	shared: Arc<Shared>,
}

impl BeaconSink for SimulatedBeacon {
	fn send_beacon(&self, url: &str, body: Bytes, content_type: &str) -> bool {
		let count = {
			let mut state = self.shared.lock();
			state.deliveries.push(Delivery {
				url: url.to_string(),
				content_type: content_type.to_string(),
				body,
			});
			state.deliveries.len()
		};
		self.shared.delivered.send_replace(count);
		true
	}
}

pub struct SimulatedPage {
	location: Location,
	referrer: String,
	meta: HashMap<String, String>,
	credentials: Option<String>,
	beacon: bool,
	shared: Arc<Shared>,
}

impl SimulatedPage {
	pub fn new(href: &str) -> Result<Self> {
		let (delivered, _) = watch::channel(0);
		Ok(Self {
			location: Location::parse(href)?,
			referrer: String::new(),
			meta: HashMap::new(),
			credentials: None,
			beacon: true,
			shared: Arc::new(Shared {
				state: Mutex::new(PageState::default()),
				delivered,
			}),
		})
	}

	#[must_use]
	pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
		self.referrer = referrer.into();
		self
	}

	#[must_use]
	pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
		self.meta.insert(name.into(), content.into());
		self
	}

	#[must_use]
	pub fn with_credentials(mut self, cookie: impl Into<String>) -> Self {
		self.credentials = Some(cookie.into());
		self
	}

	/// Host without a beacon capability, forcing the keep-alive fallback.
	#[must_use]
	pub const fn without_beacon(mut self) -> Self {
		self.beacon = false;
		self
	}

	#[must_use]
	pub fn with_section(self, section: Element) -> Self {
		self.shared.lock().sections.push(section);
		self
	}

	#[must_use]
	pub fn handle(&self) -> PageHandle {
		PageHandle { shared: self.shared.clone() }
	}
}

impl Environment for SimulatedPage {
	fn location(&self) -> Location {
		self.location.clone()
	}

	fn referrer(&self) -> String {
		self.referrer.clone()
	}

	fn meta_content(&self, name: &str) -> Option<String> {
		self.meta.get(name).cloned()
	}

	fn beacon(&self) -> Option<Arc<dyn BeaconSink>> {
		self.beacon.then(|| Arc::new(SimulatedBeacon { shared: self.shared.clone() }) as Arc<dyn BeaconSink>)
	}

	fn credentials(&self) -> Option<String> {
		self.credentials.clone()
	}

	fn trackable_sections(&self) -> Vec<Element> {
		self.shared.lock().sections.clone()
	}

	fn on_click(&mut self, tx: SignalSender) {
		self.shared.lock().click.push(tx);
	}

	fn on_visibility_hidden(&mut self, tx: SignalSender) {
		self.shared.lock().hidden.push(tx);
	}

	fn on_unload(&mut self, tx: SignalSender) {
		self.shared.lock().unload.push(tx);
	}

	fn observe_intersection(&mut self, sections: Vec<Element>, threshold: f64, tx: SignalSender) {
		let mut state = self.shared.lock();
		for element in sections {
			state.observed.push(ObservedSection {
				element,
				threshold,
				visible: false,
				tx: tx.clone(),
			});
		}
	}
}

/// Drives a [`SimulatedPage`] after it has been moved into a session.
#[derive(Clone)]
pub struct PageHandle {
	shared: Arc<Shared>,
}

fn notify(listeners: &[SignalSender], signal: &PageSignal) -> usize {
	listeners.iter().filter(|tx| tx.send(signal.clone()).is_ok()).count()
}

impl PageHandle {
	/// Click `path` (target first). Returns how many listeners saw it.
	pub fn click(&self, path: Vec<Element>) -> usize {
		notify(&self.shared.lock().click, &PageSignal::Click(path))
	}

	/// Switch to another tab.
	pub fn hide(&self) -> usize {
		notify(&self.shared.lock().hidden, &PageSignal::VisibilityHidden)
	}

	pub fn unload(&self) -> usize {
		notify(&self.shared.lock().unload, &PageSignal::Unload)
	}

	/// Scroll so that `ratio` of the section labelled `label` is visible.
	///
	/// Only sections observed at session start report, and only when the
	/// ratio crosses their threshold.
	pub fn scroll_to(&self, label: &str, ratio: f64) -> usize {
		let mut state = self.shared.lock();
		let mut reported = 0;
		for section in state.observed.iter_mut().filter(|s| s.element.section_label() == label) {
			let visible = ratio >= section.threshold;
			if visible == section.visible {
				continue;
			}
			section.visible = visible;

			let entry = IntersectionEntry::new(section.element.clone(), visible);
			if section.tx.send(PageSignal::Intersection(vec![entry])).is_ok() {
				reported += 1;
			}
		}
		reported
	}

	/// Remove every registered listener, as a host tearing down its DOM
	/// bindings would.
	pub fn detach_listeners(&self) {
		let mut state = self.shared.lock();
		state.click.clear();
		state.hidden.clear();
		state.unload.clear();
		state.observed.clear();
	}

	/// Insert a section after the session started.
	pub fn add_section(&self, section: Element) {
		self.shared.lock().sections.push(section);
	}

	#[must_use]
	pub fn deliveries(&self) -> Vec<Delivery> {
		self.shared.lock().deliveries.clone()
	}

	/// Every event delivered so far, in delivery order.
	#[must_use]
	pub fn delivered_events(&self) -> Vec<TelemetryEvent> {
		self.deliveries().iter().filter_map(|d| d.events().ok()).flatten().collect()
	}

	/// Wait until at least `count` beacons were delivered.
	pub async fn wait_for_deliveries(&self, count: usize) {
		let mut rx = self.shared.delivered.subscribe();
		// The sender lives in `shared`, which this handle keeps alive.
		let _ = rx.wait_for(|delivered| *delivered >= count).await;
	}
}

use crate::config::BeaconConfig;
use crate::dom::{Element, Location};
use crate::environment::IntersectionEntry;
use crate::event::{EventFields, EventName, TelemetryEvent, TrackRequest};
use crate::producers::{self, Produced};
use crate::queue::EventQueue;
use crate::transport::{Transport, TransportKind};
use bytes::Bytes;
use std::sync::Arc;

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
	BatchFull,
	Timer,
	VisibilityHidden,
	Unload,
	Manual,
}

/// A batch that was handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
	pub trigger: FlushTrigger,
	pub sent: usize,
	/// Events still queued after this batch
	pub remaining: usize,
	pub transport: TransportKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
	pub enqueued: u64,
	pub sent: u64,
	pub batches: u64,
	/// Evicted by a queue cap
	pub evicted: u64,
	/// Still pending when the client was disposed
	pub discarded: u64,
}

/// Page-lifetime telemetry state: one queue, one transport.
///
/// Owned by a single task; every mutation happens through `&mut self`, so two
/// triggers can never drain the same event.
pub struct TelemetryClient {
	config: BeaconConfig,
	location: Location,
	queue: EventQueue,
	transport: Arc<dyn Transport>,
	enabled: bool,
	disposed: bool,
	stats: ClientStats,
}

impl TelemetryClient {
	#[must_use]
	pub fn new(config: BeaconConfig, location: Location, transport: Arc<dyn Transport>, enabled: bool) -> Self {
		Self {
			queue: EventQueue::new(config.queue_limit),
			config,
			location,
			transport,
			enabled,
			disposed: false,
			stats: ClientStats::default(),
		}
	}

	fn accepting(&self) -> bool {
		self.enabled && !self.disposed
	}

	/// Queue an event, flushing right away once a full batch is pending.
	pub fn enqueue(&mut self, name: EventName, fields: EventFields) -> Option<FlushReport> {
		if !self.accepting() {
			return None;
		}

		let event = TelemetryEvent::capture(name, fields, self.location.pathname(), self.config.max_text_chars);
		let len = self.queue.enqueue(event);
		self.stats.enqueued += 1;
		self.stats.evicted = self.queue.evicted();

		if len >= self.config.max_batch_size {
			return self.flush(FlushTrigger::BatchFull);
		}
		None
	}

	/// Drain at most one batch and hand it to the transport.
	///
	/// No-op when disabled, disposed, or empty.
	pub fn flush(&mut self, trigger: FlushTrigger) -> Option<FlushReport> {
		if !self.accepting() || self.queue.is_empty() {
			return None;
		}

		let events = self.queue.drain(self.config.max_batch_size);
		let sent = events.len();

		let payload = match serde_json::to_vec(&TrackRequest { events }) {
			Ok(payload) => Bytes::from(payload),
			Err(e) => {
				tracing::warn!(error = %e, sent, "dropping unserializable telemetry batch");
				return None;
			}
		};

		self.transport.send(payload);
		self.stats.sent += sent as u64;
		self.stats.batches += 1;

		let report = FlushReport {
			trigger,
			sent,
			remaining: self.queue.len(),
			transport: self.transport.kind(),
		};
		tracing::debug!(?trigger, sent, remaining = report.remaining, "telemetry batch flushed");
		Some(report)
	}

	/// End the client. Pending events are discarded and counted; later calls
	/// are no-ops.
	pub fn dispose(&mut self) -> usize {
		if self.disposed {
			return 0;
		}
		self.disposed = true;

		let dropped = self.queue.clear();
		self.stats.discarded += dropped as u64;
		if dropped > 0 {
			tracing::debug!(dropped, "telemetry client disposed with pending events");
		}
		dropped
	}

	fn record(&mut self, produced: Option<Produced>) -> Option<FlushReport> {
		let (name, fields) = produced?;
		self.enqueue(name, fields)
	}

	pub fn track_page_view(&mut self, referrer: &str) -> Option<FlushReport> {
		let produced = producers::page_view(&self.location, referrer);
		self.record(Some(produced))
	}

	/// Handle a delegated click; `path` is target first.
	pub fn track_click(&mut self, path: &[Element]) -> Option<FlushReport> {
		let produced = producers::click(path, &self.location, self.config.outbound_policy);
		self.record(produced)
	}

	pub fn track_intersections(&mut self, entries: &[IntersectionEntry]) -> Vec<FlushReport> {
		let mut reports = Vec::new();
		for entry in entries {
			let produced = producers::section_visible(entry, &self.location);
			reports.extend(self.record(produced));
		}
		reports
	}

	#[must_use]
	pub fn pending(&self) -> usize {
		self.queue.len()
	}

	#[must_use]
	pub const fn is_enabled(&self) -> bool {
		self.enabled
	}

	#[must_use]
	pub fn transport_kind(&self) -> TransportKind {
		self.transport.kind()
	}

	#[must_use]
	pub const fn is_disposed(&self) -> bool {
		self.disposed
	}

	#[must_use]
	pub const fn stats(&self) -> ClientStats {
		self.stats
	}

	#[must_use]
	pub const fn config(&self) -> &BeaconConfig {
		&self.config
	}

	#[must_use]
	pub const fn location(&self) -> &Location {
		&self.location
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::QueueLimit;
	use std::collections::HashSet;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingTransport {
		batches: Mutex<Vec<TrackRequest>>,
	}

	impl RecordingTransport {
		fn batches(&self) -> Vec<TrackRequest> {
			self.batches.lock().unwrap().clone()
		}
	}

	impl Transport for RecordingTransport {
		fn kind(&self) -> TransportKind {
			TransportKind::Beacon
		}

		fn send(&self, payload: Bytes) {
			let batch = serde_json::from_slice(&payload).unwrap();
			self.batches.lock().unwrap().push(batch);
		}
	}

	fn client_with(config: BeaconConfig, enabled: bool) -> (TelemetryClient, Arc<RecordingTransport>) {
		let transport = Arc::new(RecordingTransport::default());
		let location = Location::parse("https://fabio.dev/").unwrap();
		(TelemetryClient::new(config, location, transport.clone(), enabled), transport)
	}

	fn button(i: usize) -> Vec<Element> {
		vec![Element::new("button").with_id(format!("btn-{i}")).with_text("Contact")]
	}

	#[test]
	fn test_twentieth_enqueue_flushes_immediately() {
		let (mut client, transport) = client_with(BeaconConfig::default(), true);

		for i in 0..19 {
			assert!(client.track_click(&button(i)).is_none());
		}
		assert!(transport.batches().is_empty());

		let report = client.track_click(&button(19)).unwrap();
		assert_eq!(report.trigger, FlushTrigger::BatchFull);
		assert_eq!(report.sent, 20);
		assert_eq!(report.remaining, 0);
		assert_eq!(transport.batches().len(), 1);
	}

	#[test]
	fn test_twenty_five_clicks_take_two_flushes() {
		let (mut client, transport) = client_with(BeaconConfig::default(), true);

		for i in 0..25 {
			client.track_click(&button(i));
		}
		assert_eq!(client.pending(), 5);

		let report = client.flush(FlushTrigger::Timer).unwrap();
		assert_eq!(report.sent, 5);

		let batches = transport.batches();
		assert_eq!(batches.len(), 2);
		assert_eq!(batches[0].events.len(), 20);
		assert_eq!(batches[1].events.len(), 5);

		let ids: Vec<String> = batches.iter().flat_map(|b| b.events.iter().map(|e| e.element_id.clone())).collect();
		let unique: HashSet<&String> = ids.iter().collect();
		assert_eq!(ids.len(), 25);
		assert_eq!(unique.len(), 25);
		assert_eq!(ids.first().map(String::as_str), Some("btn-0"));
		assert_eq!(ids.last().map(String::as_str), Some("btn-24"));
	}

	#[test]
	fn test_batch_size_is_configurable() {
		let config = BeaconConfig {
			max_batch_size: 2,
			..BeaconConfig::default()
		};
		let (mut client, transport) = client_with(config, true);
		client.track_click(&button(0));
		client.track_click(&button(1));
		client.track_click(&button(2));

		assert_eq!(transport.batches().len(), 1);
		assert_eq!(client.pending(), 1);
		assert_eq!(client.flush(FlushTrigger::Manual).unwrap().sent, 1);
		assert!(client.flush(FlushTrigger::Manual).is_none());
	}

	#[test]
	fn test_disabled_client_never_enqueues_or_sends() {
		let (mut client, transport) = client_with(BeaconConfig::default(), false);

		client.track_page_view("");
		for i in 0..40 {
			client.track_click(&button(i));
		}

		assert_eq!(client.pending(), 0);
		assert!(client.flush(FlushTrigger::Unload).is_none());
		assert!(transport.batches().is_empty());
		assert_eq!(client.stats(), ClientStats::default());
	}

	#[test]
	fn test_empty_flush_is_noop() {
		let (mut client, transport) = client_with(BeaconConfig::default(), true);
		assert!(client.flush(FlushTrigger::Timer).is_none());
		assert!(transport.batches().is_empty());
	}

	#[test]
	fn test_dispose_discards_pending() {
		let (mut client, transport) = client_with(BeaconConfig::default(), true);
		client.track_page_view("https://google.com/");
		client.track_click(&button(1));

		assert_eq!(client.dispose(), 2);
		assert!(client.is_disposed());
		assert!(client.track_click(&button(2)).is_none());
		assert!(client.flush(FlushTrigger::Manual).is_none());
		assert!(transport.batches().is_empty());
		assert_eq!(client.stats().discarded, 2);
		assert_eq!(client.dispose(), 0);
	}

	#[test]
	fn test_capped_queue_counts_evictions() {
		let config = BeaconConfig {
			queue_limit: QueueLimit::DropOldest(3),
			..BeaconConfig::default()
		};
		let (mut client, _transport) = client_with(config, true);
		for i in 0..5 {
			client.track_click(&button(i));
		}

		assert_eq!(client.pending(), 3);
		assert_eq!(client.stats().evicted, 2);
	}

	#[test]
	fn test_page_view_event_contents() {
		let (mut client, transport) = client_with(BeaconConfig::default(), true);
		client.track_page_view("https://duckduckgo.com/");
		client.flush(FlushTrigger::Manual);

		let event = &transport.batches()[0].events[0];
		assert_eq!(event.event_name, EventName::PageView);
		assert_eq!(event.page_path, "/");
		assert_eq!(event.metadata["referrer"], "https://duckduckgo.com/");
	}
}

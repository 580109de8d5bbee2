use crate::event::MAX_ELEMENT_TEXT_CHARS;
use std::time::Duration;

/// Path of the collection endpoint on the page's own origin.
pub const DEFAULT_ENDPOINT: &str = "/api/v1/analytics/track";

/// How a declared custom event name and outbound-link detection interact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutboundPolicy {
	/// A declared `data-analytics-event` always wins. Outbound detection only
	/// applies to plain links that carry no `data-analytics-*` attribute.
	#[default]
	DeclaredNameWins,
	/// Any link to another origin is recorded as `outbound_click`, whatever
	/// name the element declares.
	OutboundWins,
}

/// Growth policy of the pending-event queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueLimit {
	/// Grow for the page lifetime if every flush is lost.
	#[default]
	Unbounded,
	/// Evict the oldest pending event once this many are queued. A cap of
	/// zero never evicts. A cap below `max_batch_size` means the queue never
	/// reaches the batch size, so only the timer and page signals flush it;
	/// [`BeaconConfig::from_env`] refuses such caps.
	DropOldest(usize),
}

/// Tuning for a page session
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconConfig {
	/// Collection endpoint, absolute or relative to the page origin
	pub endpoint: String,
	/// Queue length that triggers an immediate flush, and the batch size
	pub max_batch_size: usize,
	/// Period of the flush timer
	pub flush_interval: Duration,
	/// Characters kept in `element_text`
	pub max_text_chars: usize,
	/// Fraction of a section that must be visible to count as seen
	pub visibility_threshold: f64,
	pub outbound_policy: OutboundPolicy,
	pub queue_limit: QueueLimit,
}

impl BeaconConfig {
	/// Load configuration from environment variables with sensible defaults
	#[must_use]
	pub fn from_env() -> Self {
		let defaults = Self::default();
		let max_batch_size = std::env::var("BEACON_MAX_BATCH_SIZE")
			.ok()
			.and_then(|b| b.parse().ok())
			.filter(|b| *b > 0)
			.unwrap_or(defaults.max_batch_size);
		let queue_limit = match std::env::var("BEACON_QUEUE_CAP").ok().and_then(|c| c.parse::<usize>().ok()) {
			Some(cap) if cap >= max_batch_size => QueueLimit::DropOldest(cap),
			Some(cap) => {
				tracing::warn!(cap, max_batch_size, "BEACON_QUEUE_CAP below batch size ignored, queue stays unbounded");
				defaults.queue_limit
			}
			None => defaults.queue_limit,
		};
		let outbound_policy = match std::env::var("BEACON_OUTBOUND_POLICY").as_deref() {
			Ok("outbound_wins") => OutboundPolicy::OutboundWins,
			_ => defaults.outbound_policy,
		};

		Self {
			endpoint: std::env::var("BEACON_ENDPOINT").unwrap_or(defaults.endpoint),
			max_batch_size,
			flush_interval: std::env::var("BEACON_FLUSH_INTERVAL_MS")
				.ok()
				.and_then(|i| i.parse().ok())
				.filter(|i| *i > 0)
				.map_or(defaults.flush_interval, Duration::from_millis),
			max_text_chars: defaults.max_text_chars,
			visibility_threshold: defaults.visibility_threshold,
			outbound_policy,
			queue_limit,
		}
	}
}

impl Default for BeaconConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
			max_batch_size: 20,
			flush_interval: Duration::from_millis(5000),
			max_text_chars: MAX_ELEMENT_TEXT_CHARS,
			visibility_threshold: 0.6,
			outbound_policy: OutboundPolicy::default(),
			queue_limit: QueueLimit::default(),
		}
	}
}

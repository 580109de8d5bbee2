use crate::config::QueueLimit;
use crate::event::TelemetryEvent;
use std::collections::VecDeque;

/// FIFO buffer of events waiting for a flush.
#[derive(Debug, Default)]
pub struct EventQueue {
	events: VecDeque<TelemetryEvent>,
	limit: QueueLimit,
	evicted: u64,
}

impl EventQueue {
	#[must_use]
	pub fn new(limit: QueueLimit) -> Self {
		Self {
			events: VecDeque::new(),
			limit,
			evicted: 0,
		}
	}

	/// Append to the tail and return the new length.
	pub fn enqueue(&mut self, event: TelemetryEvent) -> usize {
		if let QueueLimit::DropOldest(cap) = self.limit {
			while cap > 0 && self.events.len() >= cap {
				self.events.pop_front();
				self.evicted += 1;
			}
		}

		self.events.push_back(event);
		self.events.len()
	}

	/// Remove and return up to `n` events from the head, oldest first.
	pub fn drain(&mut self, n: usize) -> Vec<TelemetryEvent> {
		let take = n.min(self.events.len());
		self.events.drain(..take).collect()
	}

	/// Throw away everything still pending, returning how many were dropped.
	pub fn clear(&mut self) -> usize {
		let dropped = self.events.len();
		self.events.clear();
		dropped
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.events.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Events evicted by a [`QueueLimit::DropOldest`] cap
	#[must_use]
	pub const fn evicted(&self) -> u64 {
		self.evicted
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::{EventFields, EventName};

	fn event(id: &str) -> TelemetryEvent {
		TelemetryEvent::capture(EventName::Click, EventFields::new().element_id(id), "/", 512)
	}

	fn ids(events: &[TelemetryEvent]) -> Vec<&str> {
		events.iter().map(|e| e.element_id.as_str()).collect()
	}

	#[test]
	fn test_drain_preserves_enqueue_order() {
		let mut queue = EventQueue::default();
		for id in ["a", "b", "c", "d", "e"] {
			queue.enqueue(event(id));
		}

		let first = queue.drain(2);
		let second = queue.drain(10);

		assert_eq!(ids(&first), vec!["a", "b"]);
		assert_eq!(ids(&second), vec!["c", "d", "e"]);
		assert!(queue.is_empty());
	}

	#[test]
	fn test_drain_more_than_available() {
		let mut queue = EventQueue::default();
		queue.enqueue(event("only"));

		assert_eq!(queue.drain(20).len(), 1);
		assert!(queue.drain(20).is_empty());
	}

	#[test]
	fn test_unbounded_queue_keeps_growing() {
		// No cap by default: if every flush is lost the queue just grows.
		let mut queue = EventQueue::new(QueueLimit::Unbounded);
		for i in 0..1_000 {
			queue.enqueue(event(&i.to_string()));
		}

		assert_eq!(queue.len(), 1_000);
		assert_eq!(queue.evicted(), 0);
	}

	#[test]
	fn test_drop_oldest_cap() {
		let mut queue = EventQueue::new(QueueLimit::DropOldest(3));
		for id in ["a", "b", "c", "d", "e"] {
			queue.enqueue(event(id));
		}

		assert_eq!(queue.len(), 3);
		assert_eq!(queue.evicted(), 2);
		assert_eq!(ids(&queue.drain(3)), vec!["c", "d", "e"]);
	}

	#[test]
	fn test_zero_cap_never_evicts() {
		let mut queue = EventQueue::new(QueueLimit::DropOldest(0));
		for id in ["a", "b", "c"] {
			queue.enqueue(event(id));
		}

		assert_eq!(queue.len(), 3);
		assert_eq!(queue.evicted(), 0);
	}

	#[test]
	fn test_clear_reports_dropped() {
		let mut queue = EventQueue::default();
		queue.enqueue(event("a"));
		queue.enqueue(event("b"));

		assert_eq!(queue.clear(), 2);
		assert!(queue.is_empty());
	}
}

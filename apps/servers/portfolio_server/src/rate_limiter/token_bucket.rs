use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

pub const WINDOW_MILLIS: u64 = 60_000;

/// Allows `max_tokens` requests per minute, refilled continuously.
///
/// The bucket has no clock of its own: callers pass milliseconds since the
/// bucket was created.
pub struct TokenBucketRateLimiter {
	max_tokens: u32,
	tokens: AtomicU32,
	last_refill: AtomicU64,
}

impl TokenBucketRateLimiter {
	#[must_use]
	pub const fn new(max_tokens: u32) -> Self {
		Self {
			max_tokens,
			tokens: AtomicU32::new(max_tokens), // start with full bucket
			last_refill: AtomicU64::new(0),
		}
	}

	pub fn allow_request_at(&self, now: u64) -> bool {
		let last_refill = self.last_refill.load(Ordering::Relaxed);
		let time_elapsed = now.saturating_sub(last_refill);
		let tokens_to_add = time_elapsed * u64::from(self.max_tokens) / WINDOW_MILLIS;

		if tokens_to_add > 0 {
			// Advance only by the time converted into tokens.
			let consumed = tokens_to_add * WINDOW_MILLIS / u64::from(self.max_tokens);
			if self.last_refill.compare_exchange(last_refill, last_refill + consumed, Ordering::Relaxed, Ordering::Relaxed).is_ok() {
				let add = u32::try_from(tokens_to_add).unwrap_or(u32::MAX);
				let _ = self.tokens.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| Some(current.saturating_add(add).min(self.max_tokens)));
			}
		}

		self.tokens.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| current.checked_sub(1)).is_ok()
	}
}

use super::token_bucket::{TokenBucketRateLimiter, WINDOW_MILLIS};
use crate::error::PortfolioError;
use crate::handlers::analytics::client_ip;
use axum::extract::{ConnectInfo, State};
use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse, response::Response};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

struct ClientBucket {
	bucket: TokenBucketRateLimiter,
	created: u64,
	last_seen: AtomicU64,
}

/// One token bucket per client address.
///
/// A bucket untouched for a whole window has refilled completely, so it is
/// dropped and recreated on the client's next request.
pub struct ClientRateLimiter {
	max_tokens: u32,
	clients: DashMap<String, ClientBucket>,
	last_prune: AtomicU64,
	started: Instant,
}

impl ClientRateLimiter {
	#[must_use]
	pub fn new(max_tokens: u32) -> Self {
		Self {
			max_tokens,
			clients: DashMap::new(),
			last_prune: AtomicU64::new(0),
			started: Instant::now(),
		}
	}

	fn elapsed_millis(&self) -> u64 {
		u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
	}

	pub fn allow_request(&self, client: &str) -> bool {
		self.allow_request_at(client, self.elapsed_millis())
	}

	/// `now` is milliseconds since the limiter was created.
	pub fn allow_request_at(&self, client: &str, now: u64) -> bool {
		self.prune_idle(now);

		let entry = self.clients.entry(client.to_string()).or_insert_with(|| ClientBucket {
			bucket: TokenBucketRateLimiter::new(self.max_tokens),
			created: now,
			last_seen: AtomicU64::new(now),
		});
		entry.last_seen.store(now, Ordering::Relaxed);
		entry.bucket.allow_request_at(now.saturating_sub(entry.created))
	}

	/// Tracked client addresses
	#[must_use]
	pub fn len(&self) -> usize {
		self.clients.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	/// Runs at most once per window.
	fn prune_idle(&self, now: u64) {
		let last_prune = self.last_prune.load(Ordering::Relaxed);
		if now.saturating_sub(last_prune) < WINDOW_MILLIS {
			return;
		}
		if self.last_prune.compare_exchange(last_prune, now, Ordering::Relaxed, Ordering::Relaxed).is_err() {
			return;
		}

		let before = self.clients.len();
		self.clients.retain(|_, client| now.saturating_sub(client.last_seen.load(Ordering::Relaxed)) < WINDOW_MILLIS);
		tracing::debug!(pruned = before.saturating_sub(self.clients.len()), "idle rate limit buckets dropped");
	}
}

pub async fn rate_limit_middleware(State(limiter): State<Arc<ClientRateLimiter>>, request: Request<Body>, next: Next) -> Response {
	let peer = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| *addr);
	let client = client_ip(request.headers(), peer);

	if limiter.allow_request(&client) {
		next.run(request).await
	} else {
		tracing::warn!(path = request.uri().path(), "rate limit exceeded");
		PortfolioError::RateLimited.into_response()
	}
}

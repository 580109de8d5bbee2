//! Fire-and-forget delivery of serialized batches.
//!
//! Both transports share one contract: `send` returns immediately and never
//! reports failure. A lost batch stays lost.

use crate::environment::{BeaconSink, Environment};
use crate::error::Result;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use url::Url;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
	Beacon,
	KeepAlive,
}

pub trait Transport: Send + Sync {
	fn kind(&self) -> TransportKind;

	/// Hand `payload` off for delivery without waiting on it.
	fn send(&self, payload: Bytes);
}

/// Preferred transport: the host's beacon queue.
pub struct BeaconTransport {
	url: String,
	sink: Arc<dyn BeaconSink>,
}

impl BeaconTransport {
	#[must_use]
	pub fn new(url: &Url, sink: Arc<dyn BeaconSink>) -> Self {
		Self { url: url.to_string(), sink }
	}
}

impl Transport for BeaconTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::Beacon
	}

	fn send(&self, payload: Bytes) {
		let bytes = payload.len();
		if !self.sink.send_beacon(&self.url, payload, JSON_CONTENT_TYPE) {
			tracing::debug!(bytes, url = %self.url, "beacon refused batch");
		}
	}
}

/// Fallback transport: a pooled keep-alive `POST` spawned onto the runtime.
pub struct KeepAliveTransport {
	client: reqwest::Client,
	url: Url,
	credentials: Option<String>,
	runtime: Handle,
}

impl KeepAliveTransport {
	/// Must be called from inside a tokio runtime.
	pub fn new(url: Url, credentials: Option<String>) -> Result<Self> {
		let runtime = Handle::try_current()?;
		let client = reqwest::Client::builder().tcp_keepalive(Duration::from_secs(60)).pool_idle_timeout(Duration::from_secs(90)).build()?;

		Ok(Self { client, url, credentials, runtime })
	}
}

impl Transport for KeepAliveTransport {
	fn kind(&self) -> TransportKind {
		TransportKind::KeepAlive
	}

	fn send(&self, payload: Bytes) {
		let mut request = self.client.post(self.url.clone()).header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(payload);
		if let Some(cookie) = &self.credentials {
			request = request.header(COOKIE, cookie.as_str());
		}

		let url = self.url.clone();
		self.runtime.spawn(async move {
			match request.send().await {
				Ok(response) => tracing::trace!(status = %response.status(), %url, "telemetry batch delivered"),
				Err(e) => tracing::debug!(error = %e, %url, "telemetry batch lost"),
			}
		});
	}
}

/// Pick the beacon when the host has one, otherwise the keep-alive request.
///
/// Credentials only travel to an endpoint on the page's own origin.
pub fn select_transport<E>(env: &E, url: Url) -> Result<Arc<dyn Transport>>
where
	E: Environment + ?Sized,
{
	if let Some(sink) = env.beacon() {
		return Ok(Arc::new(BeaconTransport::new(&url, sink)));
	}

	let credentials = if url.origin() == env.location().url().origin() { env.credentials() } else { None };
	Ok(Arc::new(KeepAliveTransport::new(url, credentials)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RefusingSink {
		calls: Mutex<Vec<(String, usize, String)>>,
	}

	impl BeaconSink for RefusingSink {
		fn send_beacon(&self, url: &str, body: Bytes, content_type: &str) -> bool {
			self.calls.lock().unwrap().push((url.to_string(), body.len(), content_type.to_string()));
			false
		}
	}

	#[test]
	fn test_beacon_refusal_is_swallowed() {
		let sink = Arc::new(RefusingSink::default());
		let url = Url::parse("https://fabio.dev/api/v1/analytics/track").unwrap();
		let transport = BeaconTransport::new(&url, sink.clone());

		transport.send(Bytes::from_static(b"{\"events\":[]}"));

		let calls = sink.calls.lock().unwrap();
		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].0, "https://fabio.dev/api/v1/analytics/track");
		assert_eq!(calls[0].2, "application/json");
		assert_eq!(transport.kind(), TransportKind::Beacon);
	}

	#[test]
	fn test_keep_alive_needs_runtime() {
		let url = Url::parse("http://127.0.0.1:9/track").unwrap();
		assert!(KeepAliveTransport::new(url, None).is_err());
	}

	#[tokio::test]
	async fn test_keep_alive_failure_is_swallowed() {
		// Port 9 (discard) is closed on test hosts, so the request fails.
		let url = Url::parse("http://127.0.0.1:9/track").unwrap();
		let transport = KeepAliveTransport::new(url, Some("session=abc".into())).unwrap();

		transport.send(Bytes::from_static(b"{\"events\":[]}"));
		tokio::time::sleep(Duration::from_millis(50)).await;

		assert_eq!(transport.kind(), TransportKind::KeepAlive);
	}
}

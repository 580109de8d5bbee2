use crate::analytics::dto::TrackEventDto;
use crate::analytics::redact::{hash_identifier, redact_metadata};
use crate::metrics::{ANALYTICS_EVENTS_REJECTED_TOTAL, ANALYTICS_EVENTS_TOTAL};
use crate::Config;
use tracing::{info_span, instrument};

pub const DISABLED_MESSAGE: &str = "Analytics is disabled by configuration.";

/// Who sent a batch. The ip and user agent are logged only as salted digests.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
	pub request_id: String,
	pub ip: String,
	pub user_agent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestResult {
	pub accepted: usize,
	pub rejected: usize,
	pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyticsService {
	enabled: bool,
	log_events: bool,
	secret: String,
}

impl AnalyticsService {
	#[must_use]
	pub const fn new(enabled: bool, log_events: bool, secret: String) -> Self {
		Self { enabled, log_events, secret }
	}

	#[must_use]
	pub fn from_config(config: &Config) -> Self {
		Self::new(config.analytics_enabled, config.analytics_log_events, config.secret_key.clone())
	}

	#[must_use]
	pub const fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Count and log a validated batch.
	#[instrument(name = "analytics.ingest_batch", skip_all, fields(event_count = events.len(), request_id = %client.request_id))]
	pub fn ingest(&self, events: &[TrackEventDto], client: &ClientInfo) -> IngestResult {
		if !self.enabled {
			ANALYTICS_EVENTS_REJECTED_TOTAL.with_label_values(&["disabled"]).inc_by(events.len() as u64);
			return IngestResult {
				accepted: 0,
				rejected: events.len(),
				errors: vec![DISABLED_MESSAGE.to_string()],
			};
		}

		let _client = info_span!(
			"client",
			ip_hash = %hash_identifier(&self.secret, "client_ip", &client.ip),
			user_agent_hash = %hash_identifier(&self.secret, "user_agent", &client.user_agent)
		)
		.entered();

		for event in events {
			ANALYTICS_EVENTS_TOTAL.with_label_values(&[&event.event_name]).inc();

			if self.log_events {
				let metadata = serde_json::Value::Object(redact_metadata(&event.metadata));
				tracing::info!(
					event_name = %event.event_name,
					page_path = %event.page_path,
					request_id = %client.request_id,
					%metadata,
					"analytics event accepted"
				);
			}
		}

		IngestResult {
			accepted: events.len(),
			rejected: 0,
			errors: Vec::new(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::analytics::dto::TrackRequestDto;
	use serde_json::json;

	fn batch(names: &[&str]) -> Vec<TrackEventDto> {
		let events: Vec<_> = names.iter().map(|name| json!({ "event_name": name, "page_path": "/", "metadata": { "email": "a@b.c" } })).collect();
		serde_json::from_value::<TrackRequestDto>(json!({ "events": events })).unwrap().events
	}

	#[test]
	fn test_enabled_accepts_everything_and_counts() {
		let service = AnalyticsService::new(true, true, "salt".into());
		let before = ANALYTICS_EVENTS_TOTAL.with_label_values(&["contact_attempt"]).get();

		let result = service.ingest(&batch(&["contact_attempt", "contact_attempt", "click"]), &ClientInfo::default());

		assert_eq!(result, IngestResult { accepted: 3, rejected: 0, errors: vec![] });
		assert!(ANALYTICS_EVENTS_TOTAL.with_label_values(&["contact_attempt"]).get() >= before + 2);
	}

	#[derive(Clone, Default)]
	struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

	impl std::io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_logged_events_carry_redacted_metadata() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt().with_ansi(false).with_writer(move || writer.clone()).finish();
		let service = AnalyticsService::new(true, true, "salt".into());

		let result = tracing::subscriber::with_default(subscriber, || service.ingest(&batch(&["resume_download"]), &ClientInfo::default()));

		assert_eq!(result.accepted, 1);
		let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
		assert!(logs.contains("analytics event accepted"));
		assert!(logs.contains("resume_download"));
		assert!(logs.contains("[redacted]"));
		assert!(!logs.contains("a@b.c"));
	}

	#[test]
	fn test_disabled_rejects_whole_batch() {
		let service = AnalyticsService::new(false, true, "salt".into());
		assert!(!service.is_enabled());

		let result = service.ingest(&batch(&["page_view", "click"]), &ClientInfo::default());

		assert_eq!(result.accepted, 0);
		assert_eq!(result.rejected, 2);
		assert_eq!(result.errors, vec![DISABLED_MESSAGE.to_string()]);
	}
}

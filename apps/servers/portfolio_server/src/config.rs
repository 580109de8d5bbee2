use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log filter directives
	#[arg(long, env = "RUST_LOG", default_value = "info")]
	pub rust_log: String,

	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "8000")]
	pub port: u16,

	/// Check a running server's /health and exit
	#[arg(long, env = "HEALTH_CHECK", default_value = "false")]
	pub health_check: bool,

	/// Host the health check connects to. Defaults to loopback when the
	/// server binds every interface.
	#[arg(long, env = "HEALTH_CHECK_HOST")]
	pub health_check_host: Option<String>,

	/// Accept analytics events
	#[arg(long, env = "ANALYTICS_ENABLED", action = ArgAction::Set, default_value_t = true)]
	pub analytics_enabled: bool,

	/// Log every accepted analytics event
	#[arg(long, env = "ANALYTICS_LOG_EVENTS", action = ArgAction::Set, default_value_t = true)]
	pub analytics_log_events: bool,

	/// Analytics requests allowed per minute
	#[arg(long, env = "ANALYTICS_RATE_LIMIT", default_value = "30")]
	pub analytics_rate_limit: u32,

	/// Largest analytics request body accepted, in bytes
	#[arg(long, env = "ANALYTICS_MAX_BODY_BYTES", default_value = "262144")]
	pub analytics_max_body_bytes: usize,

	/// Salt for client ip and user agent digests
	#[arg(long, env = "SECRET_KEY", default_value = "change-me")]
	pub secret_key: String,

	/// Artificial latency of the content API, in milliseconds
	#[arg(long, env = "CONTENT_DELAY_MS", default_value = "1000")]
	pub content_delay_ms: u64,

	/// Origin allowed to call the API cross-site
	#[arg(long, env = "CORS_ORIGIN")]
	pub cors_origin: Option<String>,

	/// Max in-flight requests
	#[arg(long, env = "MAX_CONCURRENT_REQ", default_value = "256")]
	pub max_concurrent_req: usize,

	/// Per-request timeout in milliseconds
	#[arg(long, env = "TASK_TIMEOUT_MS", default_value = "5000")]
	pub task_timeout_ms: u64,
}

impl Config {
	/// URL the health check requests.
	#[must_use]
	pub fn health_check_url(&self) -> String {
		let host = match self.health_check_host.as_deref() {
			Some(host) => host,
			None if matches!(self.host.as_str(), "0.0.0.0" | "::" | "[::]") => "127.0.0.1",
			None => self.host.as_str(),
		};
		let host = if host.contains(':') && !host.starts_with('[') { format!("[{host}]") } else { host.to_string() };
		format!("http://{host}:{}/health", self.port)
	}

	#[must_use]
	pub const fn content_delay(&self) -> Duration {
		Duration::from_millis(self.content_delay_ms)
	}

	#[must_use]
	pub const fn task_timeout(&self) -> Duration {
		Duration::from_millis(self.task_timeout_ms)
	}
}

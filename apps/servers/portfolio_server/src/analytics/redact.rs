//! Keeps personal data out of the analytics logs.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub const REDACTED: &str = "[redacted]";
pub const MAX_METADATA_VALUE_CHARS: usize = 256;
const DIGEST_HEX_CHARS: usize = 16;

const SENSITIVE_KEYS: [&str; 11] = ["email", "name", "phone", "message", "password", "token", "secret", "subject", "client_ip", "ip", "user_agent"];

fn clip(value: &str) -> String {
	value.chars().take(MAX_METADATA_VALUE_CHARS).collect()
}

/// Normalize keys, blank out sensitive ones and cap string values.
///
/// Nested arrays and objects are flattened to their JSON text.
#[must_use]
pub fn redact_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
	metadata
		.iter()
		.map(|(key, value)| {
			let key = key.trim().to_lowercase();
			let value = if SENSITIVE_KEYS.contains(&key.as_str()) {
				Value::String(REDACTED.to_string())
			} else {
				match value {
					Value::String(s) => Value::String(clip(s)),
					Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
					nested => Value::String(clip(&nested.to_string())),
				}
			};
			(key, value)
		})
		.collect()
}

/// Salted SHA-256 of a normalized identifier, cut to 16 hex chars.
#[must_use]
pub fn hash_identifier(secret: &str, namespace: &str, value: &str) -> String {
	let normalized = value.trim().to_lowercase();
	if normalized.is_empty() {
		return "unknown".to_string();
	}

	let mut hasher = Sha256::new();
	hasher.update(secret.as_bytes());
	hasher.update(b":");
	hasher.update(namespace.as_bytes());
	hasher.update(b":");
	hasher.update(normalized.as_bytes());

	let mut digest = hex::encode(hasher.finalize());
	digest.truncate(DIGEST_HEX_CHARS);
	digest
}

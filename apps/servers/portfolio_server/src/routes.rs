pub mod analytics;
pub mod content;
pub mod health;

use crate::Config;
use axum::http::{header::CONTENT_TYPE, HeaderValue};
use tower_http::cors::CorsLayer;

/// Cross-origin access for the configured site origin, if any.
pub fn cors_layer(config: &Config, methods: impl Into<tower_http::cors::AllowMethods>) -> CorsLayer {
	let cors = CorsLayer::new().allow_methods(methods).allow_headers([CONTENT_TYPE]).allow_credentials(true);

	match config.cors_origin.as_deref().map(str::parse::<HeaderValue>) {
		Some(Ok(origin)) => cors.allow_origin(origin),
		Some(Err(e)) => {
			tracing::warn!("ignoring invalid CORS_ORIGIN: {}", e);
			cors
		}
		None => cors,
	}
}

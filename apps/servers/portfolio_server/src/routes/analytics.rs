use crate::handlers::analytics as handlers;
use crate::rate_limiter::{rate_limit_middleware, ClientRateLimiter};
use crate::routes::cors_layer;
use crate::{AppState, Config};
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

pub fn track_analytics<S>(config: &Config) -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	let limiter = Arc::new(ClientRateLimiter::new(config.analytics_rate_limit));

	Router::new()
		.route("/api/v1/analytics/track", post(handlers::track_analytics))
		.route_layer(from_fn_with_state(limiter, rate_limit_middleware))
		.layer(DefaultBodyLimit::disable())
		.layer(RequestBodyLimitLayer::new(config.analytics_max_body_bytes))
		.layer(cors_layer(config, [Method::POST]))
}

use crate::handlers::health::health;
use crate::metrics::metrics_handler;
use axum::routing::get;
use axum::Router;

pub fn get_health<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
{
	Router::new().route("/health", get(health)).route("/metrics", get(metrics_handler))
}

use axum::{error_handling::HandleErrorLayer, extract::FromRef, Router};
use portfolio_content::MockContentApi;
use std::sync::Arc;
use tower::{limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod rate_limiter;
pub mod routes;

pub use analytics::AnalyticsService;
pub use config::Config;
pub use error::PortfolioError;
pub use health::perform_health_check;

#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub content: MockContentApi,
	pub analytics: Arc<AnalyticsService>,
}

impl AppState {
	pub fn build(config: Arc<Config>) -> anyhow::Result<Self> {
		let content = MockContentApi::load()?.with_delay(config.content_delay());
		let analytics = Arc::new(AnalyticsService::from_config(&config));

		if !analytics.is_enabled() {
			tracing::warn!("analytics ingestion disabled, every event will be rejected");
		}

		Ok(Self { config, content, analytics })
	}
}

impl FromRef<AppState> for Arc<Config> {
	fn from_ref(state: &AppState) -> Self {
		state.config.clone()
	}
}

impl FromRef<AppState> for MockContentApi {
	fn from_ref(state: &AppState) -> Self {
		state.content.clone()
	}
}

impl FromRef<AppState> for Arc<AnalyticsService> {
	fn from_ref(state: &AppState) -> Self {
		state.analytics.clone()
	}
}

async fn handle_tower_error(error: BoxError) -> PortfolioError {
	if error.is::<tower::timeout::error::Elapsed>() {
		tracing::warn!("Request timeout: {}", error);
		PortfolioError::RequestTimeout
	} else if error.is::<tower::load_shed::error::Overloaded>() {
		tracing::warn!("Service overloaded: {}", error);
		PortfolioError::ServiceOverloaded
	} else {
		tracing::error!("Unhandled tower error: {}", error);
		PortfolioError::TowerError(error)
	}
}

/// Every route plus the shared middleware stack.
pub fn app(state: AppState) -> Router {
	let config = state.config.clone();

	Router::new()
		.merge(routes::analytics::track_analytics(&config))
		.merge(routes::content::get_content(&config))
		.merge(routes::health::get_health())
		.layer(
			ServiceBuilder::new()
				.layer(axum::middleware::from_fn(metrics::metrics_middleware))
				.layer(TraceLayer::new_for_http())
				.layer(HandleErrorLayer::new(handle_tower_error))
				.layer(LoadShedLayer::new())
				.layer(ConcurrencyLimitLayer::new(config.max_concurrent_req))
				.layer(TimeoutLayer::new(config.task_timeout())),
		)
		.with_state(state)
}

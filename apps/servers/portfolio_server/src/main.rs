use anyhow::Result;
use clap::Parser;
use portfolio_server::{app, perform_health_check, AppState, Config};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();

	if config.health_check {
		perform_health_check(&config).await?;
		println!("Health check passed");
		return Ok(());
	}

	init_tracing(&config)?;

	let config = Arc::new(config);
	let state = AppState::build(config.clone())?;
	let shutdown_token = CancellationToken::new();

	let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
	tracing::info!("listening on {}", listener.local_addr()?);

	let signal_shutdown_token = shutdown_token.clone();
	tokio::spawn(async move {
		tokio::signal::ctrl_c().await.ok();
		tracing::info!("Received Ctrl+C, initiating shutdown...");
		signal_shutdown_token.cancel();
	});

	axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
		.with_graceful_shutdown(async move { shutdown_token.cancelled().await })
		.await?;

	tracing::info!("Server stopped");
	Ok(())
}

fn init_tracing(config: &Config) -> Result<()> {
	use tracing_subscriber::layer::SubscriberExt;

	let filter = EnvFilter::try_new(&config.rust_log)?;

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(
				tracing_subscriber::fmt::layer()
					.event_format(tracing_subscriber::fmt::format().pretty())
					.with_filter(filter),
			)
		})
		.try_init()?;
	Ok(())
}

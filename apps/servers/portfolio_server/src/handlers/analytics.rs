use crate::analytics::{ClientInfo, TrackRequestDto, TrackResponse};
use crate::{AppState, PortfolioError};
use axum::extract::{rejection::JsonRejection, ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use garde::Validate;
use std::net::SocketAddr;
use tracing::instrument;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
}

/// Proxy-forwarded address first, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
	let forwarded = header(headers, "x-forwarded-for").and_then(|v| v.split(',').next()).map(str::trim).filter(|v| !v.is_empty());
	forwarded.map(str::to_string).or_else(|| peer.map(|p| p.ip().to_string())).unwrap_or_else(|| "unknown".to_string())
}

fn client_info(headers: &HeaderMap, peer: Option<SocketAddr>) -> ClientInfo {
	ClientInfo {
		request_id: header(headers, "x-request-id").unwrap_or("unknown").to_string(),
		ip: client_ip(headers, peer),
		user_agent: header(headers, "user-agent").unwrap_or_default().to_string(),
	}
}

#[axum::debug_handler]
#[instrument(name = "track_analytics", skip_all)]
pub async fn track_analytics(
	State(state): State<AppState>,
	peer: Option<ConnectInfo<SocketAddr>>,
	headers: HeaderMap,
	payload: Result<Json<TrackRequestDto>, JsonRejection>,
) -> Result<Json<TrackResponse>, PortfolioError> {
	let Json(request) = payload?;

	if let Err(report) = request.validate() {
		tracing::debug!("analytics batch failed validation: {}", report);
		return Err(PortfolioError::unprocessable_entity(report.iter().map(|(path, error)| (path.to_string(), error.to_string()))));
	}

	let client = client_info(&headers, peer.map(|ConnectInfo(addr)| addr));
	let result = state.analytics.ingest(&request.events, &client);

	let message = if result.rejected > 0 {
		tracing::warn!(request_id = %client.request_id, rejected = result.rejected, "analytics ingestion completed with rejections");
		"Some events were rejected."
	} else {
		"Events accepted."
	};

	Ok(Json(TrackResponse {
		accepted: result.accepted,
		rejected: result.rejected,
		message: message.to_string(),
		errors: result.errors,
	}))
}

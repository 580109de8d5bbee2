use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::borrow::Cow;
use std::collections::HashMap;
use tower::BoxError;

#[derive(thiserror::Error, Debug)]
pub enum PortfolioError {
	#[error("request path not found")]
	NotFound,

	#[error("error in the request body")]
	UnprocessableEntity { errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>> },

	#[error("malformed request: {0}")]
	Rejection(JsonRejection),

	#[error("Rate limit exceeded")]
	RateLimited,

	#[error("request timed out")]
	RequestTimeout,

	#[error("service overloaded, try again later")]
	ServiceOverloaded,

	#[error("Unhandled tower error: {0}")]
	TowerError(BoxError),

	#[error("an internal server error occurred")]
	Anyhow(#[from] anyhow::Error),
}

impl PortfolioError {
	pub fn unprocessable_entity<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<Cow<'static, str>>,
		V: Into<Cow<'static, str>>,
	{
		let mut error_map = HashMap::new();

		for (key, val) in errors {
			error_map.entry(key.into()).or_insert_with(Vec::new).push(val.into());
		}

		Self::UnprocessableEntity { errors: error_map }
	}

	const fn status_code(&self) -> StatusCode {
		match self {
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
			Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
			Self::ServiceOverloaded => StatusCode::SERVICE_UNAVAILABLE,
			Self::Rejection(_) | Self::TowerError(_) | Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

/// Body syntax and schema problems join the validation error map; the
/// rest (missing content type, oversized body) keep axum's status.
impl From<JsonRejection> for PortfolioError {
	fn from(rejection: JsonRejection) -> Self {
		match rejection {
			JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => Self::unprocessable_entity([("body", rejection.body_text())]),
			other => Self::Rejection(other),
		}
	}
}

impl IntoResponse for PortfolioError {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::UnprocessableEntity { errors } => {
				#[derive(serde::Serialize)]
				struct Errors {
					errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
				}

				return (StatusCode::UNPROCESSABLE_ENTITY, Json(Errors { errors })).into_response();
			}
			Self::Rejection(rejection) => return rejection.into_response(),
			Self::Anyhow(ref e) => {
				tracing::error!("Generic error: {:?}", e);
			}
			_ => (),
		}

		(self.status_code(), self.to_string()).into_response()
	}
}

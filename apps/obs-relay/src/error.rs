use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use playout::PlayoutError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop the service
#[derive(Error, Debug)]
pub enum Error {
	#[error("HTTP server I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Errors returned by the HTTP routes
#[derive(Error, Debug)]
pub enum ApiError {
	#[error("authentication required")]
	Unauthorized,

	#[error("invalid API key")]
	Forbidden,

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	BadRequest(String),

	#[error(transparent)]
	Playout(#[from] PlayoutError),
}

impl ApiError {
	const fn status_code(&self) -> StatusCode {
		match self {
			Self::Unauthorized => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::Playout(e) if e.is_not_found() => StatusCode::NOT_FOUND,
			Self::Playout(e) if e.is_disconnected() => StatusCode::SERVICE_UNAVAILABLE,
			Self::Playout(PlayoutError::InvalidAction(_) | PlayoutError::InvalidPlaylistName(_) | PlayoutError::Serialization(_)) => StatusCode::BAD_REQUEST,
			Self::Playout(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			tracing::error!("Request failed: {}", self);
		}
		let body = Json(json!({ "error": self.to_string() }));

		match self {
			Self::Unauthorized => (status, [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))], body).into_response(),
			_ => (status, body).into_response(),
		}
	}
}

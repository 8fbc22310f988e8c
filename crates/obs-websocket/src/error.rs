use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ObsWebsocketError>;

/// Errors for obs-websocket crate
#[derive(Debug, Error)]
pub enum ObsWebsocketError {
	#[error("Failed to connect to WebSocket: {0}")]
	WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

	#[error("Handshake failed: {0}")]
	Handshake(String),

	#[error("Authentication failed: {0}")]
	Authentication(String),

	#[error("Request '{request_type}' failed with code {code}: {comment}")]
	RequestFailed { request_type: String, code: u16, comment: String },

	#[error("'{operation}' timed out after {timeout:?}")]
	Timeout { operation: String, timeout: Duration },

	#[error("Not connected to OBS")]
	NotConnected,

	#[error("Connection closed before a response arrived")]
	Closed,

	#[error("Unexpected response: {0}")]
	UnexpectedResponse(String),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl ObsWebsocketError {
	/// Whether the failure came from the transport rather than OBS rejecting the request
	pub const fn is_connection(&self) -> bool {
		matches!(self, Self::WebSocket(_) | Self::NotConnected | Self::Closed | Self::Handshake(_))
	}
}

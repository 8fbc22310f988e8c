use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayoutError>;

/// Errors raised by the remote control surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
	#[error("Control surface not connected")]
	NotConnected,

	#[error("Source '{input}' not found in scene '{scene}'")]
	SourceNotFound { scene: String, input: String },

	#[error("Request failed: {0}")]
	Request(String),
}

/// Errors raised by the durable state store
#[derive(Error, Debug)]
pub enum StoreError {
	#[error("State store I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("State record is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PlayoutError {
	#[error("Playlist '{0}' not found")]
	PlaylistNotFound(String),

	#[error("Preset '{name}' not found. Available: {available:?}")]
	PresetNotFound { name: String, available: Vec<String> },

	#[error("Invalid action: {0}")]
	InvalidAction(String),

	#[error("Invalid playlist name '{0}'")]
	InvalidPlaylistName(String),

	#[error("Control surface error: {0}")]
	Surface(#[from] SurfaceError),

	#[error("State store error: {0}")]
	Store(#[from] StoreError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl PlayoutError {
	/// Whether the error names something the caller asked for that does not exist
	pub const fn is_not_found(&self) -> bool {
		matches!(self, Self::PlaylistNotFound(_) | Self::PresetNotFound { .. })
	}

	pub const fn is_disconnected(&self) -> bool {
		matches!(self, Self::Surface(SurfaceError::NotConnected))
	}
}

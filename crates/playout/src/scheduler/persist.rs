use serde::{Deserialize, Serialize};

/// Well-known store key of the scheduler record
pub const STATE_KEY: &str = "playlist_state";

pub(crate) const DEFAULT_SOURCE_NAME: &str = "MediaSource";

/// Crash-recovery record written after every cursor mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
	pub active_playlist: Option<String>,
	pub position: usize,
	pub source_name: String,
	pub auto_advance: bool,
}

impl Default for PersistedState {
	fn default() -> Self {
		Self {
			active_playlist: None,
			position: 0,
			source_name: DEFAULT_SOURCE_NAME.to_string(),
			auto_advance: true,
		}
	}
}

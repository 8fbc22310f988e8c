use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// URL scheme prefixes that mark an item as remote
const REMOTE_SCHEMES: [&str; 4] = ["http://", "https://", "rtmp://", "rtsp://"];

/// Per-track overlay overrides, read from `#EXTOVERLAY:` directives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub overlay_text: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub overlay_hold: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub overlay_delay: Option<f64>,
	#[serde(default)]
	pub overlay_skip: bool,
}

impl TrackMetadata {
	pub fn is_empty(&self) -> bool {
		self.overlay_text.is_none() && self.overlay_hold.is_none() && self.overlay_delay.is_none() && !self.overlay_skip
	}
}

/// One playable entry of a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
	/// Local file path or remote URL
	pub path: String,
	pub title: String,
	/// Seconds, -1 when unknown
	pub duration: i64,
	/// Trim in point in seconds, 0 = no trim
	pub start_time: f64,
	/// Trim out point in seconds, 0 = no trim
	pub stop_time: f64,
	#[serde(default)]
	pub metadata: TrackMetadata,
}

impl PlaylistItem {
	/// Create an item with a title derived from its path and no timing information
	pub fn new(path: impl Into<String>) -> Self {
		let path = path.into();
		let title = Self::default_title(&path);
		Self {
			path,
			title,
			duration: -1,
			start_time: 0.0,
			stop_time: 0.0,
			metadata: TrackMetadata::default(),
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub const fn with_duration(mut self, duration: i64) -> Self {
		self.duration = duration;
		self
	}

	pub fn with_trim(mut self, start_time: f64, stop_time: f64) -> Self {
		self.start_time = start_time;
		self.stop_time = stop_time;
		self
	}

	pub fn with_metadata(mut self, metadata: TrackMetadata) -> Self {
		self.metadata = metadata;
		self
	}

	pub fn is_remote(&self) -> bool {
		is_remote_path(&self.path)
	}

	/// Remote items are assumed to exist since they cannot be checked on disk
	pub async fn exists(&self) -> bool {
		if self.is_remote() {
			return true;
		}
		tokio::fs::try_exists(&self.path).await.unwrap_or(false)
	}

	/// Filename stem for local paths, the full path for remote ones
	pub fn default_title(path: &str) -> String {
		if is_remote_path(path) {
			return path.to_string();
		}
		Path::new(path).file_stem().map_or_else(|| path.to_string(), |stem| stem.to_string_lossy().into_owned())
	}
}

pub(crate) fn is_remote_path(path: &str) -> bool {
	REMOTE_SCHEMES.iter().any(|scheme| path.starts_with(scheme))
}

/// A named, ordered sequence of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
	pub name: String,
	pub items: Vec<PlaylistItem>,
	#[serde(rename = "loop")]
	pub looping: bool,
	pub shuffle: bool,
	#[serde(skip)]
	pub source_path: Option<PathBuf>,
}

impl Playlist {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			items: Vec::new(),
			looping: true,
			shuffle: false,
			source_path: None,
		}
	}

	/// Build a playlist straight from a list of paths
	pub fn from_paths<I, S>(name: impl Into<String>, paths: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut playlist = Self::new(name);
		playlist.items = paths.into_iter().map(PlaylistItem::new).collect();
		playlist
	}

	pub const fn with_loop(mut self, looping: bool) -> Self {
		self.looping = looping;
		self
	}

	pub const fn with_shuffle(mut self, shuffle: bool) -> Self {
		self.shuffle = shuffle;
		self
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn summary(&self) -> PlaylistSummary {
		PlaylistSummary {
			name: self.name.clone(),
			items: self.items.len(),
			looping: self.looping,
			shuffle: self.shuffle,
			total_duration: self.items.iter().filter(|item| item.duration > 0).map(|item| item.duration).sum(),
		}
	}
}

/// Listing view of a playlist, without its items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
	pub name: String,
	pub items: usize,
	#[serde(rename = "loop")]
	pub looping: bool,
	pub shuffle: bool,
	/// Sum of known item durations in seconds
	pub total_duration: i64,
}

use super::item::{Playlist, PlaylistItem, TrackMetadata};
use crate::error::Result;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

const HEADER: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";
const START_TIME: &str = "#EXTVLCOPT:start-time=";
const STOP_TIME: &str = "#EXTVLCOPT:stop-time=";
const EXTOVERLAY: &str = "#EXTOVERLAY:";

/// Metadata collected from directives until the next track line consumes it
#[derive(Debug, Default)]
struct PendingEntry {
	title: Option<String>,
	duration: Option<i64>,
	start_time: Option<f64>,
	stop_time: Option<f64>,
	metadata: TrackMetadata,
}

impl PendingEntry {
	fn into_item(self, path: &str) -> PlaylistItem {
		PlaylistItem {
			path: path.to_string(),
			title: self.title.unwrap_or_else(|| PlaylistItem::default_title(path)),
			duration: self.duration.unwrap_or(-1),
			start_time: self.start_time.unwrap_or(0.0),
			stop_time: self.stop_time.unwrap_or(0.0),
			metadata: self.metadata,
		}
	}

	fn apply_extinf(&mut self, rest: &str) {
		let (duration, title) = rest.split_once(',').unwrap_or((rest, ""));
		self.duration = Some(parse_duration(duration));
		self.title = Some(title.trim().to_string());
	}

	fn apply_overlay(&mut self, rest: &str) {
		let Some((key, value)) = rest.split_once('=') else {
			return;
		};
		let value = value.trim();
		match key.trim().to_lowercase().as_str() {
			"skip" => self.metadata.overlay_skip = !matches!(value, "0" | "false" | "no" | ""),
			"hold" => {
				if let Some(hold) = parse_seconds(value) {
					self.metadata.overlay_hold = Some(hold);
				}
			}
			"delay" => {
				if let Some(delay) = parse_seconds(value) {
					self.metadata.overlay_delay = Some(delay);
				}
			}
			"text" => self.metadata.overlay_text = Some(value.to_string()),
			other => debug!("Ignoring unknown overlay directive '{}'", other),
		}
	}
}

/// `#EXTINF` durations are written as integers but players emit floats too
fn parse_duration(raw: &str) -> i64 {
	match raw.trim().parse::<f64>() {
		#[allow(clippy::cast_possible_truncation)]
		Ok(seconds) if seconds.is_finite() => seconds.trunc() as i64,
		_ => -1,
	}
}

fn parse_seconds(raw: &str) -> Option<f64> {
	raw.trim().parse::<f64>().ok()
}

/// Reads and writes extended M3U playlists
pub struct M3uParser;

impl M3uParser {
	/// Parse playlist source text, keeping items in file order
	pub fn parse_str(name: impl Into<String>, source: &str) -> Playlist {
		let mut playlist = Playlist::new(name);
		let mut pending = PendingEntry::default();

		for raw in source.lines() {
			let line = raw.trim();
			if line.is_empty() || line == HEADER {
				continue;
			}

			if let Some(rest) = line.strip_prefix(EXTINF) {
				pending.apply_extinf(rest);
			} else if let Some(rest) = line.strip_prefix(START_TIME) {
				if let Some(start) = parse_seconds(rest) {
					pending.start_time = Some(start);
				}
			} else if let Some(rest) = line.strip_prefix(STOP_TIME) {
				if let Some(stop) = parse_seconds(rest) {
					pending.stop_time = Some(stop);
				}
			} else if let Some(rest) = line.strip_prefix(EXTOVERLAY) {
				pending.apply_overlay(rest);
			} else if !line.starts_with('#') {
				let entry = std::mem::take(&mut pending);
				playlist.items.push(entry.into_item(line));
			}
		}

		playlist
	}

	/// Parse a playlist file, naming the playlist after the file stem unless a name is given
	pub async fn parse_file(path: &Path, name: Option<&str>) -> Result<Playlist> {
		let bytes = tokio::fs::read(path).await?;
		let source = String::from_utf8_lossy(&bytes);
		let name = name.map_or_else(|| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default(), str::to_string);

		let mut playlist = Self::parse_str(name, &source);
		playlist.source_path = Some(path.to_path_buf());

		info!("Parsed playlist '{}' - {} items from {}", playlist.name, playlist.len(), path.display());
		Ok(playlist)
	}

	/// Render a playlist back to extended M3U text
	pub fn write_string(playlist: &Playlist) -> String {
		let mut out = String::from("#EXTM3U\n\n");

		for item in &playlist.items {
			let _ = writeln!(out, "{EXTINF}{},{}", item.duration, item.title);
			if item.start_time != 0.0 {
				let _ = writeln!(out, "{START_TIME}{}", item.start_time);
			}
			if item.stop_time != 0.0 {
				let _ = writeln!(out, "{STOP_TIME}{}", item.stop_time);
			}

			let meta = &item.metadata;
			if let Some(text) = &meta.overlay_text {
				let _ = writeln!(out, "{EXTOVERLAY}text={text}");
			}
			if let Some(hold) = meta.overlay_hold {
				let _ = writeln!(out, "{EXTOVERLAY}hold={hold}");
			}
			if let Some(delay) = meta.overlay_delay {
				let _ = writeln!(out, "{EXTOVERLAY}delay={delay}");
			}
			if meta.overlay_skip {
				let _ = writeln!(out, "{EXTOVERLAY}skip=1");
			}

			let _ = writeln!(out, "{}\n", item.path);
		}

		out
	}

	pub async fn write_file(playlist: &Playlist, path: &Path) -> Result<()> {
		tokio::fs::write(path, Self::write_string(playlist)).await?;
		info!("Wrote playlist '{}' to {}", playlist.name, path.display());
		Ok(())
	}
}

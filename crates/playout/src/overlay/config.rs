use crate::playlist::PlaylistItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which title the overlay announces on a track change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
	#[default]
	Current,
	/// Announces with the "up next" prefix. Reuses the current item's title; the successor is not peeked.
	NextUp,
}

impl FromStr for OverlayMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"current" => Ok(Self::Current),
			"next_up" | "next-up" => Ok(Self::NextUp),
			other => Err(format!("unknown overlay mode '{other}', expected 'current' or 'next_up'")),
		}
	}
}

impl fmt::Display for OverlayMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Current => "current",
			Self::NextUp => "next_up",
		})
	}
}

/// Process-wide overlay defaults, overridable per track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
	pub enabled: bool,
	/// Text input that displays the overlay
	pub source_name: String,
	/// Scene owning the source, empty for the current program scene
	pub scene_name: String,
	pub hold_sec: f64,
	pub delay_sec: f64,
	/// Advisory only, fades are done by filters on the remote side
	pub fade_in_ms: u64,
	pub fade_out_ms: u64,
	pub prefix: String,
	pub suffix: String,
	pub mode: OverlayMode,
	pub auto_trigger: bool,
	pub next_up_prefix: String,
}

impl Default for OverlayConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			source_name: "TitleOverlay".to_string(),
			scene_name: String::new(),
			hold_sec: 8.0,
			delay_sec: 1.0,
			fade_in_ms: 500,
			fade_out_ms: 500,
			prefix: String::new(),
			suffix: String::new(),
			mode: OverlayMode::Current,
			auto_trigger: true,
			next_up_prefix: "Up Next: ".to_string(),
		}
	}
}

impl OverlayConfig {
	/// Text shown for a track: explicit per-track text, else the mode's formatting of the title
	pub fn display_text(&self, item: &PlaylistItem) -> String {
		if let Some(text) = item.metadata.overlay_text.as_deref().filter(|text| !text.is_empty()) {
			return text.to_string();
		}
		match self.mode {
			OverlayMode::NextUp => format!("{}{}", self.next_up_prefix, item.title),
			OverlayMode::Current => format!("{}{}{}", self.prefix, item.title, self.suffix),
		}
	}

	pub fn apply(&mut self, patch: OverlayConfigPatch) {
		tracing::info!("Overlay config update: {:?}", patch);
		let OverlayConfigPatch {
			enabled,
			source_name,
			scene_name,
			hold_sec,
			delay_sec,
			fade_in_ms,
			fade_out_ms,
			prefix,
			suffix,
			mode,
			auto_trigger,
			next_up_prefix,
		} = patch;

		if let Some(enabled) = enabled {
			self.enabled = enabled;
		}
		if let Some(source_name) = source_name {
			self.source_name = source_name;
		}
		if let Some(scene_name) = scene_name {
			self.scene_name = scene_name;
		}
		if let Some(hold_sec) = hold_sec {
			self.hold_sec = hold_sec;
		}
		if let Some(delay_sec) = delay_sec {
			self.delay_sec = delay_sec;
		}
		if let Some(fade_in_ms) = fade_in_ms {
			self.fade_in_ms = fade_in_ms;
		}
		if let Some(fade_out_ms) = fade_out_ms {
			self.fade_out_ms = fade_out_ms;
		}
		if let Some(prefix) = prefix {
			self.prefix = prefix;
		}
		if let Some(suffix) = suffix {
			self.suffix = suffix;
		}
		if let Some(mode) = mode {
			self.mode = mode;
		}
		if let Some(auto_trigger) = auto_trigger {
			self.auto_trigger = auto_trigger;
		}
		if let Some(next_up_prefix) = next_up_prefix {
			self.next_up_prefix = next_up_prefix;
		}
	}
}

/// Partial update of [`OverlayConfig`]; absent and unknown fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfigPatch {
	pub enabled: Option<bool>,
	pub source_name: Option<String>,
	pub scene_name: Option<String>,
	pub hold_sec: Option<f64>,
	pub delay_sec: Option<f64>,
	pub fade_in_ms: Option<u64>,
	pub fade_out_ms: Option<u64>,
	pub prefix: Option<String>,
	pub suffix: Option<String>,
	pub mode: Option<OverlayMode>,
	pub auto_trigger: Option<bool>,
	pub next_up_prefix: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::playlist::TrackMetadata;
	use serde_json::json;

	#[test]
	fn test_display_text_by_mode() {
		let item = PlaylistItem::new("/media/ep01.mp4").with_title("Episode 01");
		let mut config = OverlayConfig {
			prefix: "Now Playing: ".into(),
			suffix: " ★".into(),
			..OverlayConfig::default()
		};
		assert_eq!(config.display_text(&item), "Now Playing: Episode 01 ★");

		config.mode = OverlayMode::NextUp;
		assert_eq!(config.display_text(&item), "Up Next: Episode 01");

		let custom = item.with_metadata(TrackMetadata {
			overlay_text: Some("Special".into()),
			..TrackMetadata::default()
		});
		assert_eq!(config.display_text(&custom), "Special");
	}

	#[test]
	fn test_patch_ignores_unknown_fields() {
		let patch: OverlayConfigPatch = serde_json::from_value(json!({"hold_sec": 12.5, "mode": "next_up", "colour": "red"})).unwrap();
		let mut config = OverlayConfig::default();
		config.apply(patch);

		assert!((config.hold_sec - 12.5).abs() < f64::EPSILON);
		assert_eq!(config.mode, OverlayMode::NextUp);
		assert!((config.delay_sec - 1.0).abs() < f64::EPSILON);
		assert_eq!(config.source_name, "TitleOverlay");
	}

	#[test]
	fn test_mode_parsing() {
		assert_eq!("next-up".parse::<OverlayMode>().unwrap(), OverlayMode::NextUp);
		assert_eq!("Current".parse::<OverlayMode>().unwrap(), OverlayMode::Current);
		assert!("sideways".parse::<OverlayMode>().is_err());
	}
}

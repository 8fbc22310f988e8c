use clap::Parser;
use obs_websocket::{ObsConfig, RetryConfig};
use playout::{OverlayConfig, OverlayMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about = "Remote playout and overlay relay for OBS", long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	// OBS WebSocket
	/// OBS WebSocket host
	#[arg(long, env = "OBS_HOST", default_value = "localhost")]
	pub obs_host: String,

	/// OBS WebSocket port
	#[arg(long, env = "OBS_PORT", default_value = "4455")]
	pub obs_port: u16,

	/// OBS WebSocket password, unset when authentication is disabled
	#[arg(long, env = "OBS_PASSWORD")]
	pub obs_password: Option<String>,

	/// Initial delay between reconnect attempts in seconds
	#[arg(long, env = "OBS_RECONNECT_SECS", default_value = "5")]
	pub obs_reconnect_secs: u64,

	/// Reconnect attempts before giving up, 0 retries forever
	#[arg(long, env = "OBS_MAX_RECONNECT_ATTEMPTS", default_value = "0")]
	pub obs_max_reconnect_attempts: usize,

	// HTTP API
	#[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
	pub api_host: String,

	#[arg(long, env = "API_PORT", default_value = "8765")]
	pub api_port: u16,

	/// Bearer token required on every route but /health
	#[arg(long, env = "API_KEY")]
	pub api_key: Option<String>,

	// Playlists
	/// Directory scanned for .m3u and .m3u8 playlists
	#[arg(long, env = "PLAYLIST_DIR", default_value = "./playlists")]
	pub playlist_dir: PathBuf,

	/// Playlist activated on startup when no saved state was restored
	#[arg(long, env = "PLAYLIST_DEFAULT")]
	pub playlist_default: Option<String>,

	/// Media input that plays the scheduled items
	#[arg(long, env = "PLAYLIST_SOURCE", default_value = "MediaSource")]
	pub playlist_source: String,

	/// Directory holding the persisted playback state
	#[arg(long, env = "STATE_DIR", default_value = "./state")]
	pub state_dir: PathBuf,

	/// JSON list of scene presets registered before the built-in ones
	#[arg(long, env = "PRESETS_FILE")]
	pub presets_file: Option<PathBuf>,

	// Overlay
	#[arg(long, env = "OVERLAY_SOURCE", default_value = "TitleOverlay")]
	pub overlay_source: String,

	/// Scene owning the overlay source, empty for the current program scene
	#[arg(long, env = "OVERLAY_SCENE", default_value = "")]
	pub overlay_scene: String,

	#[arg(long, env = "OVERLAY_HOLD_SECS", default_value = "8.0")]
	pub overlay_hold_secs: f64,

	#[arg(long, env = "OVERLAY_DELAY_SECS", default_value = "1.0")]
	pub overlay_delay_secs: f64,

	#[arg(long, env = "OVERLAY_PREFIX", default_value = "")]
	pub overlay_prefix: String,

	#[arg(long, env = "OVERLAY_SUFFIX", default_value = "")]
	pub overlay_suffix: String,

	/// `current` or `next_up`
	#[arg(long, env = "OVERLAY_MODE", default_value = "current")]
	pub overlay_mode: OverlayMode,

	/// Show the overlay automatically on every track change
	#[arg(long, env = "OVERLAY_AUTO_TRIGGER", default_value_t = true, action = clap::ArgAction::Set)]
	pub overlay_auto_trigger: bool,

	/// Graceful shutdown timeout in seconds
	#[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value = "10")]
	pub shutdown_timeout_secs: u64,
}

impl Config {
	pub fn obs_config(&self) -> ObsConfig {
		ObsConfig::new(self.obs_host.clone(), self.obs_port).with_password(self.obs_password.clone())
	}

	pub fn retry_config(&self) -> RetryConfig {
		RetryConfig {
			max_attempts: self.obs_max_reconnect_attempts,
			initial_delay: Duration::from_secs(self.obs_reconnect_secs.max(1)),
			..RetryConfig::default()
		}
	}

	pub fn overlay_config(&self) -> OverlayConfig {
		OverlayConfig {
			source_name: self.overlay_source.clone(),
			scene_name: self.overlay_scene.clone(),
			hold_sec: self.overlay_hold_secs,
			delay_sec: self.overlay_delay_secs,
			prefix: self.overlay_prefix.clone(),
			suffix: self.overlay_suffix.clone(),
			mode: self.overlay_mode,
			auto_trigger: self.overlay_auto_trigger,
			..OverlayConfig::default()
		}
	}

	pub fn api_addr(&self) -> String {
		format!("{}:{}", self.api_host, self.api_port)
	}

	/// The API key, ignoring an empty value
	pub fn api_key(&self) -> Option<&str> {
		self.api_key.as_deref().filter(|key| !key.is_empty())
	}

	pub const fn shutdown_timeout(&self) -> Duration {
		Duration::from_secs(self.shutdown_timeout_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flags_build_component_configs() {
		let config = Config::try_parse_from([
			"obs-relay",
			"--obs-host",
			"studio.local",
			"--obs-password",
			"",
			"--overlay-mode",
			"next-up",
			"--overlay-auto-trigger",
			"false",
			"--overlay-hold-secs",
			"4",
			"--api-port",
			"9000",
		])
		.unwrap();

		let obs = config.obs_config();
		assert_eq!(obs.url(), "ws://studio.local:4455");
		assert_eq!(obs.password, None);

		let overlay = config.overlay_config();
		assert_eq!(overlay.mode, OverlayMode::NextUp);
		assert!(!overlay.auto_trigger);
		assert!((overlay.hold_sec - 4.0).abs() < f64::EPSILON);
		assert_eq!(overlay.next_up_prefix, "Up Next: ");

		assert_eq!(config.api_addr(), "0.0.0.0:9000");
	}

	#[test]
	fn test_rejects_unknown_overlay_mode() {
		assert!(Config::try_parse_from(["obs-relay", "--overlay-mode", "sideways"]).is_err());
	}
}

use crate::error::{PlayoutError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One side effect run when a preset activates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAction {
	/// `set_volume`, `set_mute`, `media_play`, `media_pause` or `media_restart`
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub params: Map<String, Value>,
}

impl SceneAction {
	/// Build an action from a JSON object of parameters; non-object values yield no parameters
	pub fn new(kind: impl Into<String>, params: Value) -> Self {
		Self {
			kind: kind.into(),
			params: match params {
				Value::Object(map) => map,
				_ => Map::new(),
			},
		}
	}

	/// `Ok(None)` for an action type this build does not know
	pub(crate) fn command(&self) -> Result<Option<ActionCommand>> {
		let command = match self.kind.as_str() {
			"set_volume" => ActionCommand::SetVolume {
				source_name: self.string("source_name")?,
				volume_db: self.number("volume_db")?,
			},
			"set_mute" => ActionCommand::SetMute {
				source_name: self.string("source_name")?,
				muted: self.flag("muted")?,
			},
			"media_play" => ActionCommand::MediaPlay { source_name: self.string("source_name")? },
			"media_pause" => ActionCommand::MediaPause { source_name: self.string("source_name")? },
			"media_restart" => ActionCommand::MediaRestart { source_name: self.string("source_name")? },
			_ => return Ok(None),
		};
		Ok(Some(command))
	}

	fn param(&self, key: &str) -> Result<&Value> {
		self.params.get(key).ok_or_else(|| PlayoutError::InvalidAction(format!("'{}' is missing parameter '{}'", self.kind, key)))
	}

	fn mistyped(&self, key: &str, expected: &str) -> PlayoutError {
		PlayoutError::InvalidAction(format!("'{}' parameter '{}' must be {}", self.kind, key, expected))
	}

	fn string(&self, key: &str) -> Result<String> {
		self.param(key)?.as_str().map(str::to_string).ok_or_else(|| self.mistyped(key, "a string"))
	}

	fn number(&self, key: &str) -> Result<f64> {
		self.param(key)?.as_f64().ok_or_else(|| self.mistyped(key, "a number"))
	}

	fn flag(&self, key: &str) -> Result<bool> {
		self.param(key)?.as_bool().ok_or_else(|| self.mistyped(key, "a boolean"))
	}
}

/// Typed form of a [`SceneAction`] once its parameters check out
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ActionCommand {
	SetVolume { source_name: String, volume_db: f64 },
	SetMute { source_name: String, muted: bool },
	MediaPlay { source_name: String },
	MediaPause { source_name: String },
	MediaRestart { source_name: String },
}

/// A named broadcast state: a scene, side effects, and an optional playlist to start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePreset {
	pub name: String,
	pub scene_name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub actions: Vec<SceneAction>,
	#[serde(default)]
	pub playlist: Option<String>,
	/// External trigger hint, e.g. an OSC address
	#[serde(default)]
	pub hotkey: Option<String>,
}

impl ScenePreset {
	pub fn new(name: impl Into<String>, scene_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			scene_name: scene_name.into(),
			description: String::new(),
			actions: Vec::new(),
			playlist: None,
			hotkey: None,
		}
	}

	#[must_use]
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	#[must_use]
	pub fn with_action(mut self, action: SceneAction) -> Self {
		self.actions.push(action);
		self
	}

	#[must_use]
	pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
		self.playlist = Some(playlist.into());
		self
	}

	#[must_use]
	pub fn with_hotkey(mut self, hotkey: impl Into<String>) -> Self {
		self.hotkey = Some(hotkey.into());
		self
	}

	/// Built-in broadcast workflow: standby, live, brb, intermission, end card
	pub fn defaults() -> Vec<Self> {
		vec![
			Self::new("live", "Live").with_description("Main live broadcast scene").with_hotkey("/obs/scene/live"),
			Self::new("brb", "BRB")
				.with_description("Be Right Back screen")
				.with_action(SceneAction::new("set_mute", serde_json::json!({"source_name": "Mic", "muted": true})))
				.with_hotkey("/obs/scene/brb"),
			Self::new("standby", "Standby").with_description("Holding / pre-show screen").with_hotkey("/obs/scene/standby"),
			Self::new("intermission", "Intermission")
				.with_description("Intermission loop with playlist")
				.with_playlist("intermission")
				.with_hotkey("/obs/scene/intermission"),
			Self::new("end_card", "EndCard").with_description("Post-show slate").with_hotkey("/obs/scene/end_card"),
		]
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
	Ok,
	Skipped { reason: String },
	/// Action type not recognised, remaining actions still run
	Unknown,
	Error { error: String },
}

/// Outcome of one step of a preset activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
	pub action: String,
	#[serde(flatten)]
	pub status: ActionStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub playlist: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub track: Option<String>,
}

impl ActionResult {
	fn with_status(action: impl Into<String>, status: ActionStatus) -> Self {
		Self {
			action: action.into(),
			status,
			playlist: None,
			track: None,
		}
	}

	pub fn ok(action: impl Into<String>) -> Self {
		Self::with_status(action, ActionStatus::Ok)
	}

	pub fn skipped(action: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::with_status(action, ActionStatus::Skipped { reason: reason.into() })
	}

	pub fn unknown(action: impl Into<String>) -> Self {
		Self::with_status(action, ActionStatus::Unknown)
	}

	pub fn failed(action: impl Into<String>, error: impl ToString) -> Self {
		Self::with_status(action, ActionStatus::Error { error: error.to_string() })
	}

	pub const fn is_ok(&self) -> bool {
		matches!(self.status, ActionStatus::Ok)
	}
}

/// Every step taken by a preset activation, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetActivation {
	pub preset: String,
	pub actions: Vec<ActionResult>,
}

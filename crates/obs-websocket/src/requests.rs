use serde_json::{json, Value};

/// `TriggerMediaInputAction` actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
	Play,
	Pause,
	Restart,
}

impl MediaAction {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Play => "OBS_WEBSOCKET_MEDIA_INPUT_ACTION_PLAY",
			Self::Pause => "OBS_WEBSOCKET_MEDIA_INPUT_ACTION_PAUSE",
			Self::Restart => "OBS_WEBSOCKET_MEDIA_INPUT_ACTION_RESTART",
		}
	}
}

/// One op 6 request: a request type plus its data
#[derive(Debug, Clone, PartialEq)]
pub struct ObsRequest {
	pub request_type: &'static str,
	pub data: Option<Value>,
}

impl ObsRequest {
	pub const fn new(request_type: &'static str, data: Option<Value>) -> Self {
		Self { request_type, data }
	}

	pub const fn get_version() -> Self {
		Self::new("GetVersion", None)
	}

	pub const fn get_current_program_scene() -> Self {
		Self::new("GetCurrentProgramScene", None)
	}

	pub fn set_current_program_scene(scene_name: &str) -> Self {
		Self::new("SetCurrentProgramScene", Some(json!({ "sceneName": scene_name })))
	}

	pub fn set_input_text(input_name: &str, text: &str) -> Self {
		Self::new("SetInputSettings", Some(json!({ "inputName": input_name, "inputSettings": { "text": text } })))
	}

	/// Load a local file into a media input, playing once
	pub fn set_input_media_file(input_name: &str, path: &str) -> Self {
		Self::new(
			"SetInputSettings",
			Some(json!({
				"inputName": input_name,
				"inputSettings": { "local_file": path, "looping": false, "is_local_file": true }
			})),
		)
	}

	pub fn get_scene_item_id(scene_name: &str, source_name: &str) -> Self {
		Self::new("GetSceneItemId", Some(json!({ "sceneName": scene_name, "sourceName": source_name })))
	}

	pub fn set_scene_item_enabled(scene_name: &str, scene_item_id: i64, enabled: bool) -> Self {
		Self::new("SetSceneItemEnabled", Some(json!({ "sceneName": scene_name, "sceneItemId": scene_item_id, "sceneItemEnabled": enabled })))
	}

	pub fn set_input_volume_db(input_name: &str, volume_db: f64) -> Self {
		Self::new("SetInputVolume", Some(json!({ "inputName": input_name, "inputVolumeDb": volume_db })))
	}

	pub fn set_input_mute(input_name: &str, muted: bool) -> Self {
		Self::new("SetInputMute", Some(json!({ "inputName": input_name, "inputMuted": muted })))
	}

	pub fn trigger_media_input_action(input_name: &str, action: MediaAction) -> Self {
		Self::new("TriggerMediaInputAction", Some(json!({ "inputName": input_name, "mediaAction": action.as_str() })))
	}

	/// Full op 6 message for this request
	pub fn to_message(&self, request_id: &str) -> Value {
		let mut d = json!({ "requestType": self.request_type, "requestId": request_id });
		if let Some(data) = &self.data {
			d["requestData"] = data.clone();
		}
		json!({ "op": crate::protocol::op::REQUEST, "d": d })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_message_shape() {
		let message = ObsRequest::set_input_mute("Mic", true).to_message("req-1");
		assert_eq!(
			message,
			json!({"op": 6, "d": {"requestType": "SetInputMute", "requestId": "req-1", "requestData": {"inputName": "Mic", "inputMuted": true}}})
		);

		let bare = ObsRequest::get_current_program_scene().to_message("req-2");
		assert!(bare["d"].get("requestData").is_none());
	}

	#[test]
	fn test_media_file_does_not_loop() {
		let request = ObsRequest::set_input_media_file("MediaSource", "/media/a.mp4");
		let settings = &request.data.unwrap()["inputSettings"];
		assert_eq!(settings["looping"], false);
		assert_eq!(settings["is_local_file"], true);
		assert_eq!(settings["local_file"], "/media/a.mp4");
	}

	#[test]
	fn test_media_action_names() {
		let request = ObsRequest::trigger_media_input_action("Intro", MediaAction::Restart);
		assert_eq!(request.data.unwrap()["mediaAction"], "OBS_WEBSOCKET_MEDIA_INPUT_ACTION_RESTART");
	}
}

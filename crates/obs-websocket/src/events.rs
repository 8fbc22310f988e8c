use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

/// Events pushed by OBS (op 5) that the relay reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObsEvent {
	MediaInputPlaybackEnded { input_name: String },
	CurrentProgramSceneChanged { scene_name: String },
	Other { event_type: String, data: Value },
}

impl ObsEvent {
	/// Decode the `d` payload of an event message
	pub fn from_event_data(d: &Value) -> Self {
		let event_type = d.get("eventType").and_then(Value::as_str).unwrap_or_default();
		let data = d.get("eventData").cloned().unwrap_or(Value::Null);
		let field = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);

		trace!("Parsing event type: {}", event_type);
		match (event_type, field("inputName"), field("sceneName")) {
			("MediaInputPlaybackEnded", Some(input_name), _) => Self::MediaInputPlaybackEnded { input_name },
			("CurrentProgramSceneChanged", _, Some(scene_name)) => Self::CurrentProgramSceneChanged { scene_name },
			_ => Self::Other {
				event_type: event_type.to_string(),
				data,
			},
		}
	}
}

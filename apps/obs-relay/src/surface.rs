//! `ControlSurface` over a live OBS WebSocket client.

use async_trait::async_trait;
use obs_websocket::{EventRecvError, MediaAction, ObsClient, ObsEvent, ObsWebsocketError};
use playout::{ControlSurface, SurfaceError, SurfaceEvent, SurfaceResult};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const EVENT_CAPACITY: usize = 64;

pub struct ObsSurface {
	client: Arc<ObsClient>,
	events: broadcast::Sender<SurfaceEvent>,
}

impl ObsSurface {
	pub fn new(client: Arc<ObsClient>) -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		Self { client, events }
	}

	pub const fn client(&self) -> &Arc<ObsClient> {
		&self.client
	}

	/// Spawn task forwarding OBS events to surface subscribers
	pub fn spawn_event_bridge(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
		let mut obs_events = self.client.subscribe();
		let events = self.events.clone();

		tokio::spawn(async move {
			tracing::info!("🌉 Starting OBS event bridge");

			loop {
				tokio::select! {
					() = cancel.cancelled() => {
						tracing::info!("🛑 Event bridge shutting down");
						break;
					}
					received = obs_events.recv() => match received {
						Ok(event) => {
							if let Some(event) = surface_event(event) {
								tracing::debug!("Surface event: {:?}", event);
								let _ = events.send(event);
							}
						}
						Err(EventRecvError::Overflowed(skipped)) => {
							tracing::warn!("⚠️ Event bridge lagged, {} OBS events dropped", skipped);
						}
						Err(EventRecvError::Closed) => {
							tracing::warn!("OBS event stream closed");
							break;
						}
					}
				}
			}

			tracing::info!("✅ Event bridge stopped");
		})
	}
}

/// Surface view of an OBS event, `None` for events the core does not consume
pub fn surface_event(event: ObsEvent) -> Option<SurfaceEvent> {
	match event {
		ObsEvent::MediaInputPlaybackEnded { input_name } => Some(SurfaceEvent::MediaEnded { source_name: input_name }),
		ObsEvent::CurrentProgramSceneChanged { scene_name } => Some(SurfaceEvent::SceneChanged { scene_name }),
		ObsEvent::Other { .. } => None,
	}
}

fn surface_error(error: ObsWebsocketError) -> SurfaceError {
	match error {
		ObsWebsocketError::NotConnected | ObsWebsocketError::Closed => SurfaceError::NotConnected,
		other => SurfaceError::Request(other.to_string()),
	}
}

#[async_trait]
impl ControlSurface for ObsSurface {
	fn is_connected(&self) -> bool {
		self.client.is_connected()
	}

	async fn switch_scene(&self, scene_name: &str) -> SurfaceResult<()> {
		self.client.set_current_program_scene(scene_name).await.map_err(surface_error)
	}

	async fn current_scene(&self) -> SurfaceResult<String> {
		self.client.current_program_scene().await.map_err(surface_error)
	}

	async fn set_text_source(&self, source_name: &str, text: &str) -> SurfaceResult<()> {
		self.client.set_input_text(source_name, text).await.map_err(surface_error)
	}

	async fn set_scene_item_enabled(&self, scene_name: &str, source_name: &str, enabled: bool) -> SurfaceResult<()> {
		let item_id = self.client.scene_item_id(scene_name, source_name).await.map_err(surface_error)?.ok_or_else(|| SurfaceError::SourceNotFound {
			scene: scene_name.to_string(),
			input: source_name.to_string(),
		})?;
		self.client.set_scene_item_enabled(scene_name, item_id, enabled).await.map_err(surface_error)
	}

	async fn set_volume(&self, source_name: &str, volume_db: f64) -> SurfaceResult<()> {
		self.client.set_input_volume_db(source_name, volume_db).await.map_err(surface_error)
	}

	async fn set_mute(&self, source_name: &str, muted: bool) -> SurfaceResult<()> {
		self.client.set_input_mute(source_name, muted).await.map_err(surface_error)
	}

	async fn play_pause_media(&self, source_name: &str, pause: bool) -> SurfaceResult<()> {
		let action = if pause { MediaAction::Pause } else { MediaAction::Play };
		self.client.trigger_media_input_action(source_name, action).await.map_err(surface_error)
	}

	async fn restart_media(&self, source_name: &str) -> SurfaceResult<()> {
		self.client.trigger_media_input_action(source_name, MediaAction::Restart).await.map_err(surface_error)
	}

	async fn set_media_source(&self, source_name: &str, path: &str) -> SurfaceResult<()> {
		self.client.set_input_media_file(source_name, path).await.map_err(surface_error)
	}

	fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
		self.events.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use obs_websocket::ObsConfig;
	use serde_json::Value;

	#[test]
	fn test_event_mapping() {
		assert_eq!(
			surface_event(ObsEvent::MediaInputPlaybackEnded { input_name: "MediaSource".into() }),
			Some(SurfaceEvent::MediaEnded { source_name: "MediaSource".into() })
		);
		assert_eq!(
			surface_event(ObsEvent::CurrentProgramSceneChanged { scene_name: "Live".into() }),
			Some(SurfaceEvent::SceneChanged { scene_name: "Live".into() })
		);
		assert_eq!(
			surface_event(ObsEvent::Other {
				event_type: "InputMuteStateChanged".into(),
				data: Value::Null,
			}),
			None
		);
	}

	#[test]
	fn test_error_mapping() {
		assert_eq!(surface_error(ObsWebsocketError::Closed), SurfaceError::NotConnected);
		assert!(matches!(
			surface_error(ObsWebsocketError::RequestFailed {
				request_type: "SetInputMute".into(),
				code: 601,
				comment: "no such input".into(),
			}),
			SurfaceError::Request(_)
		));
	}

	#[tokio::test]
	async fn test_commands_fail_while_disconnected() {
		let surface = ObsSurface::new(Arc::new(ObsClient::new(ObsConfig::default())));
		assert!(!surface.is_connected());
		assert_eq!(surface.switch_scene("Live").await, Err(SurfaceError::NotConnected));
		assert_eq!(surface.set_scene_item_enabled("Live", "TitleOverlay", true).await, Err(SurfaceError::NotConnected));
	}
}

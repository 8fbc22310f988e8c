//! The remote control surface the core drives: scene switching, text and media inputs,
//! audio, and the event stream used for auto-advance.

use crate::error::SurfaceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Events pushed by the remote surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEvent {
	/// A media input finished playing its file
	MediaEnded { source_name: String },
	/// The program scene changed, from any client
	SceneChanged { scene_name: String },
}

/// Remote procedure surface of the broadcast software.
///
/// Implementations must tolerate sequential calls from several components through
/// one shared handle. Callers check [`ControlSurface::is_connected`] before issuing
/// commands and degrade to a no-op when it reports false.
#[async_trait]
pub trait ControlSurface: Send + Sync {
	fn is_connected(&self) -> bool;

	async fn switch_scene(&self, scene_name: &str) -> SurfaceResult<()>;

	async fn current_scene(&self) -> SurfaceResult<String>;

	async fn set_text_source(&self, source_name: &str, text: &str) -> SurfaceResult<()>;

	async fn set_scene_item_enabled(&self, scene_name: &str, source_name: &str, enabled: bool) -> SurfaceResult<()>;

	async fn set_volume(&self, source_name: &str, volume_db: f64) -> SurfaceResult<()>;

	async fn set_mute(&self, source_name: &str, muted: bool) -> SurfaceResult<()>;

	async fn play_pause_media(&self, source_name: &str, pause: bool) -> SurfaceResult<()>;

	async fn restart_media(&self, source_name: &str) -> SurfaceResult<()>;

	/// Load a file into a media input without looping it
	async fn set_media_source(&self, source_name: &str, path: &str) -> SurfaceResult<()>;

	/// Subscribe to media-ended and scene-changed events
	fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent>;
}

/// Hook invoked by the scheduler whenever the resolved item changes.
///
/// Returning [`SurfaceError::NotConnected`] marks the load as deferred; the scheduler
/// repeats it on its next resync.
#[async_trait]
pub trait MediaHook: Send + Sync {
	async fn update(&self, source_name: &str, path: &str) -> SurfaceResult<()>;
}

/// Loads scheduler items into a media input of the control surface
pub struct SurfaceMediaHook {
	surface: Arc<dyn ControlSurface>,
}

impl SurfaceMediaHook {
	pub fn new(surface: Arc<dyn ControlSurface>) -> Self {
		Self { surface }
	}
}

#[async_trait]
impl MediaHook for SurfaceMediaHook {
	async fn update(&self, source_name: &str, path: &str) -> SurfaceResult<()> {
		if !self.surface.is_connected() {
			debug!("Surface disconnected, not loading '{}' into '{}'", path, source_name);
			return Err(SurfaceError::NotConnected);
		}
		self.surface.set_media_source(source_name, path).await
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::sync::Mutex;

	/// A recorded call against the surface
	#[derive(Debug, Clone, PartialEq)]
	pub enum Call {
		SwitchScene(String),
		SetText(String, String),
		SetEnabled(String, String, bool),
		SetVolume(String, f64),
		SetMute(String, bool),
		PlayPause(String, bool),
		Restart(String),
		SetMedia(String, String),
	}

	/// In-memory surface recording every command it receives
	pub struct RecordingSurface {
		connected: AtomicBool,
		calls: Mutex<Vec<Call>>,
		fail_mute: AtomicBool,
		failing_hides: AtomicUsize,
		events: broadcast::Sender<SurfaceEvent>,
	}

	impl RecordingSurface {
		pub fn new() -> Arc<Self> {
			let (events, _) = broadcast::channel(16);
			Arc::new(Self {
				connected: AtomicBool::new(true),
				calls: Mutex::new(Vec::new()),
				fail_mute: AtomicBool::new(false),
				failing_hides: AtomicUsize::new(0),
				events,
			})
		}

		pub fn set_connected(&self, connected: bool) {
			self.connected.store(connected, Ordering::SeqCst);
		}

		pub fn fail_mute(&self) {
			self.fail_mute.store(true, Ordering::SeqCst);
		}

		/// Reject the next `count` hide commands
		pub fn fail_next_hides(&self, count: usize) {
			self.failing_hides.store(count, Ordering::SeqCst);
		}

		pub fn calls(&self) -> Vec<Call> {
			self.calls.lock().unwrap().clone()
		}

		pub fn emit(&self, event: SurfaceEvent) {
			let _ = self.events.send(event);
		}

		/// Number of show and hide commands issued for the given source
		pub fn visibility_counts(&self, source: &str) -> (usize, usize) {
			self.calls().iter().fold((0, 0), |(shows, hides), call| match call {
				Call::SetEnabled(_, s, true) if s == source => (shows + 1, hides),
				Call::SetEnabled(_, s, false) if s == source => (shows, hides + 1),
				_ => (shows, hides),
			})
		}

		/// Visibility of a source after replaying every recorded command
		pub fn is_visible(&self, source: &str) -> bool {
			self.calls().iter().fold(false, |visible, call| match call {
				Call::SetEnabled(_, s, enabled) if s == source => *enabled,
				_ => visible,
			})
		}

		fn record(&self, call: Call) {
			self.calls.lock().unwrap().push(call);
		}
	}

	#[async_trait]
	impl ControlSurface for RecordingSurface {
		fn is_connected(&self) -> bool {
			self.connected.load(Ordering::SeqCst)
		}

		async fn switch_scene(&self, scene_name: &str) -> SurfaceResult<()> {
			self.record(Call::SwitchScene(scene_name.to_string()));
			Ok(())
		}

		async fn current_scene(&self) -> SurfaceResult<String> {
			Ok("Program".to_string())
		}

		async fn set_text_source(&self, source_name: &str, text: &str) -> SurfaceResult<()> {
			self.record(Call::SetText(source_name.to_string(), text.to_string()));
			Ok(())
		}

		async fn set_scene_item_enabled(&self, scene_name: &str, source_name: &str, enabled: bool) -> SurfaceResult<()> {
			if !enabled && self.failing_hides.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1)).is_ok() {
				return Err(SurfaceError::Request("hide rejected".to_string()));
			}
			self.record(Call::SetEnabled(scene_name.to_string(), source_name.to_string(), enabled));
			Ok(())
		}

		async fn set_volume(&self, source_name: &str, volume_db: f64) -> SurfaceResult<()> {
			self.record(Call::SetVolume(source_name.to_string(), volume_db));
			Ok(())
		}

		async fn set_mute(&self, source_name: &str, muted: bool) -> SurfaceResult<()> {
			if self.fail_mute.load(Ordering::SeqCst) {
				return Err(SurfaceError::Request("mute rejected".to_string()));
			}
			self.record(Call::SetMute(source_name.to_string(), muted));
			Ok(())
		}

		async fn play_pause_media(&self, source_name: &str, pause: bool) -> SurfaceResult<()> {
			self.record(Call::PlayPause(source_name.to_string(), pause));
			Ok(())
		}

		async fn restart_media(&self, source_name: &str) -> SurfaceResult<()> {
			self.record(Call::Restart(source_name.to_string()));
			Ok(())
		}

		async fn set_media_source(&self, source_name: &str, path: &str) -> SurfaceResult<()> {
			self.record(Call::SetMedia(source_name.to_string(), path.to_string()));
			Ok(())
		}

		fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
			self.events.subscribe()
		}
	}

	#[tokio::test]
	async fn test_media_hook_skips_when_disconnected() {
		let surface = RecordingSurface::new();
		let hook = SurfaceMediaHook::new(surface.clone());

		hook.update("MediaSource", "/a.mp4").await.unwrap();
		surface.set_connected(false);
		assert_eq!(hook.update("MediaSource", "/b.mp4").await, Err(SurfaceError::NotConnected));

		assert_eq!(surface.calls(), vec![Call::SetMedia("MediaSource".into(), "/a.mp4".into())]);
	}
}

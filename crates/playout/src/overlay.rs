//! Timed text overlay driven by track changes and manual triggers.
//!
//! A single slot holds the in-flight sequence. Starting a new one always cancels and
//! awaits the previous sequence first, hiding the overlay if that sequence had shown it,
//! so two sequences never drive the same source at once.

mod config;
mod sequence;
mod status;

pub use config::{OverlayConfig, OverlayConfigPatch, OverlayMode};
pub use status::{OverlayEvent, OverlayPhase, OverlayReceipt, OverlayStatus};

use crate::events::{ListenerError, TrackChanged, TrackListener};
use crate::playlist::PlaylistItem;
use crate::surface::ControlSurface;
use async_trait::async_trait;
use sequence::{seconds, OverlayTarget, Sequence, SequenceHandle};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

pub struct OverlaySequencer {
	surface: Arc<dyn ControlSurface>,
	config: RwLock<OverlayConfig>,
	status: Arc<watch::Sender<OverlayStatus>>,
	events: broadcast::Sender<OverlayEvent>,
	current: Mutex<Option<SequenceHandle>>,
}

impl OverlaySequencer {
	pub fn new(surface: Arc<dyn ControlSurface>, config: OverlayConfig) -> Self {
		let (status, _) = watch::channel(OverlayStatus::default());
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		info!("Overlay sequencer ready, source '{}'", config.source_name);
		Self {
			surface,
			config: RwLock::new(config),
			status: Arc::new(status),
			events,
			current: Mutex::new(None),
		}
	}

	// ============================================================================
	// Sequencing
	// ============================================================================

	/// Show `text` after `delay_sec`, keep it for `hold_sec`, then hide it.
	/// Missing timings fall back to the configured defaults.
	pub async fn trigger(&self, text: impl Into<String>, hold_sec: Option<f64>, delay_sec: Option<f64>) -> OverlayReceipt {
		let text = text.into();
		let (target, hold, delay) = {
			let config = self.config.read().await;
			(Self::target_of(&config), seconds(hold_sec.unwrap_or(config.hold_sec)), seconds(delay_sec.unwrap_or(config.delay_sec)))
		};

		let mut slot = self.current.lock().await;
		if let Some(previous) = slot.take() {
			if previous.stop().await {
				self.hide_best_effort(&target).await;
			}
		}

		self.status.send_modify(|status| {
			status.reset();
			status.phase = OverlayPhase::Delaying;
			status.current_text.clone_from(&text);
		});

		*slot = Some(
			Sequence {
				surface: Arc::clone(&self.surface),
				status: Arc::clone(&self.status),
				target: target.clone(),
				text: text.clone(),
				hold,
				delay,
			}
			.spawn(),
		);
		drop(slot);

		let (hold_sec, delay_sec) = (hold.as_secs_f64(), delay.as_secs_f64());
		info!("Overlay triggered: '{}' hold={}s delay={}s", text, hold_sec, delay_sec);
		let _ = self.events.send(OverlayEvent::Triggered {
			text: text.clone(),
			hold_sec,
			delay_sec,
		});

		OverlayReceipt::Triggered {
			text,
			hold_sec,
			delay_sec,
			source: target.source_name,
		}
	}

	/// Cancel whatever is running and force the overlay hidden
	pub async fn hide(&self) -> OverlayReceipt {
		let target = Self::target_of(&*self.config.read().await);

		let mut slot = self.current.lock().await;
		if let Some(previous) = slot.take() {
			previous.stop().await;
		}
		self.hide_best_effort(&target).await;
		self.status.send_modify(OverlayStatus::reset);
		drop(slot);

		let _ = self.events.send(OverlayEvent::Hidden);
		OverlayReceipt::Hidden { source: target.source_name }
	}

	async fn hide_best_effort(&self, target: &OverlayTarget) {
		if !self.surface.is_connected() {
			debug!("Control surface disconnected, skipping overlay hide");
			return;
		}
		if let Err(e) = target.hide(self.surface.as_ref()).await {
			warn!("Overlay hide error: {}", e);
		}
	}

	fn target_of(config: &OverlayConfig) -> OverlayTarget {
		OverlayTarget {
			source_name: config.source_name.clone(),
			scene_name: config.scene_name.clone(),
		}
	}

	// ============================================================================
	// Status and config
	// ============================================================================

	pub fn status(&self) -> OverlayStatus {
		self.status.borrow().clone()
	}

	pub fn subscribe_status(&self) -> watch::Receiver<OverlayStatus> {
		self.status.subscribe()
	}

	/// Trigger and hide notifications for external fan-out
	pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
		self.events.subscribe()
	}

	pub async fn config(&self) -> OverlayConfig {
		self.config.read().await.clone()
	}

	/// Apply a partial update and return the resulting configuration
	pub async fn update_config(&self, patch: OverlayConfigPatch) -> OverlayConfig {
		let mut config = self.config.write().await;
		config.apply(patch);
		config.clone()
	}

	/// Show the overlay for `item` right away, keeping its per-track text and hold
	pub async fn trigger_item(&self, item: &PlaylistItem) -> OverlayReceipt {
		let (text, hold) = {
			let config = self.config.read().await;
			(config.display_text(item), item.metadata.overlay_hold.unwrap_or(config.hold_sec))
		};
		self.trigger(text, Some(hold), Some(0.0)).await
	}
}

#[async_trait]
impl TrackListener for OverlaySequencer {
	fn name(&self) -> &str {
		"overlay"
	}

	async fn on_track_changed(&self, event: &TrackChanged) -> Result<(), ListenerError> {
		let (text, hold, delay) = {
			let config = self.config.read().await;
			if !config.enabled || !config.auto_trigger {
				return Ok(());
			}
			let meta = &event.item.metadata;
			if meta.overlay_skip {
				info!("Overlay skipped for track: {}", event.item.title);
				return Ok(());
			}
			(config.display_text(&event.item), meta.overlay_hold.unwrap_or(config.hold_sec), meta.overlay_delay.unwrap_or(config.delay_sec))
		};

		self.status.send_modify(|status| {
			status.track_title.clone_from(&event.item.title);
			status.playlist.clone_from(&event.playlist);
			status.position = event.position;
		});
		self.trigger(text, Some(hold), Some(delay)).await;
		Ok(())
	}
}

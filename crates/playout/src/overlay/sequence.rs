use super::status::{round_tenths, OverlayPhase, OverlayStatus};
use crate::surface::{ControlSurface, SurfaceResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Interval at which the hold countdown is republished
pub(crate) const TICK: Duration = Duration::from_millis(250);

/// Clamp user supplied seconds into a usable duration
pub(crate) fn seconds(value: f64) -> Duration {
	if value.is_finite() && value > 0.0 {
		Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
	} else {
		Duration::ZERO
	}
}

/// Where the overlay lives on the control surface
#[derive(Debug, Clone)]
pub(crate) struct OverlayTarget {
	pub source_name: String,
	pub scene_name: String,
}

impl OverlayTarget {
	async fn scene(&self, surface: &dyn ControlSurface) -> SurfaceResult<String> {
		if self.scene_name.is_empty() {
			surface.current_scene().await
		} else {
			Ok(self.scene_name.clone())
		}
	}

	pub async fn show(&self, surface: &dyn ControlSurface, text: &str) -> SurfaceResult<()> {
		surface.set_text_source(&self.source_name, text).await?;
		let scene = self.scene(surface).await?;
		surface.set_scene_item_enabled(&scene, &self.source_name, true).await?;
		debug!("Overlay shown in scene '{}': {}", scene, text);
		Ok(())
	}

	pub async fn hide(&self, surface: &dyn ControlSurface) -> SurfaceResult<()> {
		let scene = self.scene(surface).await?;
		surface.set_scene_item_enabled(&scene, &self.source_name, false).await?;
		debug!("Overlay hidden in scene '{}'", scene);
		Ok(())
	}
}

/// Owned handle of the one in-flight sequence
pub(crate) struct SequenceHandle {
	pub cancel: CancellationToken,
	pub task: JoinHandle<()>,
	/// Set while this sequence has the overlay visible
	pub shown: Arc<AtomicBool>,
}

impl SequenceHandle {
	/// Cancel and wait for the task to settle. Returns whether it left the overlay visible.
	pub async fn stop(self) -> bool {
		self.cancel.cancel();
		if let Err(e) = self.task.await {
			error!("Overlay sequence task failed: {}", e);
		}
		self.shown.load(Ordering::SeqCst)
	}
}

/// One delay, show, hold, hide timeline
pub(crate) struct Sequence {
	pub surface: Arc<dyn ControlSurface>,
	pub status: Arc<watch::Sender<OverlayStatus>>,
	pub target: OverlayTarget,
	pub text: String,
	pub hold: Duration,
	pub delay: Duration,
}

impl Sequence {
	pub fn spawn(self) -> SequenceHandle {
		let cancel = CancellationToken::new();
		let shown = Arc::new(AtomicBool::new(false));
		let task = tokio::spawn(self.run(cancel.clone(), shown.clone()));
		SequenceHandle { cancel, task, shown }
	}

	async fn run(self, cancel: CancellationToken, shown: Arc<AtomicBool>) {
		if self.play(&cancel, &shown).await {
			// Still on screen; the next trigger or hide clears it through `shown`
			self.status.send_modify(|status| {
				status.active = true;
				status.phase = OverlayPhase::Holding;
				status.timer_remaining = 0.0;
			});
		} else {
			self.status.send_modify(OverlayStatus::reset);
		}
	}

	/// Returns true when the timeline ended with the overlay stuck visible
	async fn play(&self, cancel: &CancellationToken, shown: &AtomicBool) -> bool {
		if !self.delay.is_zero() {
			debug!("Overlay delay {:?}", self.delay);
			tokio::select! {
				() = cancel.cancelled() => return false,
				() = tokio::time::sleep(self.delay) => {}
			}
		}

		if cancel.is_cancelled() {
			return false;
		}
		if !self.surface.is_connected() {
			warn!("Control surface disconnected, overlay '{}' not shown", self.text);
			return false;
		}

		shown.store(true, Ordering::SeqCst);
		if let Err(e) = self.target.show(self.surface.as_ref(), &self.text).await {
			error!("Overlay sequence error: {}", e);
			return false;
		}
		if cancel.is_cancelled() {
			return false;
		}

		debug!("Overlay holding {:?}: '{}'", self.hold, self.text);
		let started = Instant::now();
		loop {
			let elapsed = started.elapsed();
			if elapsed >= self.hold {
				break;
			}
			let remaining = self.hold - elapsed;
			self.status.send_modify(|status| {
				status.active = true;
				status.phase = OverlayPhase::Holding;
				status.timer_remaining = round_tenths(remaining.as_secs_f64());
			});

			tokio::select! {
				() = cancel.cancelled() => return false,
				() = tokio::time::sleep(remaining.min(TICK)) => {}
			}
		}

		if self.surface.is_connected() {
			if let Err(first) = self.target.hide(self.surface.as_ref()).await {
				warn!("Overlay hide failed, retrying: {}", first);
				tokio::select! {
					() = cancel.cancelled() => return false,
					() = tokio::time::sleep(TICK) => {}
				}
				if let Err(e) = self.target.hide(self.surface.as_ref()).await {
					error!("Overlay '{}' left visible: {}", self.text, e);
					return true;
				}
			}
		}
		shown.store(false, Ordering::SeqCst);
		false
	}
}

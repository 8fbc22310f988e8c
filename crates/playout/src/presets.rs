mod model;

pub use model::{ActionResult, ActionStatus, PresetActivation, SceneAction, ScenePreset};

use crate::error::{PlayoutError, Result};
use crate::scheduler::PlaylistScheduler;
use crate::surface::{ControlSurface, SurfaceResult};
use model::ActionCommand;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const SWITCH_SCENE: &str = "switch_scene";
const ACTIVATE_PLAYLIST: &str = "activate_playlist";

/// Registry and executor of scene presets
pub struct PresetActivator {
	surface: Arc<dyn ControlSurface>,
	scheduler: Option<Arc<PlaylistScheduler>>,
	/// Registration order is the listing order
	presets: RwLock<Vec<ScenePreset>>,
	active: RwLock<Option<String>>,
}

impl PresetActivator {
	pub fn new(surface: Arc<dyn ControlSurface>) -> Self {
		Self {
			surface,
			scheduler: None,
			presets: RwLock::new(Vec::new()),
			active: RwLock::new(None),
		}
	}

	/// Scheduler used for presets that link a playlist
	#[must_use]
	pub fn with_scheduler(mut self, scheduler: Arc<PlaylistScheduler>) -> Self {
		self.scheduler = Some(scheduler);
		self
	}

	/// Add a preset, replacing one with the same name in place
	pub async fn register(&self, preset: ScenePreset) {
		debug!("Registered scene preset: {} -> {}", preset.name, preset.scene_name);
		let mut presets = self.presets.write().await;
		match presets.iter_mut().find(|existing| existing.name == preset.name) {
			Some(existing) => *existing = preset,
			None => presets.push(preset),
		}
	}

	/// Register the built-in presets without overriding any already present
	pub async fn register_defaults(&self) {
		let mut presets = self.presets.write().await;
		for preset in ScenePreset::defaults() {
			if !presets.iter().any(|existing| existing.name == preset.name) {
				presets.push(preset);
			}
		}
	}

	pub async fn register_all(&self, presets: impl IntoIterator<Item = ScenePreset>) {
		for preset in presets {
			self.register(preset).await;
		}
	}

	/// Register every preset of a JSON list file, returning how many were read
	pub async fn register_from_file(&self, path: &Path) -> Result<usize> {
		let bytes = tokio::fs::read(path).await?;
		let presets: Vec<ScenePreset> = serde_json::from_slice(&bytes)?;
		let count = presets.len();
		self.register_all(presets).await;
		info!("Loaded {} scene presets from {}", count, path.display());
		Ok(count)
	}

	pub async fn get(&self, name: &str) -> Option<ScenePreset> {
		self.presets.read().await.iter().find(|preset| preset.name == name).cloned()
	}

	pub async fn list(&self) -> Vec<ScenePreset> {
		self.presets.read().await.clone()
	}

	/// Name of the last preset activated
	pub async fn active(&self) -> Option<String> {
		self.active.read().await.clone()
	}

	/// Switch scene, run the side effects, then start the linked playlist.
	///
	/// Only an unknown preset name fails; every step after that is recorded in the
	/// returned activation whether it succeeded, was skipped or failed.
	pub async fn activate(&self, name: &str) -> Result<PresetActivation> {
		let Some(preset) = self.get(name).await else {
			let available = self.presets.read().await.iter().map(|preset| preset.name.clone()).collect();
			return Err(PlayoutError::PresetNotFound { name: name.to_string(), available });
		};

		let mut results = Vec::with_capacity(preset.actions.len() + 2);
		let connected = self.surface.is_connected();

		if connected {
			results.push(match self.surface.switch_scene(&preset.scene_name).await {
				Ok(()) => ActionResult::ok(SWITCH_SCENE),
				Err(e) => {
					error!("Scene switch to '{}' failed: {}", preset.scene_name, e);
					ActionResult::failed(SWITCH_SCENE, e)
				}
			});
		} else {
			warn!("Control surface not connected, scene switch skipped");
			results.push(ActionResult::skipped(SWITCH_SCENE, "not connected"));
		}

		for action in &preset.actions {
			results.push(self.run_action(action, connected).await);
		}

		if let (Some(playlist), Some(scheduler)) = (&preset.playlist, &self.scheduler) {
			let mut result = match scheduler.activate(playlist, 0).await {
				Ok(item) => ActionResult {
					track: item.map(|item| item.title),
					..ActionResult::ok(ACTIVATE_PLAYLIST)
				},
				Err(e) => {
					error!("Playlist activation failed: {}", e);
					ActionResult::failed(ACTIVATE_PLAYLIST, e)
				}
			};
			result.playlist = Some(playlist.clone());
			results.push(result);
		}

		*self.active.write().await = Some(preset.name.clone());
		info!("Activated preset: {}", preset.name);
		Ok(PresetActivation {
			preset: preset.name,
			actions: results,
		})
	}

	async fn run_action(&self, action: &SceneAction, connected: bool) -> ActionResult {
		let command = match action.command() {
			Ok(Some(command)) => command,
			Ok(None) => {
				warn!("Unknown preset action type: {}", action.kind);
				return ActionResult::unknown(&action.kind);
			}
			Err(e) => {
				error!("Action '{}' failed: {}", action.kind, e);
				return ActionResult::failed(&action.kind, e);
			}
		};
		if !connected {
			debug!("Control surface not connected, action '{}' skipped", action.kind);
			return ActionResult::skipped(&action.kind, "not connected");
		}

		match self.execute(command).await {
			Ok(()) => ActionResult::ok(&action.kind),
			Err(e) => {
				error!("Action '{}' failed: {}", action.kind, e);
				ActionResult::failed(&action.kind, e)
			}
		}
	}

	async fn execute(&self, command: ActionCommand) -> SurfaceResult<()> {
		let surface = self.surface.as_ref();
		match command {
			ActionCommand::SetVolume { source_name, volume_db } => surface.set_volume(&source_name, volume_db).await,
			ActionCommand::SetMute { source_name, muted } => surface.set_mute(&source_name, muted).await,
			ActionCommand::MediaPlay { source_name } => surface.play_pause_media(&source_name, false).await,
			ActionCommand::MediaPause { source_name } => surface.play_pause_media(&source_name, true).await,
			ActionCommand::MediaRestart { source_name } => surface.restart_media(&source_name).await,
		}
	}
}

mod cursor;
mod persist;
mod validate;

pub use persist::{PersistedState, STATE_KEY};
pub use validate::{ValidationReport, ValidationSummary};

use crate::error::{PlayoutError, Result, SurfaceError};
use crate::events::{TrackChanged, TrackListener, TrackListeners};
use crate::playlist::{M3uParser, Playlist, PlaylistItem, PlaylistSummary};
use crate::store::StateStore;
use crate::surface::{MediaHook, SurfaceEvent};
use cursor::{Advance, CursorState};
use persist::DEFAULT_SOURCE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const PLAYLIST_EXTENSIONS: [&str; 2] = ["m3u", "m3u8"];

/// Playlist names become file names in the playlist directory, so they must stay one plain path component
fn check_name(name: &str) -> Result<()> {
	if name.trim().is_empty() || name.contains(['/', '\\', '\0']) || name.contains("..") {
		return Err(PlayoutError::InvalidPlaylistName(name.to_string()));
	}
	Ok(())
}

/// Snapshot of the scheduler for status surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStatus {
	pub active_playlist: Option<String>,
	pub position: usize,
	pub total_items: usize,
	#[serde(rename = "loop")]
	pub looping: bool,
	pub shuffle: bool,
	pub auto_advance: bool,
	pub source_name: String,
	pub current_item: Option<PlaylistItem>,
}

/// Owns the loaded playlists and the playback cursor.
///
/// Every cursor mutation runs the same commit sequence while holding the state lock:
/// load the resolved item through the media hook, then persist the cursor. The state lock
/// is released before track listeners run so they may query the scheduler themselves,
/// while the transition lock stays held until dispatch ends so listeners see track changes
/// in commit order. Listeners must not move the cursor from inside a dispatch.
pub struct PlaylistScheduler {
	playlist_dir: PathBuf,
	transitions: Mutex<()>,
	state: Mutex<CursorState>,
	store: Arc<dyn StateStore>,
	media_hook: Option<Arc<dyn MediaHook>>,
	/// Set when the last load was deferred because the surface was disconnected
	load_pending: AtomicBool,
	listeners: TrackListeners,
}

impl PlaylistScheduler {
	pub fn new(playlist_dir: impl Into<PathBuf>, store: Arc<dyn StateStore>) -> Self {
		Self {
			playlist_dir: playlist_dir.into(),
			transitions: Mutex::new(()),
			state: Mutex::new(CursorState::new(DEFAULT_SOURCE_NAME)),
			store,
			media_hook: None,
			load_pending: AtomicBool::new(false),
			listeners: TrackListeners::new(),
		}
	}

	#[must_use]
	pub fn with_media_hook(mut self, hook: Arc<dyn MediaHook>) -> Self {
		self.media_hook = Some(hook);
		self
	}

	/// Media input that scheduler items are loaded into
	#[must_use]
	pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
		self.state.get_mut().source_name = source_name.into();
		self
	}

	pub fn playlist_dir(&self) -> &Path {
		&self.playlist_dir
	}

	pub async fn add_track_listener(&self, listener: Arc<dyn TrackListener>) {
		self.listeners.add(listener).await;
	}

	// Playback

	/// Make `name` the active playlist at `position` and load the resolved item
	pub async fn activate(&self, name: &str, position: usize) -> Result<Option<PlaylistItem>> {
		let _transition = self.transitions.lock().await;
		let mut state = self.state.lock().await;
		if !state.activate(name, position) {
			return Err(PlayoutError::PlaylistNotFound(name.to_string()));
		}

		info!("Activated playlist '{}' at position {}", name, position);
		Ok(self.commit(state).await)
	}

	/// Advance one item. Returns `None` at the end of a non-looping playlist.
	pub async fn next(&self) -> Option<PlaylistItem> {
		let _transition = self.transitions.lock().await;
		let mut state = self.state.lock().await;
		match state.advance() {
			Advance::Moved => self.commit(state).await,
			Advance::Ended => {
				info!("Playlist '{}' reached its end", state.active.as_deref().unwrap_or_default());
				self.persist(&state).await;
				None
			}
			Advance::Idle => None,
		}
	}

	/// Step back one item, stopping at the first
	pub async fn previous(&self) -> Option<PlaylistItem> {
		let _transition = self.transitions.lock().await;
		let mut state = self.state.lock().await;
		if !state.retreat() {
			return None;
		}
		self.commit(state).await
	}

	/// Jump to `position`, clamped into the active playlist
	pub async fn seek(&self, position: usize) -> Option<PlaylistItem> {
		let _transition = self.transitions.lock().await;
		let mut state = self.state.lock().await;
		if !state.seek(position) {
			return None;
		}
		self.commit(state).await
	}

	/// Re-run the commit for the current item when its load was deferred while the surface
	/// was disconnected. Returns the item when it was reloaded.
	pub async fn resync(&self) -> Option<PlaylistItem> {
		let _transition = self.transitions.lock().await;
		let state = self.state.lock().await;
		if !self.load_pending.load(Ordering::SeqCst) || state.current_item().is_none() {
			return None;
		}

		info!("Reloading deferred item into '{}'", state.source_name);
		self.commit(state).await
	}

	/// Callers hold the transition lock for the whole commit
	async fn commit(&self, state: MutexGuard<'_, CursorState>) -> Option<PlaylistItem> {
		let resolved = state.current_item().cloned();

		if let (Some(item), Some(hook)) = (&resolved, &self.media_hook) {
			match hook.update(&state.source_name, &item.path).await {
				Ok(()) => self.load_pending.store(false, Ordering::SeqCst),
				Err(SurfaceError::NotConnected) => {
					debug!("Surface disconnected, '{}' will load into '{}' on resync", item.path, state.source_name);
					self.load_pending.store(true, Ordering::SeqCst);
				}
				Err(e) => {
					warn!("Failed to load '{}' into '{}': {}", item.path, state.source_name, e);
					self.load_pending.store(false, Ordering::SeqCst);
				}
			}
		}
		self.persist(&state).await;

		let event = resolved.as_ref().map(|item| TrackChanged {
			item: item.clone(),
			playlist: state.active.clone().unwrap_or_default(),
			position: state.position,
		});
		drop(state);

		if let Some(event) = event {
			debug!("Now playing '{}' ({}#{})", event.item.title, event.playlist, event.position);
			self.listeners.dispatch(&event).await;
		}
		resolved
	}

	pub async fn current_item(&self) -> Option<PlaylistItem> {
		self.state.lock().await.current_item().cloned()
	}

	pub async fn status(&self) -> SchedulerStatus {
		let state = self.state.lock().await;
		let playlist = state.active_playlist();
		SchedulerStatus {
			active_playlist: state.active.clone(),
			position: state.position,
			total_items: playlist.map_or(0, Playlist::len),
			looping: playlist.is_some_and(|p| p.looping),
			shuffle: playlist.is_some_and(|p| p.shuffle),
			auto_advance: state.auto_advance,
			source_name: state.source_name.clone(),
			current_item: state.current_item().cloned(),
		}
	}

	// Auto-advance

	pub async fn set_auto_advance(&self, enabled: bool) {
		let mut state = self.state.lock().await;
		state.auto_advance = enabled;
		info!("Auto-advance {}", if enabled { "enabled" } else { "disabled" });
		self.persist(&state).await;
	}

	pub async fn auto_advance(&self) -> bool {
		self.state.lock().await.auto_advance
	}

	/// React to a media input finishing; only the scheduler's own source advances the cursor
	pub async fn handle_media_ended(&self, source_name: &str) -> Option<PlaylistItem> {
		{
			let state = self.state.lock().await;
			if source_name != state.source_name {
				return None;
			}
			if !state.auto_advance {
				debug!("Media ended on '{}' but auto-advance is disabled", source_name);
				return None;
			}
		}

		info!("Media ended on '{}', advancing", source_name);
		self.next().await
	}

	/// Drive `next()` from media-ended events for `source_name` until cancelled
	pub async fn register_auto_advance(self: &Arc<Self>, mut events: broadcast::Receiver<SurfaceEvent>, source_name: impl Into<String>, cancel: CancellationToken) -> JoinHandle<()> {
		let source_name = source_name.into();
		self.state.lock().await.source_name.clone_from(&source_name);
		info!("Auto-advance registered for '{}'", source_name);

		let scheduler = Arc::clone(self);
		tokio::spawn(async move {
			loop {
				tokio::select! {
					() = cancel.cancelled() => {
						info!("Auto-advance listener shutting down");
						break;
					}
					result = events.recv() => {
						match result {
							Ok(SurfaceEvent::MediaEnded { source_name }) => {
								scheduler.handle_media_ended(&source_name).await;
							}
							Ok(_) => {}
							Err(broadcast::error::RecvError::Lagged(skipped)) => {
								warn!("Auto-advance listener lagged, {} events dropped", skipped);
							}
							Err(broadcast::error::RecvError::Closed) => {
								info!("Surface event stream closed, auto-advance stopped");
								break;
							}
						}
					}
				}
			}
		})
	}

	// Persistence

	async fn persist(&self, state: &CursorState) {
		if let Err(e) = self.write_state(&state.snapshot()).await {
			error!("Failed to persist playlist state: {}", e);
		}
	}

	async fn write_state(&self, record: &PersistedState) -> Result<()> {
		self.store.write(STATE_KEY, &serde_json::to_value(record)?).await?;
		Ok(())
	}

	/// Persist the current cursor, surfacing failures to the caller
	pub async fn save_state(&self) -> Result<()> {
		let record = self.state.lock().await.snapshot();
		self.write_state(&record).await
	}

	pub async fn load_state(&self) -> Result<Option<PersistedState>> {
		match self.store.read(STATE_KEY).await? {
			Some(value) => Ok(Some(serde_json::from_value(value)?)),
			None => Ok(None),
		}
	}

	/// Re-activate the persisted playlist and position. Returns whether a playlist was restored.
	pub async fn restore_state(&self) -> bool {
		let saved = match self.load_state().await {
			Ok(Some(saved)) => saved,
			Ok(None) => return false,
			Err(e) => {
				error!("Failed to read playlist state: {}", e);
				return false;
			}
		};

		{
			let mut state = self.state.lock().await;
			state.auto_advance = saved.auto_advance;
			if !saved.source_name.is_empty() {
				state.source_name = saved.source_name;
			}
		}

		let Some(name) = saved.active_playlist else {
			return false;
		};
		match self.activate(&name, saved.position).await {
			Ok(_) => {
				info!("Restored playlist '{}' at position {}", name, saved.position);
				true
			}
			Err(e) => {
				warn!("Saved playlist could not be restored: {}", e);
				false
			}
		}
	}

	// Validation

	pub async fn validate_playlist(&self, name: &str) -> Result<ValidationReport> {
		let items = {
			let state = self.state.lock().await;
			state.playlists.get(name).map(|p| p.items.clone()).ok_or_else(|| PlayoutError::PlaylistNotFound(name.to_string()))?
		};
		let report = ValidationReport::check(name, &items).await;
		if !report.valid {
			warn!("Playlist '{}' has {} missing files", name, report.missing_count);
		}
		Ok(report)
	}

	pub async fn validate_all(&self) -> ValidationSummary {
		let snapshot: Vec<(String, Vec<PlaylistItem>)> = self.state.lock().await.playlists.values().map(|p| (p.name.clone(), p.items.clone())).collect();

		let mut reports = Vec::with_capacity(snapshot.len());
		for (name, items) in snapshot {
			reports.push(ValidationReport::check(&name, &items).await);
		}
		reports.into_iter().collect()
	}

	// Playlist management

	/// Load every `.m3u` then `.m3u8` file in the playlist directory, returning the loaded names
	pub async fn load_dir(&self) -> Result<Vec<String>> {
		if !tokio::fs::try_exists(&self.playlist_dir).await? {
			warn!("Playlist directory {} does not exist", self.playlist_dir.display());
			return Ok(Vec::new());
		}

		let mut by_extension: [Vec<PathBuf>; 2] = Default::default();
		let mut entries = tokio::fs::read_dir(&self.playlist_dir).await?;
		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
			if let Some(slot) = PLAYLIST_EXTENSIONS.iter().position(|known| extension.eq_ignore_ascii_case(known)) {
				by_extension[slot].push(path);
			}
		}

		let mut loaded = Vec::new();
		for mut paths in by_extension {
			paths.sort();
			for path in paths {
				match self.load_file(&path, None).await {
					Ok(name) => loaded.push(name),
					Err(e) => error!("Failed to load playlist {}: {}", path.display(), e),
				}
			}
		}

		info!("Loaded {} playlists from {}", loaded.len(), self.playlist_dir.display());
		Ok(loaded)
	}

	/// Parse and register one playlist file, returning its name
	pub async fn load_file(&self, path: &Path, name: Option<&str>) -> Result<String> {
		let playlist = M3uParser::parse_file(path, name).await?;
		let name = playlist.name.clone();
		self.insert_playlist(playlist).await;
		Ok(name)
	}

	/// Register a playlist, replacing any playlist with the same name
	pub async fn insert_playlist(&self, playlist: Playlist) {
		self.state.lock().await.insert(playlist);
	}

	pub async fn create_playlist(&self, name: &str, paths: Vec<String>, looping: bool) -> Result<PlaylistSummary> {
		check_name(name)?;
		let playlist = Playlist::from_paths(name, paths).with_loop(looping);
		let summary = playlist.summary();
		self.insert_playlist(playlist).await;
		info!("Created playlist '{}' with {} items", name, summary.items);
		Ok(summary)
	}

	/// Write `name` to `<playlist_dir>/<name>.m3u`
	pub async fn save_playlist(&self, name: &str) -> Result<PathBuf> {
		check_name(name)?;
		let playlist = self.playlist(name).await.ok_or_else(|| PlayoutError::PlaylistNotFound(name.to_string()))?;
		tokio::fs::create_dir_all(&self.playlist_dir).await?;

		let path = self.playlist_dir.join(format!("{name}.m3u"));
		M3uParser::write_file(&playlist, &path).await?;
		Ok(path)
	}

	/// Forget `name` and remove its `.m3u` file if one exists
	pub async fn delete_playlist(&self, name: &str) -> Result<()> {
		check_name(name)?;
		if self.state.lock().await.remove(name).is_none() {
			return Err(PlayoutError::PlaylistNotFound(name.to_string()));
		}

		let path = self.playlist_dir.join(format!("{name}.m3u"));
		match tokio::fs::remove_file(&path).await {
			Ok(()) => info!("Deleted playlist file {}", path.display()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
			Err(e) => return Err(e.into()),
		}
		info!("Deleted playlist '{}'", name);
		Ok(())
	}

	pub async fn playlists(&self) -> Vec<PlaylistSummary> {
		self.state.lock().await.playlists.values().map(Playlist::summary).collect()
	}

	pub async fn playlist(&self, name: &str) -> Option<Playlist> {
		self.state.lock().await.playlists.get(name).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::FnListener;
	use crate::store::{JsonFileStore, MemoryStore};
	use crate::surface::testing::{Call, RecordingSurface};
	use crate::surface::{ControlSurface, SurfaceMediaHook};
	use std::sync::Mutex as StdMutex;
	use std::time::Duration;

	fn scheduler() -> PlaylistScheduler {
		PlaylistScheduler::new("/nonexistent", Arc::new(MemoryStore::new()))
	}

	async fn with_abc(scheduler: &PlaylistScheduler, looping: bool) {
		scheduler.insert_playlist(Playlist::from_paths("test", ["/m/a.mp4", "/m/b.mp4", "/m/c.mp4"]).with_loop(looping)).await;
	}

	fn title(item: Option<PlaylistItem>) -> String {
		item.map(|i| i.title).unwrap_or_default()
	}

	/// Register a listener recording the position of every delivered event
	async fn record_positions(scheduler: &PlaylistScheduler) -> Arc<StdMutex<Vec<usize>>> {
		let positions = Arc::new(StdMutex::new(Vec::new()));
		let seen = positions.clone();
		scheduler
			.add_track_listener(Arc::new(FnListener::new("positions", move |e: TrackChanged| {
				let seen = seen.clone();
				async move {
					seen.lock().unwrap().push(e.position);
					Ok(())
				}
			})))
			.await;
		positions
	}

	#[tokio::test]
	async fn test_activate_next_wraps_and_persists() {
		let dir = tempfile::tempdir().unwrap();
		let store = Arc::new(JsonFileStore::new(dir.path()));
		let scheduler = PlaylistScheduler::new(dir.path(), store.clone());
		with_abc(&scheduler, true).await;

		assert_eq!(title(scheduler.activate("test", 0).await.unwrap()), "a");
		assert_eq!(scheduler.load_state().await.unwrap().unwrap().position, 0);

		assert_eq!(title(scheduler.next().await), "b");
		assert_eq!(scheduler.load_state().await.unwrap().unwrap().position, 1);
		assert_eq!(title(scheduler.next().await), "c");
		assert_eq!(title(scheduler.next().await), "a");

		let saved = scheduler.load_state().await.unwrap().unwrap();
		assert_eq!(saved.active_playlist.as_deref(), Some("test"));
		assert_eq!(saved.position, 0);
		assert!(dir.path().join("playlist_state.json").exists());
	}

	#[tokio::test]
	async fn test_activate_unknown_playlist_fails() {
		let scheduler = scheduler();
		let err = scheduler.activate("nope", 0).await.unwrap_err();
		assert!(err.is_not_found());
		assert!(scheduler.load_state().await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_end_of_playlist_skips_hook_and_listeners() {
		let surface = RecordingSurface::new();
		let scheduler = scheduler().with_media_hook(Arc::new(SurfaceMediaHook::new(surface.clone())));
		with_abc(&scheduler, false).await;

		let notified = record_positions(&scheduler).await;

		scheduler.activate("test", 2).await.unwrap();
		assert_eq!(scheduler.next().await, None);
		assert_eq!(scheduler.next().await, None);

		assert_eq!(scheduler.status().await.position, 2);
		assert_eq!(*notified.lock().unwrap(), vec![2]);
		assert_eq!(surface.calls(), vec![Call::SetMedia("MediaSource".into(), "/m/c.mp4".into())]);
	}

	#[tokio::test]
	async fn test_previous_clamps_and_seek_is_idempotent() {
		let scheduler = scheduler();
		with_abc(&scheduler, true).await;
		scheduler.activate("test", 0).await.unwrap();

		assert_eq!(title(scheduler.previous().await), "a");
		assert_eq!(scheduler.status().await.position, 0);

		assert_eq!(title(scheduler.seek(1).await), "b");
		assert_eq!(title(scheduler.seek(1).await), "b");
		assert_eq!(title(scheduler.seek(40).await), "c");
	}

	#[tokio::test]
	async fn test_operations_without_active_playlist_are_noops() {
		let scheduler = scheduler();
		assert_eq!(scheduler.next().await, None);
		assert_eq!(scheduler.previous().await, None);
		assert_eq!(scheduler.seek(2).await, None);
		assert!(scheduler.load_state().await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_listener_failure_does_not_abort_operation() {
		let scheduler = scheduler();
		with_abc(&scheduler, true).await;
		scheduler.add_track_listener(Arc::new(FnListener::new("broken", |_e: TrackChanged| async { Err::<(), crate::events::ListenerError>("listener exploded".into()) }))).await;

		assert_eq!(title(scheduler.activate("test", 0).await.unwrap()), "a");
		assert_eq!(title(scheduler.next().await), "b");
	}

	#[tokio::test]
	async fn test_media_ended_respects_gate_and_source() {
		let scheduler = scheduler().with_source_name("Player");
		with_abc(&scheduler, true).await;
		scheduler.activate("test", 0).await.unwrap();

		assert_eq!(scheduler.handle_media_ended("OtherSource").await, None);
		assert_eq!(title(scheduler.handle_media_ended("Player").await), "b");

		scheduler.set_auto_advance(false).await;
		assert_eq!(scheduler.handle_media_ended("Player").await, None);
		assert_eq!(scheduler.status().await.position, 1);
		assert!(!scheduler.load_state().await.unwrap().unwrap().auto_advance);
	}

	#[tokio::test]
	async fn test_auto_advance_task_follows_surface_events() {
		let surface = RecordingSurface::new();
		let scheduler = Arc::new(scheduler());
		with_abc(&scheduler, true).await;
		scheduler.activate("test", 0).await.unwrap();

		let cancel = CancellationToken::new();
		let handle = scheduler.register_auto_advance(surface.subscribe(), "MediaSource", cancel.clone()).await;

		surface.emit(SurfaceEvent::SceneChanged { scene_name: "Live".into() });
		surface.emit(SurfaceEvent::MediaEnded { source_name: "MediaSource".into() });

		for _ in 0..100 {
			if scheduler.status().await.position == 1 {
				break;
			}
			tokio::time::sleep(std::time::Duration::from_millis(5)).await;
		}
		assert_eq!(scheduler.status().await.position, 1);

		cancel.cancel();
		handle.await.unwrap();
	}

	#[tokio::test]
	async fn test_restore_state_reactivates_saved_position() {
		let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
		let first = PlaylistScheduler::new("/nonexistent", store.clone()).with_source_name("Player");
		with_abc(&first, true).await;
		first.activate("test", 0).await.unwrap();
		first.seek(2).await;
		first.set_auto_advance(false).await;

		let second = PlaylistScheduler::new("/nonexistent", store.clone());
		assert!(!second.restore_state().await, "playlist not loaded yet");

		with_abc(&second, true).await;
		assert!(second.restore_state().await);
		let status = second.status().await;
		assert_eq!(status.position, 2);
		assert_eq!(status.source_name, "Player");
		assert!(!status.auto_advance);
		assert_eq!(title(status.current_item), "c");
	}

	#[tokio::test]
	async fn test_restore_without_record_returns_false() {
		assert!(!scheduler().restore_state().await);
	}

	#[tokio::test]
	async fn test_validate_reports_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let paths: Vec<String> = ["a.mp4", "b.mp4", "c.mp4"].iter().map(|f| dir.path().join(f).to_string_lossy().into_owned()).collect();
		tokio::fs::write(&paths[0], b"").await.unwrap();
		tokio::fs::write(&paths[2], b"").await.unwrap();

		let scheduler = scheduler();
		scheduler.create_playlist("show", paths.clone(), true).await.unwrap();
		scheduler.create_playlist("streams", vec!["https://example.com/live".into()], true).await.unwrap();

		let report = scheduler.validate_playlist("show").await.unwrap();
		assert!(!report.valid);
		assert_eq!(report.missing_count, 1);
		assert_eq!(report.ok, 2);
		assert_eq!(report.missing, vec![paths[1].clone()]);

		let summary = scheduler.validate_all().await;
		assert!(!summary.all_valid);
		assert!(summary.playlists["streams"].valid);

		assert!(scheduler.validate_playlist("ghost").await.unwrap_err().is_not_found());
	}

	#[tokio::test]
	async fn test_load_save_delete_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("b.m3u8"), "#EXTM3U\n/m/x.mp4\n").await.unwrap();
		tokio::fs::write(dir.path().join("a.m3u"), "#EXTM3U\n#EXTINF:60,One\n/m/one.mp4\n/m/two.mp4\n").await.unwrap();
		tokio::fs::write(dir.path().join("notes.txt"), "ignored").await.unwrap();

		let scheduler = PlaylistScheduler::new(dir.path(), Arc::new(MemoryStore::new()));
		assert_eq!(scheduler.load_dir().await.unwrap(), vec!["a".to_string(), "b".to_string()]);

		let summaries = scheduler.playlists().await;
		assert_eq!(summaries.len(), 2);
		assert_eq!(summaries[0].items, 2);
		assert_eq!(summaries[0].total_duration, 60);

		scheduler.create_playlist("fresh", vec!["/m/new.mp4".into()], false).await.unwrap();
		let path = scheduler.save_playlist("fresh").await.unwrap();
		assert!(path.exists());

		scheduler.activate("fresh", 0).await.unwrap();
		scheduler.delete_playlist("fresh").await.unwrap();
		assert!(!path.exists());
		assert!(scheduler.status().await.active_playlist.is_none());
		assert!(scheduler.delete_playlist("fresh").await.unwrap_err().is_not_found());
	}

	#[tokio::test]
	async fn test_playlist_names_stay_inside_directory() {
		let root = tempfile::tempdir().unwrap();
		let dir = root.path().join("playlists");
		let scheduler = PlaylistScheduler::new(&dir, Arc::new(MemoryStore::new()));

		for name in ["../escaped", "nested/name", "back\\slash", "..", "nul\0byte", "  "] {
			let err = scheduler.create_playlist(name, vec!["/m/a.mp4".into()], true).await.unwrap_err();
			assert!(matches!(err, PlayoutError::InvalidPlaylistName(_)), "{name}");
			assert!(matches!(scheduler.save_playlist(name).await, Err(PlayoutError::InvalidPlaylistName(_))), "{name}");
			assert!(matches!(scheduler.delete_playlist(name).await, Err(PlayoutError::InvalidPlaylistName(_))), "{name}");
		}
		assert!(scheduler.playlists().await.is_empty());
		assert!(!root.path().join("escaped.m3u").exists());

		scheduler.create_playlist("late night", vec!["/m/a.mp4".into()], true).await.unwrap();
		assert_eq!(scheduler.save_playlist("late night").await.unwrap(), dir.join("late night.m3u"));
	}

	#[tokio::test]
	async fn test_resync_loads_item_deferred_while_disconnected() {
		let surface = RecordingSurface::new();
		surface.set_connected(false);
		let scheduler = scheduler().with_media_hook(Arc::new(SurfaceMediaHook::new(surface.clone())));
		with_abc(&scheduler, true).await;
		let positions = record_positions(&scheduler).await;

		assert_eq!(scheduler.resync().await, None);
		assert_eq!(title(scheduler.activate("test", 1).await.unwrap()), "b");
		assert!(surface.calls().is_empty());

		surface.set_connected(true);
		assert_eq!(title(scheduler.resync().await), "b");
		assert_eq!(surface.calls(), vec![Call::SetMedia("MediaSource".into(), "/m/b.mp4".into())]);
		assert_eq!(*positions.lock().unwrap(), vec![1, 1]);

		assert_eq!(scheduler.resync().await, None);
		assert_eq!(surface.calls().len(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_concurrent_moves_deliver_events_in_commit_order() {
		let scheduler = Arc::new(scheduler());
		with_abc(&scheduler, true).await;
		scheduler.activate("test", 0).await.unwrap();

		let seen = Arc::new(StdMutex::new(Vec::new()));
		let slow = seen.clone();
		scheduler
			.add_track_listener(Arc::new(FnListener::new("slow", move |e: TrackChanged| {
				let seen = slow.clone();
				async move {
					if e.position == 1 {
						tokio::time::sleep(Duration::from_millis(50)).await;
					}
					seen.lock().unwrap().push(e.position);
					Ok(())
				}
			})))
			.await;

		let first = tokio::spawn({
			let scheduler = scheduler.clone();
			async move { scheduler.next().await }
		});
		tokio::time::sleep(Duration::from_millis(10)).await;
		let second = tokio::spawn({
			let scheduler = scheduler.clone();
			async move { scheduler.next().await }
		});
		first.await.unwrap();
		second.await.unwrap();

		assert_eq!(scheduler.status().await.position, 2);
		assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
	}

	#[tokio::test]
	async fn test_load_dir_missing_directory_is_empty() {
		assert!(scheduler().load_dir().await.unwrap().is_empty());
	}
}

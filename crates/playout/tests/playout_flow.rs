use async_trait::async_trait;
use playout::{ControlSurface, M3uParser, MemoryStore, OverlayConfig, OverlayPhase, OverlaySequencer, PlaylistScheduler, SurfaceEvent, SurfaceMediaHook, SurfaceResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Surface that logs commands as strings and lets the test push events
struct FakeObs {
	connected: AtomicBool,
	log: Mutex<Vec<String>>,
	events: broadcast::Sender<SurfaceEvent>,
}

impl FakeObs {
	fn new() -> Arc<Self> {
		let (events, _) = broadcast::channel(16);
		Arc::new(Self {
			connected: AtomicBool::new(true),
			log: Mutex::new(Vec::new()),
			events,
		})
	}

	fn push(&self, entry: String) {
		self.log.lock().unwrap().push(entry);
	}

	fn log(&self) -> Vec<String> {
		self.log.lock().unwrap().clone()
	}

	fn media_ended(&self, source: &str) {
		let _ = self.events.send(SurfaceEvent::MediaEnded { source_name: source.to_string() });
	}
}

#[async_trait]
impl ControlSurface for FakeObs {
	fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}

	async fn switch_scene(&self, scene_name: &str) -> SurfaceResult<()> {
		self.push(format!("scene {scene_name}"));
		Ok(())
	}

	async fn current_scene(&self) -> SurfaceResult<String> {
		Ok("Main".to_string())
	}

	async fn set_text_source(&self, source_name: &str, text: &str) -> SurfaceResult<()> {
		self.push(format!("text {source_name}={text}"));
		Ok(())
	}

	async fn set_scene_item_enabled(&self, scene_name: &str, source_name: &str, enabled: bool) -> SurfaceResult<()> {
		self.push(format!("{} {scene_name}/{source_name}", if enabled { "show" } else { "hide" }));
		Ok(())
	}

	async fn set_volume(&self, source_name: &str, volume_db: f64) -> SurfaceResult<()> {
		self.push(format!("volume {source_name}={volume_db}"));
		Ok(())
	}

	async fn set_mute(&self, source_name: &str, muted: bool) -> SurfaceResult<()> {
		self.push(format!("mute {source_name}={muted}"));
		Ok(())
	}

	async fn play_pause_media(&self, source_name: &str, pause: bool) -> SurfaceResult<()> {
		self.push(format!("pause {source_name}={pause}"));
		Ok(())
	}

	async fn restart_media(&self, source_name: &str) -> SurfaceResult<()> {
		self.push(format!("restart {source_name}"));
		Ok(())
	}

	async fn set_media_source(&self, source_name: &str, path: &str) -> SurfaceResult<()> {
		self.push(format!("media {source_name}={path}"));
		Ok(())
	}

	fn subscribe(&self) -> broadcast::Receiver<SurfaceEvent> {
		self.events.subscribe()
	}
}

const PLAYLIST: &str = "#EXTM3U\n\
	#EXTINF:600,Opening\n\
	#EXTOVERLAY:skip=1\n\
	/media/opening.mp4\n\
	#EXTINF:1800,Feature\n\
	#EXTOVERLAY:hold=2\n\
	#EXTOVERLAY:delay=0\n\
	/media/feature.mp4\n";

#[tokio::test(start_paused = true)]
async fn media_end_advances_playlist_and_shows_overlay() {
	let dir = tempfile::tempdir().unwrap();
	let playlists = dir.path().join("playlists");
	tokio::fs::create_dir_all(&playlists).await.unwrap();
	tokio::fs::write(playlists.join("evening.m3u"), PLAYLIST).await.unwrap();

	let obs = FakeObs::new();
	let scheduler = Arc::new(PlaylistScheduler::new(&playlists, Arc::new(MemoryStore::new())).with_media_hook(Arc::new(SurfaceMediaHook::new(obs.clone()))));
	let overlay = Arc::new(OverlaySequencer::new(
		obs.clone(),
		OverlayConfig {
			prefix: "Now Playing: ".into(),
			..OverlayConfig::default()
		},
	));
	scheduler.add_track_listener(overlay.clone()).await;

	assert_eq!(scheduler.load_dir().await.unwrap(), vec!["evening".to_string()]);
	let first = scheduler.activate("evening", 0).await.unwrap().unwrap();
	assert_eq!(first.title, "Opening");

	let cancel = CancellationToken::new();
	let task = scheduler.register_auto_advance(obs.subscribe(), "MediaSource", cancel.clone()).await;

	obs.media_ended("SomeOtherSource");
	obs.media_ended("MediaSource");
	tokio::time::sleep(Duration::from_millis(500)).await;

	let status = overlay.status();
	assert!(status.active);
	assert_eq!(status.current_text, "Now Playing: Feature");
	assert_eq!(status.playlist, "evening");
	assert_eq!(status.position, 1);

	tokio::time::sleep(Duration::from_secs(3)).await;
	assert_eq!(overlay.status().phase, OverlayPhase::Idle);

	assert_eq!(
		obs.log(),
		vec![
			"media MediaSource=/media/opening.mp4".to_string(),
			"media MediaSource=/media/feature.mp4".to_string(),
			"text TitleOverlay=Now Playing: Feature".to_string(),
			"show Main/TitleOverlay".to_string(),
			"hide Main/TitleOverlay".to_string(),
		]
	);

	let saved = scheduler.load_state().await.unwrap().unwrap();
	assert_eq!(saved.active_playlist.as_deref(), Some("evening"));
	assert_eq!(saved.position, 1);

	cancel.cancel();
	task.await.unwrap();
}

#[tokio::test]
async fn written_playlist_reloads_with_overlay_metadata() {
	let original = M3uParser::parse_str("evening", PLAYLIST);
	let reparsed = M3uParser::parse_str("evening", &M3uParser::write_string(&original));

	assert_eq!(reparsed.items, original.items);
}

use crate::routes::{self, AppState};
use crate::surface::ObsSurface;
use crate::{Config, Result};
use obs_websocket::ObsClient;
use playout::{ControlSurface, JsonFileStore, OverlaySequencer, PlaylistScheduler, PresetActivator, SurfaceMediaHook};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

pub mod connection;

/// Relay service wiring OBS, the playout core and the HTTP API together
pub struct RelayService {
	config: Config,
	client: Arc<ObsClient>,
	surface: Arc<ObsSurface>,
	state: AppState,
	cancel_token: CancellationToken,
}

impl RelayService {
	/// Build every component and load playlists, presets and saved playback state
	pub async fn new(config: Config) -> Self {
		tracing::info!("🔌 Initializing OBS relay");

		let client = Arc::new(ObsClient::new(config.obs_config()));
		let surface = Arc::new(ObsSurface::new(Arc::clone(&client)));
		let control: Arc<dyn ControlSurface> = surface.clone();

		let scheduler = Arc::new(
			PlaylistScheduler::new(config.playlist_dir.clone(), Arc::new(JsonFileStore::new(config.state_dir.clone())))
				.with_media_hook(Arc::new(SurfaceMediaHook::new(Arc::clone(&control))))
				.with_source_name(config.playlist_source.clone()),
		);
		let overlay = Arc::new(OverlaySequencer::new(Arc::clone(&control), config.overlay_config()));
		scheduler.add_track_listener(overlay.clone()).await;
		let presets = Arc::new(PresetActivator::new(Arc::clone(&control)).with_scheduler(Arc::clone(&scheduler)));

		let state = AppState {
			surface: control,
			scheduler,
			overlay,
			presets,
			api_key: config.api_key().map(Arc::from),
		};

		let service = Self {
			config,
			client,
			surface,
			state,
			cancel_token: CancellationToken::new(),
		};
		service.load_presets().await;
		service.load_playlists().await;
		service
	}

	async fn load_presets(&self) {
		let presets = &self.state.presets;
		if let Some(path) = &self.config.presets_file {
			if let Err(e) = presets.register_from_file(path).await {
				tracing::warn!("⚠️ Could not load presets from {}: {}", path.display(), e);
			}
		}
		presets.register_defaults().await;
		tracing::info!("🎬 {} scene presets registered", presets.list().await.len());
	}

	async fn load_playlists(&self) {
		let scheduler = &self.state.scheduler;
		match scheduler.load_dir().await {
			Ok(names) => tracing::info!("📂 Loaded {} playlists from {}: {:?}", names.len(), scheduler.playlist_dir().display(), names),
			Err(e) => tracing::warn!("⚠️ Could not scan playlist directory {}: {}", scheduler.playlist_dir().display(), e),
		}

		if scheduler.restore_state().await {
			return;
		}
		if let Some(default) = &self.config.playlist_default {
			match scheduler.activate(default, 0).await {
				Ok(_) => tracing::info!("▶️ Activated default playlist '{}'", default),
				Err(e) => tracing::warn!("⚠️ Default playlist '{}' not activated: {}", default, e),
			}
		}
	}

	pub const fn state(&self) -> &AppState {
		&self.state
	}

	/// Run the service until shutdown
	pub async fn run(self) -> Result<()> {
		let service = Arc::new(self);

		// Setup graceful shutdown handler
		let shutdown_token = service.cancel_token.clone();
		tokio::spawn(async move {
			match tokio::signal::ctrl_c().await {
				Ok(()) => {
					tracing::info!("🛑 Shutdown signal received");
					shutdown_token.cancel();
				}
				Err(e) => {
					tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
				}
			}
		});

		// Spawn service tasks
		let connection_manager = service.clone().spawn_connection_manager();
		let event_bridge = service.surface.spawn_event_bridge(service.cancel_token.clone());
		// Restored state may have changed the media source name
		let source_name = service.state.scheduler.status().await.source_name;
		let auto_advance = service.state.scheduler.register_auto_advance(service.surface.subscribe(), source_name, service.cancel_token.clone()).await;

		let served = service.serve().await;
		if let Err(e) = &served {
			tracing::error!("❌ HTTP server failed: {}", e);
		}

		service.cancel_token.cancel();
		tracing::info!("🔄 Initiating graceful shutdown...");

		// Give tasks time to complete gracefully
		let _ = timeout(service.config.shutdown_timeout(), async {
			let _ = tokio::join!(connection_manager, event_bridge, auto_advance);
		})
		.await;

		if service.state.overlay.status().active {
			service.state.overlay.hide().await;
		}
		service.client.disconnect().await;

		tracing::info!("✅ Graceful shutdown complete");
		served
	}

	/// Serve the HTTP API until the cancel token fires
	async fn serve(&self) -> Result<()> {
		let listener = TcpListener::bind(self.config.api_addr()).await?;
		tracing::info!("🌐 HTTP API listening on {}", listener.local_addr()?);

		let server_token = self.cancel_token.clone();
		axum::serve(listener, routes::router(self.state.clone()))
			.with_graceful_shutdown(async move {
				server_token.cancelled().await;
			})
			.await?;

		tracing::info!("HTTP API stopped");
		Ok(())
	}
}

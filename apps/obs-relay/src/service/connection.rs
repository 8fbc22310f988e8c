use crate::RelayService;
use obs_websocket::RetryPolicy;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

impl RelayService {
	/// Spawn task keeping the OBS connection up, reconnecting with exponential backoff
	pub fn spawn_connection_manager(self: Arc<Self>) -> JoinHandle<()> {
		tokio::spawn(async move {
			tracing::info!("🔗 Starting OBS connection manager");
			let mut retry = RetryPolicy::new(self.config.retry_config());

			loop {
				let connected = tokio::select! {
					() = self.cancel_token.cancelled() => break,
					result = self.client.connect() => result,
				};

				match connected {
					Ok(()) => {
						retry.reset();
						tracing::info!("💚 OBS connected");
						// Loads skipped while disconnected, including the one made by startup restore
						if let Some(item) = self.state.scheduler.resync().await {
							tracing::info!("📼 Loaded '{}' into OBS after connecting", item.title);
						}
						tokio::select! {
							() = self.cancel_token.cancelled() => break,
							() = self.client.closed() => tracing::warn!("💔 OBS connection lost"),
						}
					}
					Err(e) => tracing::warn!("❌ OBS connection failed: {}", e),
				}

				let Some(delay) = retry.next_delay() else {
					tracing::error!("❌ Giving up on OBS after {} attempts", retry.attempts());
					break;
				};
				tracing::info!("🔄 Reconnecting to OBS in {:?} (attempt {})", delay, retry.attempts());

				tokio::select! {
					() = self.cancel_token.cancelled() => break,
					() = sleep(delay) => {}
				}
			}

			tracing::info!("✅ Connection manager stopped");
		})
	}
}

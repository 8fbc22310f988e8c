use anyhow::Result;
use clap::Parser;
use obs_relay::{Config, RelayService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn init_tracing(config: &Config) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "obs_relay=info,playout=info,obs_websocket=info,tower_http=info".into());
	let fmt_layer = if config.log_json {
		tracing_subscriber::fmt::layer().json().boxed()
	} else {
		tracing_subscriber::fmt::layer().boxed()
	};

	tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();
	init_tracing(&config);

	tracing::info!("🚀 Starting OBS relay");
	tracing::info!("📋 Configuration loaded - OBS: {}, API: {}", config.obs_config().url(), config.api_addr());

	let service = RelayService::new(config).await;
	service.run().await?;

	tracing::info!("👋 OBS relay shutdown complete");
	Ok(())
}

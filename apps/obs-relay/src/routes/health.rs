use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct HealthResponse {
	status: &'static str,
	obs_connected: bool,
	version: &'static str,
}

pub fn routes() -> Router<AppState> {
	Router::new().route("/health", get(health)).route("/healthz", get(healthz))
}

#[axum::debug_handler]
#[instrument(name = "health", skip(state))]
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
	let response = HealthResponse {
		status: "ok",
		obs_connected: state.surface.is_connected(),
		version: env!("CARGO_PKG_VERSION"),
	};

	(StatusCode::OK, Json(response))
}

/// 503 while OBS is unreachable, for load balancers and supervisors
#[instrument(name = "healthz", skip(state))]
async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
	let obs_connected = state.surface.is_connected();
	let (code, status) = if obs_connected { (StatusCode::OK, "ok") } else { (StatusCode::SERVICE_UNAVAILABLE, "degraded") };
	let response = HealthResponse {
		status,
		obs_connected,
		version: env!("CARGO_PKG_VERSION"),
	};

	(code, Json(response))
}

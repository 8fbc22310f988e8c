use super::AppState;
use crate::error::ApiError;
use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use playout::{OverlayConfig, OverlayConfigPatch, OverlayReceipt, OverlayStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/overlay/status", get(status))
		.route("/overlay/config", get(config).post(update_config))
		.route("/overlay/trigger", post(trigger))
		.route("/overlay/trigger-current", post(trigger_current))
		.route("/overlay/hide", post(hide))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
	#[serde(flatten)]
	status: OverlayStatus,
	config: OverlayConfig,
}

#[instrument(skip(state))]
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
	Json(StatusResponse {
		status: state.overlay.status(),
		config: state.overlay.config().await,
	})
}

#[instrument(skip(state))]
async fn config(State(state): State<AppState>) -> Json<OverlayConfig> {
	Json(state.overlay.config().await)
}

#[instrument(skip(state))]
async fn update_config(State(state): State<AppState>, Json(patch): Json<OverlayConfigPatch>) -> Json<OverlayConfig> {
	Json(state.overlay.update_config(patch).await)
}

#[derive(Debug, Deserialize)]
pub struct TriggerBody {
	text: String,
	hold_sec: Option<f64>,
	delay_sec: Option<f64>,
}

#[instrument(skip(state))]
async fn trigger(State(state): State<AppState>, Json(body): Json<TriggerBody>) -> Result<Json<OverlayReceipt>, ApiError> {
	if body.text.trim().is_empty() {
		return Err(ApiError::BadRequest("overlay text must not be empty".to_string()));
	}
	Ok(Json(state.overlay.trigger(body.text, body.hold_sec, body.delay_sec).await))
}

/// Re-announce the track the scheduler is on, without moving the cursor
#[instrument(skip(state))]
async fn trigger_current(State(state): State<AppState>) -> Result<Json<OverlayReceipt>, ApiError> {
	let item = state.scheduler.current_item().await.ok_or_else(|| ApiError::NotFound("No active track".to_string()))?;
	Ok(Json(state.overlay.trigger_item(&item).await))
}

#[instrument(skip(state))]
async fn hide(State(state): State<AppState>) -> Json<OverlayReceipt> {
	Json(state.overlay.hide().await)
}

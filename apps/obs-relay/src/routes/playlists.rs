use super::AppState;
use crate::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use playout::{Playlist, PlaylistItem, PlaylistSummary, SchedulerStatus, ValidationReport, ValidationSummary};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/playlists", get(list_playlists))
		.route("/playlists/status", get(status))
		.route("/playlists/validate", get(validate_all))
		.route("/playlists/next", post(next_track))
		.route("/playlists/prev", post(previous_track))
		.route("/playlists/seek/:position", post(seek))
		.route("/playlists/auto-advance", post(set_auto_advance))
		.route("/playlists/create", post(create_playlist))
		.route("/playlists/:name", get(get_playlist).delete(delete_playlist))
		.route("/playlists/:name/validate", get(validate_playlist))
		.route("/playlists/:name/activate", post(activate_playlist))
}

fn title(item: Option<PlaylistItem>) -> Option<String> {
	item.map(|item| item.title)
}

// ============================================================================
// Listing and validation
// ============================================================================

#[instrument(skip(state))]
async fn list_playlists(State(state): State<AppState>) -> Json<Vec<PlaylistSummary>> {
	Json(state.scheduler.playlists().await)
}

#[instrument(skip(state))]
async fn get_playlist(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Playlist>, ApiError> {
	state.scheduler.playlist(&name).await.map(Json).ok_or_else(|| ApiError::NotFound(format!("Playlist '{name}' not found")))
}

#[instrument(skip(state))]
async fn status(State(state): State<AppState>) -> Json<SchedulerStatus> {
	Json(state.scheduler.status().await)
}

#[instrument(skip(state))]
async fn validate_all(State(state): State<AppState>) -> Json<ValidationSummary> {
	Json(state.scheduler.validate_all().await)
}

#[instrument(skip(state))]
async fn validate_playlist(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<ValidationReport>, ApiError> {
	Ok(Json(state.scheduler.validate_playlist(&name).await?))
}

// ============================================================================
// Playback
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ActivateQuery {
	#[serde(default)]
	position: usize,
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	playlist: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	position: Option<usize>,
	track: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	status: Option<&'static str>,
}

impl TrackResponse {
	const fn track(track: Option<String>) -> Self {
		Self {
			playlist: None,
			position: None,
			track,
			status: None,
		}
	}
}

#[instrument(skip(state))]
async fn activate_playlist(State(state): State<AppState>, Path(name): Path<String>, Query(query): Query<ActivateQuery>) -> Result<Json<TrackResponse>, ApiError> {
	let item = state.scheduler.activate(&name, query.position).await?;
	Ok(Json(TrackResponse {
		playlist: Some(name),
		position: Some(query.position),
		..TrackResponse::track(title(item))
	}))
}

#[instrument(skip(state))]
async fn next_track(State(state): State<AppState>) -> Json<TrackResponse> {
	let track = title(state.scheduler.next().await);
	let status = if track.is_some() { "advanced" } else { "end" };
	Json(TrackResponse {
		status: Some(status),
		..TrackResponse::track(track)
	})
}

#[instrument(skip(state))]
async fn previous_track(State(state): State<AppState>) -> Json<TrackResponse> {
	Json(TrackResponse::track(title(state.scheduler.previous().await)))
}

#[instrument(skip(state))]
async fn seek(State(state): State<AppState>, Path(position): Path<usize>) -> Json<TrackResponse> {
	let track = title(state.scheduler.seek(position).await);
	Json(TrackResponse {
		position: Some(position),
		..TrackResponse::track(track)
	})
}

#[derive(Debug, Deserialize)]
pub struct AutoAdvanceBody {
	enabled: bool,
}

#[instrument(skip(state))]
async fn set_auto_advance(State(state): State<AppState>, Json(body): Json<AutoAdvanceBody>) -> Json<serde_json::Value> {
	state.scheduler.set_auto_advance(body.enabled).await;
	Json(serde_json::json!({ "auto_advance": body.enabled, "status": "ok" }))
}

// ============================================================================
// Management
// ============================================================================

const fn default_loop() -> bool {
	true
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistBody {
	name: String,
	items: Vec<String>,
	#[serde(rename = "loop", default = "default_loop")]
	looping: bool,
	/// Also write the playlist to the playlist directory
	#[serde(default)]
	save: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
	#[serde(flatten)]
	playlist: PlaylistSummary,
	status: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	saved_to: Option<String>,
}

#[instrument(skip(state, body), fields(name = %body.name))]
async fn create_playlist(State(state): State<AppState>, Json(body): Json<CreatePlaylistBody>) -> Result<Json<CreatedResponse>, ApiError> {
	let name = body.name.trim();
	if name.is_empty() {
		return Err(ApiError::BadRequest("playlist name must not be empty".to_string()));
	}

	let playlist = state.scheduler.create_playlist(name, body.items, body.looping).await?;
	let saved_to = if body.save { Some(state.scheduler.save_playlist(name).await?.display().to_string()) } else { None };

	Ok(Json(CreatedResponse {
		playlist,
		status: "created",
		saved_to,
	}))
}

#[instrument(skip(state))]
async fn delete_playlist(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
	state.scheduler.delete_playlist(&name).await?;
	info!("Deleted playlist via API: {}", name);
	Ok(Json(serde_json::json!({ "status": "deleted", "name": name })))
}

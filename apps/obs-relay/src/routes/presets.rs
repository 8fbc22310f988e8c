use super::AppState;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use playout::{PresetActivation, ScenePreset};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
pub struct PresetList {
	active: Option<String>,
	presets: Vec<ScenePreset>,
}

pub fn routes() -> Router<AppState> {
	Router::new().route("/presets", get(list_presets)).route("/presets/:name/activate", post(activate_preset))
}

#[instrument(skip(state))]
async fn list_presets(State(state): State<AppState>) -> Json<PresetList> {
	Json(PresetList {
		active: state.presets.active().await,
		presets: state.presets.list().await,
	})
}

#[instrument(skip(state))]
async fn activate_preset(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<PresetActivation>, ApiError> {
	Ok(Json(state.presets.activate(&name).await?))
}

#[cfg(test)]
mod tests {
	use crate::routes::{router, testing};
	use axum::body::{to_bytes, Body};
	use axum::http::{Request, StatusCode};
	use serde_json::Value;
	use tower::ServiceExt;

	async fn post(app: axum::Router, uri: &str) -> (StatusCode, Value) {
		let request = Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap();
		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, serde_json::from_slice(&body).unwrap())
	}

	#[tokio::test]
	async fn test_activate_reports_each_step() {
		let dir = tempfile::tempdir().unwrap();
		let state = testing::state(dir.path(), None);
		state.presets.register_defaults().await;
		let app = router(state);

		let (status, body) = post(app.clone(), "/presets/brb/activate").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["preset"], "brb");
		assert_eq!(body["actions"][0]["action"], "switch_scene");
		assert_eq!(body["actions"][0]["status"], "skipped");

		let (status, body) = post(app, "/presets/nope/activate").await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert!(body["error"].as_str().unwrap().contains("nope"));
	}
}

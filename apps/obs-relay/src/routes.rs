//! HTTP API over the playout core.

mod health;
mod overlay;
mod playlists;
mod presets;

use crate::error::ApiError;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use playout::{ControlSurface, OverlaySequencer, PlaylistScheduler, PresetActivator};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handles every route works through
#[derive(Clone)]
pub struct AppState {
	pub surface: Arc<dyn ControlSurface>,
	pub scheduler: Arc<PlaylistScheduler>,
	pub overlay: Arc<OverlaySequencer>,
	pub presets: Arc<PresetActivator>,
	pub api_key: Option<Arc<str>>,
}

pub fn router(state: AppState) -> Router {
	let protected = Router::new()
		.merge(playlists::routes())
		.merge(overlay::routes())
		.merge(presets::routes())
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

	Router::new()
		.merge(health::routes())
		.merge(protected)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}

/// Bearer token check, a no-op when no key is configured
async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
	if let Some(expected) = state.api_key.as_deref() {
		let token = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "))
			.ok_or(ApiError::Unauthorized)?;
		if token.trim() != expected {
			return Err(ApiError::Forbidden);
		}
	}
	Ok(next.run(request).await)
}


#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::StatusCode;
	use tower::ServiceExt;

	fn get(uri: &str, token: Option<&str>) -> Request {
		let mut builder = axum::http::Request::builder().uri(uri);
		if let Some(token) = token {
			builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
		}
		builder.body(Body::empty()).unwrap()
	}

	#[tokio::test]
	async fn test_api_key_guards_everything_but_health() {
		let dir = tempfile::tempdir().unwrap();
		let app = router(testing::state(dir.path(), Some("secret")));

		let health = app.clone().oneshot(get("/health", None)).await.unwrap();
		assert_eq!(health.status(), StatusCode::OK);

		let missing = app.clone().oneshot(get("/playlists", None)).await.unwrap();
		assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

		let wrong = app.clone().oneshot(get("/playlists", Some("guess"))).await.unwrap();
		assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

		let ok = app.oneshot(get("/playlists", Some("secret"))).await.unwrap();
		assert_eq!(ok.status(), StatusCode::OK);
	}

	#[tokio::test]
	async fn test_open_when_no_key_configured() {
		let dir = tempfile::tempdir().unwrap();
		let app = router(testing::state(dir.path(), None));
		let response = app.oneshot(get("/presets", None)).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
	}
}

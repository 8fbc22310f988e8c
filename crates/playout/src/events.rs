use crate::playlist::PlaylistItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Fired whenever the scheduler resolves a new current item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackChanged {
	pub item: PlaylistItem,
	pub playlist: String,
	pub position: usize,
}

#[async_trait]
pub trait TrackListener: Send + Sync {
	/// Label used when logging dispatch failures
	fn name(&self) -> &str {
		"track-listener"
	}

	async fn on_track_changed(&self, event: &TrackChanged) -> Result<(), ListenerError>;
}

/// Adapts an async closure into a [`TrackListener`]
pub struct FnListener<F> {
	name: String,
	f: F,
}

impl<F, Fut> FnListener<F>
where
	F: Fn(TrackChanged) -> Fut + Send + Sync,
	Fut: Future<Output = Result<(), ListenerError>> + Send,
{
	pub fn new(name: impl Into<String>, f: F) -> Self {
		Self { name: name.into(), f }
	}
}

#[async_trait]
impl<F, Fut> TrackListener for FnListener<F>
where
	F: Fn(TrackChanged) -> Fut + Send + Sync,
	Fut: Future<Output = Result<(), ListenerError>> + Send,
{
	fn name(&self) -> &str {
		&self.name
	}

	async fn on_track_changed(&self, event: &TrackChanged) -> Result<(), ListenerError> {
		(self.f)(event.clone()).await
	}
}

/// Ordered listener registry; one listener failing never stops the others
#[derive(Default)]
pub struct TrackListeners {
	listeners: RwLock<Vec<Arc<dyn TrackListener>>>,
}

impl TrackListeners {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn add(&self, listener: Arc<dyn TrackListener>) {
		debug!("Track listener registered: {}", listener.name());
		self.listeners.write().await.push(listener);
	}

	/// Deliver in registration order, logging and skipping past failures
	pub async fn dispatch(&self, event: &TrackChanged) {
		let listeners = self.listeners.read().await.clone();
		for listener in listeners {
			if let Err(e) = listener.on_track_changed(event).await {
				error!("Track listener '{}' failed: {}", listener.name(), e);
			}
		}
	}
}

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Durable key/value storage for small structured records
#[async_trait]
pub trait StateStore: Send + Sync {
	async fn write(&self, key: &str, value: &Value) -> Result<(), StoreError>;

	/// `None` when nothing was ever written under `key`
	async fn read(&self, key: &str) -> Result<Option<Value>, StoreError>;
}

/// Stores each record as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
	dir: PathBuf,
}

impl JsonFileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{key}.json"))
	}
}

#[async_trait]
impl StateStore for JsonFileStore {
	async fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
		tokio::fs::create_dir_all(&self.dir).await?;
		let path = self.path_for(key);
		let tmp = path.with_extension("json.tmp");

		// Write-then-rename so a crash never leaves a truncated record behind
		tokio::fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
		tokio::fs::rename(&tmp, &path).await?;
		Ok(())
	}

	async fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
		match tokio::fs::read(self.path_for(key)).await {
			Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}
}

/// Volatile store, for tests and for running without persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
	records: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl StateStore for MemoryStore {
	async fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
		self.records.lock().await.insert(key.to_string(), value.clone());
		Ok(())
	}

	async fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
		Ok(self.records.lock().await.get(key).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[tokio::test]
	async fn test_file_store_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let store = JsonFileStore::new(dir.path().join("state"));

		assert!(store.read("playlist_state").await.unwrap().is_none());

		let record = json!({"active_playlist": "main", "position": 3});
		store.write("playlist_state", &record).await.unwrap();

		assert!(dir.path().join("state/playlist_state.json").exists());
		assert_eq!(store.read("playlist_state").await.unwrap(), Some(record));
	}

	#[tokio::test]
	async fn test_file_store_rejects_corrupt_record() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("broken.json"), b"{not json").await.unwrap();

		let store = JsonFileStore::new(dir.path());
		assert!(matches!(store.read("broken").await, Err(StoreError::Json(_))));
	}

	#[tokio::test]
	async fn test_memory_store_overwrites() {
		let store = MemoryStore::new();
		store.write("k", &json!(1)).await.unwrap();
		store.write("k", &json!(2)).await.unwrap();
		assert_eq!(store.read("k").await.unwrap(), Some(json!(2)));
	}
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObsConfig {
	pub host: String,
	pub port: u16,
	/// `None` when the server has authentication disabled
	pub password: Option<String>,
	pub connect_timeout: Duration,
	pub request_timeout: Duration,
}

impl Default for ObsConfig {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			port: 4455,
			password: None,
			connect_timeout: Duration::from_secs(10),
			request_timeout: Duration::from_secs(10),
		}
	}
}

impl ObsConfig {
	pub fn new(host: impl Into<String>, port: u16) -> Self {
		Self {
			host: host.into(),
			port,
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_password(mut self, password: Option<String>) -> Self {
		self.password = password.filter(|p| !p.is_empty());
		self
	}

	pub fn url(&self) -> String {
		format!("ws://{}:{}", self.host, self.port)
	}
}

use crate::playlist::PlaylistItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Preflight report for one playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
	pub playlist: String,
	pub valid: bool,
	pub total: usize,
	pub ok: usize,
	pub missing_count: usize,
	pub missing: Vec<String>,
}

impl ValidationReport {
	/// Check every local item on disk; remote items always pass
	pub async fn check(playlist: &str, items: &[PlaylistItem]) -> Self {
		let mut missing = Vec::new();
		for item in items {
			if !item.exists().await {
				missing.push(item.path.clone());
			}
		}

		Self {
			playlist: playlist.to_string(),
			valid: missing.is_empty(),
			total: items.len(),
			ok: items.len() - missing.len(),
			missing_count: missing.len(),
			missing,
		}
	}
}

/// Preflight reports for every loaded playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
	pub all_valid: bool,
	pub playlists: BTreeMap<String, ValidationReport>,
}

impl FromIterator<ValidationReport> for ValidationSummary {
	fn from_iter<I: IntoIterator<Item = ValidationReport>>(iter: I) -> Self {
		let playlists: BTreeMap<String, ValidationReport> = iter.into_iter().map(|report| (report.playlist.clone(), report)).collect();
		Self {
			all_valid: playlists.values().all(|report| report.valid),
			playlists,
		}
	}
}

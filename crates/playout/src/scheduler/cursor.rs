use super::persist::PersistedState;
use crate::playlist::{Playlist, PlaylistItem};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Outcome of moving the cursor forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Advance {
	/// Cursor moved to a new item
	Moved,
	/// Past the end of a non-looping playlist, cursor clamped to the last index
	Ended,
	/// No active playlist or it has no items
	Idle,
}

/// Mutable scheduler state: loaded playlists plus the playback cursor
#[derive(Debug)]
pub(crate) struct CursorState {
	pub playlists: BTreeMap<String, Playlist>,
	pub active: Option<String>,
	pub position: usize,
	/// Permutation of item indices while the active playlist shuffles, empty otherwise
	pub order: Vec<usize>,
	pub source_name: String,
	pub auto_advance: bool,
}

fn shuffled_indices(len: usize) -> Vec<usize> {
	let mut order: Vec<usize> = (0..len).collect();
	order.shuffle(&mut rand::rng());
	order
}

impl CursorState {
	pub fn new(source_name: impl Into<String>) -> Self {
		Self {
			playlists: BTreeMap::new(),
			active: None,
			position: 0,
			order: Vec::new(),
			source_name: source_name.into(),
			auto_advance: true,
		}
	}

	pub fn active_playlist(&self) -> Option<&Playlist> {
		self.active.as_ref().and_then(|name| self.playlists.get(name))
	}

	/// Real item index for the cursor, going through the permutation while shuffled
	pub fn resolve_index(&self) -> Option<usize> {
		let playlist = self.active_playlist()?;
		let len = playlist.len();
		if len == 0 {
			return None;
		}

		if playlist.shuffle && !self.order.is_empty() {
			let index = self.order[self.position % self.order.len()];
			if index < len {
				return Some(index);
			}
		}
		Some(self.position % len)
	}

	pub fn current_item(&self) -> Option<&PlaylistItem> {
		let index = self.resolve_index()?;
		self.active_playlist()?.items.get(index)
	}

	/// Point the cursor at `name`; `false` when no such playlist is loaded
	pub fn activate(&mut self, name: &str, position: usize) -> bool {
		let Some(playlist) = self.playlists.get(name) else {
			return false;
		};
		self.order = if playlist.shuffle { shuffled_indices(playlist.len()) } else { Vec::new() };
		self.active = Some(name.to_string());
		self.position = position;
		true
	}

	pub fn advance(&mut self) -> Advance {
		let Some(playlist) = self.active_playlist() else {
			return Advance::Idle;
		};
		let len = playlist.len();
		if len == 0 {
			return Advance::Idle;
		}
		let (looping, shuffle) = (playlist.looping, playlist.shuffle);

		self.position += 1;
		if self.position >= len {
			if !looping {
				self.position = len - 1;
				return Advance::Ended;
			}
			self.position = 0;
			if shuffle {
				self.order = shuffled_indices(len);
			}
		}
		Advance::Moved
	}

	/// Step back one position, never wrapping; `false` when there is nothing to step through
	pub fn retreat(&mut self) -> bool {
		if self.active_playlist().map_or(true, Playlist::is_empty) {
			return false;
		}
		self.position = self.position.saturating_sub(1);
		true
	}

	/// Clamp into `[0, len - 1]`; `false` when no playlist is active
	pub fn seek(&mut self, position: usize) -> bool {
		let Some(playlist) = self.active_playlist() else {
			return false;
		};
		self.position = position.min(playlist.len().saturating_sub(1));
		true
	}

	/// Replace or add a playlist, keeping the cursor consistent if it is the active one
	pub fn insert(&mut self, playlist: Playlist) {
		let name = playlist.name.clone();
		let is_active = self.active.as_deref() == Some(name.as_str());
		let reshuffle = playlist.shuffle.then(|| playlist.len());
		self.playlists.insert(name, playlist);

		if is_active {
			self.order = reshuffle.map(shuffled_indices).unwrap_or_default();
		}
	}

	pub fn remove(&mut self, name: &str) -> Option<Playlist> {
		let removed = self.playlists.remove(name)?;
		if self.active.as_deref() == Some(name) {
			self.active = None;
			self.position = 0;
			self.order.clear();
		}
		Some(removed)
	}

	pub fn snapshot(&self) -> PersistedState {
		PersistedState {
			active_playlist: self.active.clone(),
			position: self.position,
			source_name: self.source_name.clone(),
			auto_advance: self.auto_advance,
		}
	}
}

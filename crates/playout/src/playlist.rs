//! Playlist model and the M3U codec used to load and save it.

mod item;
mod parser;

pub use item::{Playlist, PlaylistItem, PlaylistSummary, TrackMetadata};
pub use parser::M3uParser;

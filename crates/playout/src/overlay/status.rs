use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPhase {
	#[default]
	Idle,
	Delaying,
	Holding,
}

/// Observable state of the overlay sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayStatus {
	/// True only while the overlay is visible
	pub active: bool,
	pub phase: OverlayPhase,
	pub current_text: String,
	pub track_title: String,
	pub playlist: String,
	pub position: usize,
	/// Seconds of hold left, one decimal
	pub timer_remaining: f64,
}

impl OverlayStatus {
	/// Back to idle; the last track association is kept
	pub(crate) fn reset(&mut self) {
		self.active = false;
		self.phase = OverlayPhase::Idle;
		self.current_text.clear();
		self.timer_remaining = 0.0;
	}
}

/// Published to external listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OverlayEvent {
	Triggered { text: String, hold_sec: f64, delay_sec: f64 },
	Hidden,
}

/// Result returned by a trigger or hide request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverlayReceipt {
	Triggered { text: String, hold_sec: f64, delay_sec: f64, source: String },
	Hidden { source: String },
}

pub(crate) fn round_tenths(seconds: f64) -> f64 {
	(seconds * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_receipt_shapes() {
		let hidden = OverlayReceipt::Hidden { source: "TitleOverlay".into() };
		assert_eq!(serde_json::to_value(hidden).unwrap(), json!({"status": "hidden", "source": "TitleOverlay"}));
		assert_eq!(serde_json::to_value(OverlayEvent::Hidden).unwrap(), json!({"event": "hidden"}));
	}

	#[test]
	fn test_round_tenths() {
		assert!((round_tenths(7.749) - 7.7).abs() < 1e-9);
		assert!((round_tenths(0.05) - 0.1).abs() < 1e-9);
	}
}

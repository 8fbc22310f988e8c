use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Attempts before giving up, 0 retries forever
	pub max_attempts: usize,
	pub initial_delay: Duration,
	pub max_delay: Duration,
	pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 0,
			initial_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(60),
			backoff_multiplier: 1.5,
		}
	}
}

/// Exponential backoff between reconnect attempts
#[derive(Debug)]
pub struct RetryPolicy {
	config: RetryConfig,
	attempts: usize,
	current_delay: Duration,
}

impl RetryPolicy {
	pub const fn new(config: RetryConfig) -> Self {
		let current_delay = config.initial_delay;
		Self {
			config,
			attempts: 0,
			current_delay,
		}
	}

	/// Delay before the next attempt, `None` once attempts are exhausted
	pub fn next_delay(&mut self) -> Option<Duration> {
		if self.config.max_attempts > 0 && self.attempts >= self.config.max_attempts {
			return None;
		}
		self.attempts += 1;

		let delay = self.current_delay;
		self.current_delay = self.current_delay.mul_f64(self.config.backoff_multiplier.max(1.0)).min(self.config.max_delay);
		Some(delay)
	}

	pub const fn attempts(&self) -> usize {
		self.attempts
	}

	pub fn reset(&mut self) {
		self.attempts = 0;
		self.current_delay = self.config.initial_delay;
	}
}

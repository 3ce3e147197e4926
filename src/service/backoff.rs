// Poll interval backoff while the client is not running

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PollBackoff {
  base: Duration,
  max: Duration,
  current: Duration,
}

impl PollBackoff {
  pub fn new(base: Duration, max: Duration) -> Self {
    let max = max.max(base);
    Self {
      base,
      max,
      current: base,
    }
  }

  /// Another tick without a client: double the interval up to the cap.
  pub fn record_absent(&mut self) -> Duration {
    self.current = self.current.saturating_mul(2).min(self.max);
    self.current
  }

  pub fn reset(&mut self) {
    self.current = self.base;
  }

  pub fn current(&self) -> Duration {
    self.current
  }

  pub fn is_backing_off(&self) -> bool {
    self.current > self.base
  }
}

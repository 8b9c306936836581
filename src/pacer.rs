//! Request pacing
//!
//! The portal has no published rate limit; the batch keeps a fixed pause
//! after every roll number so that at most one lookup pair is in flight and
//! consecutive pairs are spaced out.

use std::time::Duration;
use tracing::debug;

/// Fixed pause taken after each roll number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPacer {
    delay: Duration,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A pacer that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }
        debug!("Pausing {:?} before next request", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

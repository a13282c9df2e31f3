use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between the starts of consecutive records,
/// regardless of how long each record took or whether it succeeded.
pub struct Throttle {
    interval: Duration,
    last_start: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle { interval, last_start: None }
    }

    /// Wait until the next record may start, then mark it started.
    pub async fn tick(&mut self) {
        if let Some(prev) = self.last_start {
            sleep_until(prev + self.interval).await;
        }
        self.last_start = Some(Instant::now());
    }
}

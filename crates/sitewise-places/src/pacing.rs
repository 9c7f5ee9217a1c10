use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Enforces a minimum gap between consecutive requests from one client.
#[derive(Debug)]
pub(crate) struct RequestPacer {
    min_gap: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub(crate) fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until `min_gap` has passed since the previous call returned.
    pub(crate) async fn wait_for_slot(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

//! Sliding-window admission control, one window per domain.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

/// Bounds the number of requests per domain within a trailing window.
///
/// Prune-check-append runs under one lock acquisition, so the
/// check-and-increment is atomic even on a multi-threaded runtime; the
/// ceiling is never overshot.
pub struct RateLimiter {
    max_per_window: usize,
    window: Duration,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request for `domain` if its budget allows one more within
    /// the current window. Returns false, recording nothing, otherwise.
    pub fn try_acquire(&self, domain: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock();
        let stamps = windows.entry(domain.to_string()).or_default();

        while stamps
            .front()
            .is_some_and(|&stamp| now.duration_since(stamp) >= self.window)
        {
            stamps.pop_front();
        }

        if stamps.len() >= self.max_per_window {
            return false;
        }
        stamps.push_back(now);
        true
    }

    /// Drops all recorded windows.
    pub fn clear(&self) {
        self.windows.lock().clear();
    }
}

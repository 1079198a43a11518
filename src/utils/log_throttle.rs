use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WindowState {
    window_started_at: Instant,
    suppressed: u64,
}

/// Rate limiter for repetitive log lines, keyed by an arbitrary string.
#[derive(Debug)]
pub struct LogThrottle {
    interval: Duration,
    windows: HashMap<String, WindowState>,
}

impl LogThrottle {
    pub fn new(interval: Duration) -> Self {
        LogThrottle {
            interval,
            windows: HashMap::new(),
        }
    }

    /// Returns `Some(suppressed_count)` when a log for `key` should be emitted,
    /// otherwise `None` and the event is counted as suppressed for the active window.
    pub fn should_emit(&mut self, key: &str) -> Option<u64> {
        let now = Instant::now();

        match self.windows.get_mut(key) {
            Some(state) => {
                if now.duration_since(state.window_started_at) >= self.interval {
                    let suppressed = state.suppressed;
                    state.window_started_at = now;
                    state.suppressed = 0;
                    Some(suppressed)
                } else {
                    state.suppressed += 1;
                    None
                }
            }
            None => {
                self.windows.insert(
                    key.to_string(),
                    WindowState {
                        window_started_at: now,
                        suppressed: 0,
                    },
                );
                Some(0)
            }
        }
    }

    /// Forgets the window of `key`, so the next event is emitted right away.
    pub fn reset(&mut self, key: &str) {
        self.windows.remove(key);
    }
}

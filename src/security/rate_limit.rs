use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window_secs: 60,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Sliding-window rate limiter keyed by an opaque identifier (the gateway
/// uses the client IP). Timestamps outside the window are pruned before
/// every check, so stored state never exceeds the limit plus the request
/// being admitted.
///
/// State is per process; behind several workers each holds its own window.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject a request. Rejection returns the seconds until the
    /// oldest in-window timestamp expires, for a `Retry-After` header.
    pub fn check(&self, identifier: &str, settings: &RateLimitSettings) -> Result<(), u64> {
        let window = settings.window();
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        let timestamps = windows.entry(identifier.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < window);

        if timestamps.len() >= settings.max_requests as usize {
            let retry_after = timestamps
                .first()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)).as_secs())
                .unwrap_or(settings.window_secs)
                .max(1);
            warn!("rate limit exceeded for {}", identifier);
            return Err(retry_after);
        }
        timestamps.push(now);
        Ok(())
    }

    /// Drop identifiers whose whole window has expired. Called
    /// opportunistically so the map does not grow with one-off clients.
    pub fn cleanup_stale(&self, settings: &RateLimitSettings) {
        let window = settings.window();
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        windows.retain(|_, timestamps| {
            timestamps
                .last()
                .map(|t| now.duration_since(*t) < window)
                .unwrap_or(false)
        });
    }

    #[cfg(test)]
    fn tracked_identifiers(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

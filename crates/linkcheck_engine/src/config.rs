use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::fetch::FetchSettings;

/// Produces the timestamp stamped on each verdict.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    /// Pause after every verdict except `Empty`, to keep the request rate polite.
    pub request_delay: Duration,
    /// How often a paused batch re-checks its flags.
    pub pause_poll_interval: Duration,
    pub checked_at: Clock,
}

impl EngineConfig {
    pub fn with_fetch(fetch: FetchSettings) -> Self {
        Self {
            fetch,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            request_delay: Duration::from_secs(2),
            pause_poll_interval: Duration::from_millis(500),
            checked_at: Arc::new(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("fetch", &self.fetch)
            .field("request_delay", &self.request_delay)
            .field("pause_poll_interval", &self.pause_poll_interval)
            .finish_non_exhaustive()
    }
}

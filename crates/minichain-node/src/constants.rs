use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:7777";

/// Pause after a failed accept before trying again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

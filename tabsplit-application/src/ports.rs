use std::time::{SystemTime, UNIX_EPOCH};

use tabsplit_domain::Timestamp;

/// Source of "now" for `lastModified` stamping. The reducer holds the clock
/// behind this seam so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock milliseconds since the Unix epoch.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(elapsed.as_millis() as i64)
    }
}

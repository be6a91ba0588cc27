use std::time::{SystemTime, UNIX_EPOCH};

use crate::analytics::domain::clock::{Clock, Timestamp};

/// Wall clock in seconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

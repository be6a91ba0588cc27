use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::analytics::domain::clock::{Clock, Timestamp};

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can hand one clone to an
/// aggregator and keep another to advance it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clones_share_time() {
        let clock = ManualClock::new(10.0);
        let handle = clock.clone();
        handle.advance(2.5);
        assert_relative_eq!(clock.now(), 12.5);
        handle.set(1.0);
        assert_relative_eq!(clock.now(), 1.0);
    }
}

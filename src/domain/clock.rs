use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of creation timestamps for new reservations.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn get_current_time_in_ms(&self) -> i64;
}

pub type SharedClock = Arc<dyn Clock>;

/// Wall clock, milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn get_current_time_in_ms(&self) -> i64 {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Clock frozen at a given instant. Used to make reservation batches reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    time_in_ms: i64,
}

impl FixedClock {
    pub fn new(time_in_ms: i64) -> Self {
        FixedClock { time_in_ms }
    }
}

impl Clock for FixedClock {
    fn get_current_time_in_ms(&self) -> i64 {
        self.time_in_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_epoch() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.get_current_time_in_ms() > 1_577_836_800_000);
        assert_eq!(FixedClock::new(7).get_current_time_in_ms(), 7);
    }
}

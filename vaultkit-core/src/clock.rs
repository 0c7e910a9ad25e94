//! Time source abstraction.
//!
//! Record timestamps come from a [`Clock`] injected at vault construction,
//! so tests can pin time to fixed values instead of sleeping.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of record timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current time as Unix seconds.
    fn now_unix(&self) -> i64;
}

/// System wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
            })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    use super::Clock;

    /// Manually advanced clock shared between a test and its vault.
    #[derive(Clone, Debug, Default)]
    pub(crate) struct FixedClock(Arc<AtomicI64>);

    impl FixedClock {
        pub(crate) fn at(timestamp: i64) -> Self {
            let clock = Self::default();
            clock.set(timestamp);
            clock
        }

        pub(crate) fn set(&self, timestamp: i64) {
            self.0.store(timestamp, Ordering::Relaxed);
        }
    }

    impl Clock for FixedClock {
        fn now_unix(&self) -> i64 {
            self.0.load(Ordering::Relaxed)
        }
    }
}

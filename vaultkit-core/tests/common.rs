//! Common test utilities shared across integration tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use uuid::Uuid;
use vaultkit_core::Clock;

/// Manually advanced clock shared between a test and its vault.
#[derive(Clone, Default)]
pub struct TestClock(Arc<AtomicI64>);

impl TestClock {
    /// Creates a clock pinned at `timestamp`.
    pub fn at(timestamp: i64) -> Self {
        let clock = Self::default();
        clock.set(timestamp);
        clock
    }

    /// Moves the clock to `timestamp`.
    #[allow(dead_code, reason = "used in tests")]
    pub fn set(&self, timestamp: i64) {
        self.0.store(timestamp, Ordering::Relaxed);
    }
}

impl Clock for TestClock {
    fn now_unix(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Creates a fresh per-test directory under the system temp dir.
pub fn temp_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("vaultkit-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&path).expect("create temp root");
    path
}

/// Removes a directory created by [`temp_root`].
#[allow(dead_code, reason = "used in tests")]
pub fn cleanup(root: &Path) {
    let _ = std::fs::remove_dir_all(root);
}

//! Deterministic time for tests.

use chrono::{DateTime, Utc};
use crudstore_core::clock::Clock;

/// Fixed clock for deterministic tests.
///
/// Always returns the same time, making `occurred_on` stamps reproducible.
///
/// # Example
///
/// ```
/// use crudstore_testing::{FixedClock, test_clock};
/// use crudstore_core::clock::Clock;
///
/// let clock = test_clock();
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Epoch seconds for 2024-06-01 12:00:00 UTC, the instant [`test_clock`]
/// is pinned to.
const TEST_EPOCH_SECONDS: i64 = 1_717_243_200;

/// Create a default fixed clock for tests (2024-06-01 12:00:00 UTC).
///
/// # Panics
///
/// Panics if the pinned epoch value were outside chrono's representable
/// range, which it is not.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::from_timestamp(TEST_EPOCH_SECONDS, 0)
            .expect("pinned test instant is representable"),
    )
}

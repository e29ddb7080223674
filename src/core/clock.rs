use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Source of the current time for interest accrual.
///
/// The bank never reads the wall clock directly; whatever drives it decides
/// what "now" is, which keeps accrual deterministic under test.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep a handle while the bank
/// owns another and advance time between calls.
///
/// # Examples
///
/// ```
/// use lending_ledger::core::clock::{Clock, ManualClock};
/// use chrono::Duration;
///
/// let clock = ManualClock::at_unix(0);
/// let handle = clock.clone();
/// handle.advance(Duration::days(2));
/// assert_eq!(clock.now().timestamp(), 2 * 86_400);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Start at a unix timestamp; out-of-range values start at the epoch.
    pub fn at_unix(seconds: i64) -> Self {
        Self::new(DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default())
    }

    /// Move the clock by `by`, saturating at the bounds of the calendar.
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now = now.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock() = instant;
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        // A poisoned instant is still a valid instant.
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_unix(0)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

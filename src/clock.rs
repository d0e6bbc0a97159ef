use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

type NowFn = dyn Fn() -> u64 + Send + Sync;

/// A source of the current time, in milliseconds since the Unix epoch.
///
/// A clock is an explicit value rather than process-wide state: pass a clock
/// with an offset (for example one maintained by an NTP client) into the
/// server options or client calls that need it.  Authentication samples the
/// clock once at the start of each attempt.
#[derive(Clone)]
pub struct Clock {
    now: Arc<NowFn>,
    offset_ms: i64,
}

impl Clock {
    /// The system clock.
    pub fn system() -> Self {
        Clock::from_fn(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        })
    }

    /// A clock that always reads `ms`.
    pub fn fixed(ms: u64) -> Self {
        Clock::from_fn(move || ms)
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        Clock {
            now: Arc::new(f),
            offset_ms: 0,
        }
    }

    /// Adjust this clock by `offset_ms`, which may be negative.
    pub fn with_offset(mut self, offset_ms: i64) -> Self {
        self.offset_ms = offset_ms;
        self
    }

    pub fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    pub fn now_ms(&self) -> u64 {
        let now = (self.now)();
        if self.offset_ms >= 0 {
            now.saturating_add(self.offset_ms as u64)
        } else {
            now.saturating_sub(self.offset_ms.unsigned_abs())
        }
    }

    /// The current time in whole seconds, rounded down.
    pub fn now_secs(&self) -> u64 {
        self.now_ms() / 1000
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("offset_ms", &self.offset_ms)
            .finish_non_exhaustive()
    }
}

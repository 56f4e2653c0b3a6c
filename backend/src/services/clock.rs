//! Time source for cache expiry and season lookup

use chrono::{DateTime, Datelike, Duration, FixedOffset, Offset, Utc};
use std::sync::Mutex;

/// India Standard Time, UTC+05:30
pub const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Calendar month (1-12) in India at the given instant
pub fn ist_month(now: DateTime<Utc>) -> u32 {
    now.with_timezone(&ist()).month()
}

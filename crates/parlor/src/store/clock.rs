//! Timestamp assignment for accepted messages.

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Hands out strictly increasing UTC timestamps.
///
/// Wall-clock readings are truncated to microseconds. A reading that is not
/// later than the previous stamp (same microsecond, or the clock stepped
/// backwards) becomes the previous stamp plus one microsecond.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp using the current wall clock.
    pub fn tick(&mut self) -> DateTime<Utc> {
        self.stamp(Utc::now())
    }

    /// Stamp using an explicit reading.
    pub fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = now.trunc_subsecs(6);
        let stamped = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(stamped);
        stamped
    }

    /// Most recent stamp handed out, if any.
    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.last
    }
}

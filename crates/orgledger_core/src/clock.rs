//! Point-in-time sources used to close assignment intervals.
//!
//! # Invariants
//! - Every clock returns an absolute UTC instant.
//! - `FixedOffsetWallClock` is opt-in through configuration; the default is
//!   `SystemClock`.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

/// Hours accepted for a business timezone offset.
pub const MAX_OFFSET_HOURS: i32 = 23;

/// Source of "now" for history `end_date` values.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Upper bound on how far `now` may trail the true current instant.
    fn lag(&self) -> Duration {
        Duration::zero()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn lag(&self) -> Duration {
        (**self).lag()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn lag(&self) -> Duration {
        (**self).lag()
    }
}

/// True current UTC instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reads the UTC wall-clock time and reinterprets it as local time at a
/// fixed business offset.
///
/// With offset `+07:00`, a wall reading of `12:00` becomes the instant
/// `05:00Z`. Legacy deployments recorded history end dates this way.
/// A positive offset makes readings trail true time by the offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetWallClock {
    offset: FixedOffset,
}

impl FixedOffsetWallClock {
    /// Returns `None` when `hours` is outside `-23..=23`.
    pub fn from_hours(hours: i32) -> Option<Self> {
        if hours.abs() > MAX_OFFSET_HOURS {
            return None;
        }
        FixedOffset::east_opt(hours * 3600).map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Applies the reinterpretation to an explicit wall reading.
    pub fn reinterpret(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        // A fixed offset has exactly one mapping for every local time.
        self.offset
            .from_local_datetime(&wall.naive_utc())
            .single()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or(wall)
    }
}

impl Clock for FixedOffsetWallClock {
    fn now(&self) -> DateTime<Utc> {
        self.reinterpret(Utc::now())
    }

    fn lag(&self) -> Duration {
        Duration::seconds(i64::from(self.offset.local_minus_utc().max(0)))
    }
}

/// Clock frozen at one instant. Used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

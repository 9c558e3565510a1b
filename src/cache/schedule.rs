//! Daily publication boundary.
//!
//! Cached results expire at the next occurrence of a fixed wall-clock time
//! (14:11:00 by default) rather than after a sliding duration, so every entry
//! populated during one publication cycle flips over at the same instant.

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

pub const DEFAULT_RESET_HOUR: u32 = 14;
pub const DEFAULT_RESET_MINUTE: u32 = 11;

/// Used only when neither today's nor tomorrow's boundary can be resolved.
const FALLBACK_TTL_SECONDS: u64 = 86_400;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid publication boundary {hour:02}:{minute:02}")]
pub struct ScheduleError {
    pub hour: u32,
    pub minute: u32,
}

/// Zone in which the boundary wall-clock time is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleZone {
    Local,
    Named(Tz),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationSchedule {
    boundary: NaiveTime,
    zone: ScheduleZone,
}

impl Default for PublicationSchedule {
    fn default() -> Self {
        Self {
            boundary: NaiveTime::from_hms_opt(DEFAULT_RESET_HOUR, DEFAULT_RESET_MINUTE, 0)
                .unwrap_or_default(),
            zone: ScheduleZone::Local,
        }
    }
}

impl PublicationSchedule {
    pub fn new(hour: u32, minute: u32, zone: ScheduleZone) -> Result<Self, ScheduleError> {
        let boundary =
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or(ScheduleError { hour, minute })?;
        Ok(Self { boundary, zone })
    }

    pub fn boundary(&self) -> NaiveTime {
        self.boundary
    }

    pub fn zone(&self) -> ScheduleZone {
        self.zone
    }

    /// Seconds from the current instant until the next boundary.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_at(Utc::now())
    }

    pub fn ttl_at(&self, now: DateTime<Utc>) -> u64 {
        match self.zone {
            ScheduleZone::Local => {
                seconds_until_boundary(&now.with_timezone(&Local), self.boundary)
            }
            ScheduleZone::Named(tz) => {
                seconds_until_boundary(&now.with_timezone(&tz), self.boundary)
            }
        }
    }
}

/// Whole seconds from `now` (truncated to its second) until the first
/// occurrence of `boundary` strictly after it.
///
/// Being exactly on the boundary rolls over to the next day, so the result is
/// never zero. A boundary that falls into a DST gap is shifted forward by an
/// hour; an ambiguous one resolves to its earliest instant.
pub fn seconds_until_boundary<Z: TimeZone>(now: &DateTime<Z>, boundary: NaiveTime) -> u64 {
    let now = now.with_nanosecond(0).unwrap_or_else(|| now.clone());
    let zone = now.timezone();
    let today = now.date_naive();

    for day in [Some(today), today.succ_opt()].into_iter().flatten() {
        let Some(at) = resolve_local(&zone, day.and_time(boundary)) else {
            continue;
        };
        if at > now {
            let seconds = at.signed_duration_since(now.clone()).num_seconds();
            return u64::try_from(seconds).unwrap_or(FALLBACK_TTL_SECONDS).max(1);
        }
    }

    FALLBACK_TTL_SECONDS
}

fn resolve_local<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> Option<DateTime<Z>> {
    zone.from_local_datetime(&local).earliest().or_else(|| {
        zone.from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest()
    })
}

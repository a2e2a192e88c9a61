//! Daily trigger time and run bookkeeping.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveTime, Utc};
use thiserror::Error;

/// A wall-clock time of day in UTC at which the broadcast fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTime {
    hour: u32,
    minute: u32,
}

/// Errors from parsing a `HH:MM` time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DailyTimeError {
    #[error("expected HH:MM")]
    Format,

    #[error("hour {0} out of range (0-23)")]
    Hour(u32),

    #[error("minute {0} out of range (0-59)")]
    Minute(u32),
}

impl Default for DailyTime {
    /// 12:00 UTC (20:00 in Taipei).
    fn default() -> Self {
        Self { hour: 12, minute: 0 }
    }
}

impl DailyTime {
    /// Creates a daily time, validating the ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if hour or minute is out of range.
    pub const fn new(hour: u32, minute: u32) -> Result<Self, DailyTimeError> {
        if hour > 23 {
            return Err(DailyTimeError::Hour(hour));
        }
        if minute > 59 {
            return Err(DailyTimeError::Minute(minute));
        }
        Ok(Self { hour, minute })
    }

    fn as_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Returns the first occurrence strictly after `now`.
    #[must_use]
    pub fn next_after(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive().and_time(self.as_naive()).and_utc();
        if today > now {
            return today;
        }
        now.date_naive()
            .checked_add_days(Days::new(1))
            .map_or(today, |tomorrow| tomorrow.and_time(self.as_naive()).and_utc())
    }
}

impl FromStr for DailyTime {
    type Err = DailyTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s.trim().split_once(':').ok_or(DailyTimeError::Format)?;
        let hour = hour.parse().map_err(|_| DailyTimeError::Format)?;
        let minute = minute.parse().map_err(|_| DailyTimeError::Format)?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02} UTC", self.hour, self.minute)
    }
}

/// Outcome of one broadcast run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients that got their APOD.
    pub delivered: usize,

    /// Recipients whose fetch or send failed.
    pub failed: usize,
}

impl BroadcastReport {
    /// Total recipients visited.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.delivered + self.failed
    }
}

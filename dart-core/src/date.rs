//! Packed dates and times
//!
//! A date is `day + 31 * (month + 12 * (year - 1964))` with zero-based day and
//! month; a time is minutes since local midnight. There is no seconds field.

use crate::constants::{EPOCH_YEAR, MINUTES_PER_DAY};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// A packed date/minutes pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DartTimestamp {
    /// Packed date
    pub date: u32,
    /// Minutes since midnight
    pub minutes: u32,
}

impl DartTimestamp {
    /// Wrap already packed fields
    pub const fn new(date: u32, minutes: u32) -> Self {
        Self { date, minutes }
    }

    /// Pack calendar fields (`month` and `day` one-based)
    ///
    /// Years before the epoch clamp to the epoch.
    pub fn from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let years = (year - EPOCH_YEAR).max(0) as u32;
        let date = day.saturating_sub(1) + 31 * (month.saturating_sub(1) + 12 * years);
        Self {
            date,
            minutes: (hour * 60 + minute) % MINUTES_PER_DAY,
        }
    }

    /// Calendar year
    pub const fn year(&self) -> i32 {
        (self.date / 31 / 12) as i32 + EPOCH_YEAR
    }

    /// One-based month
    pub const fn month(&self) -> u32 {
        (self.date / 31) % 12 + 1
    }

    /// One-based day of month
    pub const fn day(&self) -> u32 {
        self.date % 31 + 1
    }

    /// Hour of day
    pub const fn hour(&self) -> u32 {
        self.minutes / 60
    }

    /// Minute of hour
    pub const fn minute(&self) -> u32 {
        self.minutes % 60
    }

    /// Pack a local clock time, dropping seconds
    pub fn from_local(time: &DateTime<Local>) -> Self {
        Self::from_parts(
            time.year(),
            time.month(),
            time.day(),
            time.hour(),
            time.minute(),
        )
    }

    /// Pack a system time in the local zone
    pub fn from_system_time(time: SystemTime) -> Self {
        Self::from_local(&DateTime::<Local>::from(time))
    }

    /// The current local time
    pub fn now() -> Self {
        Self::from_local(&Local::now())
    }

    /// Resolve against local calendar rules
    ///
    /// Returns `None` for impossible dates (the packing allows day 31 of every
    /// month) and for local times skipped by a daylight-saving transition.
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        let naive = NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())?
            .and_hms_opt(self.hour(), self.minute(), 0)?;
        Local.from_local_datetime(&naive).earliest()
    }

    /// Resolve to a system time, see [`DartTimestamp::to_local`]
    pub fn to_system_time(&self) -> Option<SystemTime> {
        self.to_local().map(SystemTime::from)
    }
}

impl fmt::Display for DartTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:4}-{:02}-{:02} {:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute()
        )
    }
}

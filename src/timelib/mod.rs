//! Calendar date handling for solar calculations
//!
//! This module provides the validated Gregorian date-plus-time value that the
//! calculators and the almanac operate on, together with the Julian-day
//! arithmetic the NOAA algorithm needs. A `CalendarDate` is an immutable
//! input value: adjustments (antimeridian day shifts, date wraparound)
//! produce a new value rather than mutating in place.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::{Result, SunfieldError};

/// A validated Gregorian calendar date paired with a time of day
///
/// Construction fails fast on out-of-range components: year must be ≥ 1,
/// month 1–12, day valid for the month (including leap years), hour 0–23,
/// minute/second 0–59, nanosecond ≤ 999,999,999.
///
/// # Examples
///
/// ```rust
/// use sunfield::CalendarDate;
///
/// let date = CalendarDate::new(2017, 10, 17).unwrap();
/// assert_eq!(date.day_of_year(), 290);
/// assert_eq!(date.julian_day(), 2458043.5);
///
/// // February 29 only exists in leap years
/// assert!(CalendarDate::new(2023, 2, 29).is_err());
/// assert!(CalendarDate::new(2024, 2, 29).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate {
    datetime: NaiveDateTime,
}

impl CalendarDate {
    /// Create a date at midnight
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        Self::with_time(year, month, day, 0, 0, 0, 0)
    }

    /// Create a date with an explicit time of day
    pub fn with_time(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanosecond: u32,
    ) -> Result<Self> {
        if year < 1 {
            return Err(SunfieldError::InvalidDate { year, month, day });
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(SunfieldError::InvalidDate { year, month, day })?;
        let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanosecond).ok_or(
            SunfieldError::InvalidTime {
                hour,
                minute,
                second,
                nanosecond,
            },
        )?;
        // from_hms_nano_opt accepts nanosecond values up to 1,999,999,999 to
        // represent leap seconds; those are out of range here.
        if nanosecond > 999_999_999 {
            return Err(SunfieldError::InvalidTime {
                hour,
                minute,
                second,
                nanosecond,
            });
        }
        Ok(Self {
            datetime: date.and_time(time),
        })
    }

    /// The year component
    pub fn year(&self) -> i32 {
        self.datetime.year()
    }

    /// The month component (1–12)
    pub fn month(&self) -> u32 {
        self.datetime.month()
    }

    /// The day-of-month component (1–31)
    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    /// The ordinal day of the year (1–366)
    pub fn day_of_year(&self) -> u32 {
        self.datetime.ordinal()
    }

    /// The hour component (0–23)
    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    /// The minute component (0–59)
    pub fn minute(&self) -> u32 {
        self.datetime.minute()
    }

    /// The second component (0–59)
    pub fn second(&self) -> u32 {
        self.datetime.second()
    }

    /// The nanosecond component
    pub fn nanosecond(&self) -> u32 {
        self.datetime.nanosecond()
    }

    /// Return a new date shifted by whole days, preserving the time of day
    ///
    /// Month and year boundaries roll correctly; this is what the
    /// antimeridian adjustment and the UTC date-wraparound correction use.
    pub fn with_days_offset(&self, days: i64) -> Self {
        Self {
            datetime: self.datetime + Duration::days(days),
        }
    }

    /// The Julian day number of this date at 0h Universal Time
    ///
    /// Uses the standard Gregorian-calendar formula (Meeus, Astronomical
    /// Algorithms ch. 7); the time-of-day component is ignored.
    pub fn julian_day(&self) -> f64 {
        let mut year = self.year();
        let mut month = self.month() as i32;
        let day = self.day() as i32;
        if month <= 2 {
            year -= 1;
            month += 12;
        }
        let a = year / 100;
        let b = 2 - a + a / 4;
        (365.25 * (year + 4716) as f64).floor() + (30.6001 * (month + 1) as f64).floor()
            + day as f64
            + b as f64
            - 1524.5
    }

    /// This value interpreted as a UTC instant
    ///
    /// Used as the "as of" instant for timezone-offset resolution so that
    /// offset math depends on the calculation date, not the wall clock.
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.datetime.and_utc()
    }
}

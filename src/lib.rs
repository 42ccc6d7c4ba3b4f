//! Sunfield: Rust solar event calculations library
//!
//! This crate computes solar events (sunrise, sunset, twilight, solar transit)
//! for an arbitrary earth location and calendar date. It provides a validated
//! geodetic location model with Vincenty ellipsoidal geodesics, two
//! interchangeable solar-position algorithms (NOAA/Meeus and US Naval
//! Observatory), and a calendar orchestrator that turns raw UTC solar angles
//! into timezone-aware local instants.
//!
//! Polar day/night and unreachable twilight dips are expected outcomes, not
//! errors: every event query returns `Option`, where `None` means the sun
//! never crosses the requested zenith on that day at that location.
//!
//! ```no_run
//! use sunfield::{AstronomicalCalendar, CalendarDate, GeoCoordinate};
//!
//! let location = GeoCoordinate::new(
//!     "Lakewood, NJ",
//!     40.0721087,
//!     -74.2400243,
//!     15.0,
//!     chrono_tz::America::New_York,
//! )
//! .unwrap();
//! let date = CalendarDate::new(2017, 10, 17).unwrap();
//! let calendar = AstronomicalCalendar::new(date, location);
//!
//! if let Some(sunrise) = calendar.sunrise() {
//!     println!("Sunrise: {}", sunrise);
//! }
//! ```

use thiserror::Error;

pub mod almanac;
pub mod calculator;
pub mod geo;
pub mod timelib;
pub mod units;

// Re-export commonly used types
pub use almanac::{AstronomicalCalendar, SolarEvent};
pub use calculator::{
    NoaaCalculator, SolarPositionCalculator, SunTimesCalculator, ZenithAdjuster,
    ASTRONOMICAL_ZENITH, CIVIL_ZENITH, GEOMETRIC_ZENITH, NAUTICAL_ZENITH,
};
pub use geo::{GeoCoordinate, GeodesicCurve};
pub use timelib::CalendarDate;
pub use units::Angle;

/// Main error type for the sunfield library
///
/// Only input validation is fatal. Astronomical non-events (polar day/night,
/// unreachable dip angles) are surfaced as `None` from the query methods,
/// never as errors.
#[derive(Debug, Error)]
pub enum SunfieldError {
    #[error("latitude {0} is out of range [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} is out of range [-180, 180]")]
    InvalidLongitude(f64),

    #[error("elevation {0} must be finite and non-negative")]
    InvalidElevation(f64),

    #[error("degrees/minutes/seconds must all be non-negative: {degrees}° {minutes}′ {seconds}″")]
    InvalidDms {
        degrees: f64,
        minutes: f64,
        seconds: f64,
    },

    #[error("invalid hemisphere letter '{letter}' (expected one of {expected})")]
    InvalidHemisphere { letter: char, expected: &'static str },

    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("invalid time of day {hour:02}:{minute:02}:{second:02}.{nanosecond:09}")]
    InvalidTime {
        hour: u32,
        minute: u32,
        second: u32,
        nanosecond: u32,
    },
}

/// Result type for sunfield operations
pub type Result<T> = std::result::Result<T, SunfieldError>;

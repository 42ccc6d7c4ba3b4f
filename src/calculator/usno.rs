//! US Naval Observatory solar calculator
//!
//! Implements the sunrise/sunset approximation published in the Almanac for
//! Computers by the Nautical Almanac Office of the US Naval Observatory. It
//! works directly from the ordinal day of the year: an approximate mean
//! anomaly, the sun's true longitude, a right ascension kept in the same
//! quadrant as the true longitude, and a closed-form local-hour-angle
//! cosine. Less precise than the NOAA/Meeus series and intentionally not
//! expected to agree with it.

use crate::geo::GeoCoordinate;
use crate::timelib::CalendarDate;
use crate::units::{
    acos_deg, asin_deg, atan_deg, cos_deg, normalize_hours, sin_deg, tan_deg, DEGREES_PER_HOUR,
};

use super::{SolarPositionCalculator, ZenithAdjuster};

/// Solar calculator based on the US Naval Observatory almanac approximation
///
/// Stateless apart from the [`ZenithAdjuster`] constants; safe to share and
/// reuse across unlimited queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SunTimesCalculator {
    adjuster: ZenithAdjuster,
}

impl SunTimesCalculator {
    /// Create a calculator with the default physical constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a calculator with custom refraction/solar-radius/earth-radius constants
    pub fn with_adjuster(adjuster: ZenithAdjuster) -> Self {
        Self { adjuster }
    }

    /// The zenith adjuster in use
    pub fn adjuster(&self) -> &ZenithAdjuster {
        &self.adjuster
    }

    fn hours_from_meridian(longitude: f64) -> f64 {
        longitude / DEGREES_PER_HOUR
    }

    /// Approximate event time in fractional days from the year's start
    ///
    /// Rising events are seeded at 6h local, setting events at 18h local.
    fn approx_time_days(day_of_year: u32, hours_from_meridian: f64, rising: bool) -> f64 {
        let seed_hour = if rising { 6.0 } else { 18.0 };
        day_of_year as f64 + (seed_hour - hours_from_meridian) / 24.0
    }

    /// The sun's approximate mean anomaly in degrees
    fn mean_anomaly(day_of_year: u32, longitude: f64, rising: bool) -> f64 {
        0.9856 * Self::approx_time_days(day_of_year, Self::hours_from_meridian(longitude), rising)
            - 3.289
    }

    /// The sun's true longitude in [0, 360)
    fn true_longitude(mean_anomaly: f64) -> f64 {
        let mut longitude = mean_anomaly
            + 1.916 * sin_deg(mean_anomaly)
            + 0.020 * sin_deg(2.0 * mean_anomaly)
            + 282.634;
        while longitude >= 360.0 {
            longitude -= 360.0;
        }
        while longitude < 0.0 {
            longitude += 360.0;
        }
        longitude
    }

    /// The sun's right ascension in hours, quadrant-matched to the true longitude
    fn right_ascension_hours(true_longitude: f64) -> f64 {
        let mut right_ascension = atan_deg(0.91764 * tan_deg(true_longitude));

        // Pull the arc tangent into the same quadrant as the true longitude
        let longitude_quadrant = (true_longitude / 90.0).floor() * 90.0;
        let ascension_quadrant = (right_ascension / 90.0).floor() * 90.0;
        right_ascension += longitude_quadrant - ascension_quadrant;

        right_ascension / DEGREES_PER_HOUR
    }

    /// Cosine of the sun's local hour angle at the requested zenith
    ///
    /// Values outside [-1, 1] mean the crossing never happens that day.
    fn cos_local_hour_angle(true_longitude: f64, latitude: f64, zenith: f64) -> f64 {
        let sin_declination = 0.39782 * sin_deg(true_longitude);
        let cos_declination = cos_deg(asin_deg(sin_declination));
        (cos_deg(zenith) - sin_declination * sin_deg(latitude))
            / (cos_declination * cos_deg(latitude))
    }

    fn event_utc_hours(
        day_of_year: u32,
        longitude: f64,
        latitude: f64,
        zenith: f64,
        rising: bool,
    ) -> Option<f64> {
        let mean_anomaly = Self::mean_anomaly(day_of_year, longitude, rising);
        let true_longitude = Self::true_longitude(mean_anomaly);
        let right_ascension = Self::right_ascension_hours(true_longitude);

        let cos_hour_angle = Self::cos_local_hour_angle(true_longitude, latitude, zenith);
        if !(-1.0..=1.0).contains(&cos_hour_angle) {
            return None;
        }
        let hour_angle = if rising {
            360.0 - acos_deg(cos_hour_angle)
        } else {
            acos_deg(cos_hour_angle)
        };

        let local_mean_time = hour_angle / DEGREES_PER_HOUR + right_ascension
            - 0.06571
                * Self::approx_time_days(day_of_year, Self::hours_from_meridian(longitude), rising)
            - 6.622;
        Some(normalize_hours(
            local_mean_time - Self::hours_from_meridian(longitude),
        ))
    }

    fn utc_event(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
        rising: bool,
    ) -> Option<f64> {
        let elevation = if adjust_for_elevation {
            location.elevation()
        } else {
            0.0
        };
        let adjusted_zenith = self.adjuster.adjust_zenith(zenith, elevation);
        Self::event_utc_hours(
            date.day_of_year(),
            location.longitude(),
            location.latitude(),
            adjusted_zenith,
            rising,
        )
    }
}

impl SolarPositionCalculator for SunTimesCalculator {
    fn name(&self) -> &'static str {
        "US Naval Almanac Algorithm"
    }

    fn utc_sunrise(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
    ) -> Option<f64> {
        self.utc_event(date, location, zenith, adjust_for_elevation, true)
    }

    fn utc_sunset(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
    ) -> Option<f64> {
        self.utc_event(date, location, zenith, adjust_for_elevation, false)
    }

    /// Solar noon approximated as the midpoint of sea-level sunrise and sunset
    fn utc_solar_noon(&self, date: &CalendarDate, location: &GeoCoordinate) -> Option<f64> {
        let sunrise = self.utc_sunrise(date, location, super::GEOMETRIC_ZENITH, false)?;
        let mut sunset = self.utc_sunset(date, location, super::GEOMETRIC_ZENITH, false)?;
        // The set can numerically precede the rise when the UTC day boundary
        // falls between them
        if sunset < sunrise {
            sunset += 24.0;
        }
        Some(normalize_hours((sunrise + sunset) / 2.0))
    }
}

//! NOAA / Meeus solar position calculator
//!
//! Implements the solar position series from Meeus, *Astronomical
//! Algorithms*, as used by the NOAA solar calculator spreadsheets. Event
//! times are found with a two-pass refinement: the first pass estimates
//! solar noon and the hour angle from the start of the UTC day, the second
//! recomputes both using the fractional-day offset the first pass produced.
//!
//! The hour-angle arc cosine can be asked for an impossible crossing (polar
//! day or night, or an unreachable twilight dip); that domain violation is
//! caught here and surfaced as `None`, so no NaN ever reaches the
//! orchestration layer.

use log::trace;

use crate::geo::GeoCoordinate;
use crate::timelib::CalendarDate;
use crate::units::{cos_deg, normalize_degrees, normalize_hours, sin_deg, tan_deg};

use super::{SolarPositionCalculator, ZenithAdjuster};

/// Julian day of the J2000.0 epoch (2000-01-01 12:00 TT)
const JULIAN_DAY_JAN_1_2000: f64 = 2_451_545.0;

/// Days per Julian century
const JULIAN_DAYS_PER_CENTURY: f64 = 36_525.0;

/// Which side of solar noon an event falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HorizonCrossing {
    Rising,
    Setting,
}

/// Solar-position calculator based on the NOAA / Meeus series
///
/// Stateless apart from the [`ZenithAdjuster`] constants; safe to share and
/// reuse across unlimited queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoaaCalculator {
    adjuster: ZenithAdjuster,
}

impl NoaaCalculator {
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

    fn julian_centuries(julian_day: f64) -> f64 {
        (julian_day - JULIAN_DAY_JAN_1_2000) / JULIAN_DAYS_PER_CENTURY
    }

    fn julian_day_from_centuries(julian_centuries: f64) -> f64 {
        julian_centuries * JULIAN_DAYS_PER_CENTURY + JULIAN_DAY_JAN_1_2000
    }

    /// Geometric mean longitude of the sun, degrees in [0, 360)
    fn geometric_mean_longitude(t: f64) -> f64 {
        normalize_degrees(280.46646 + t * (36000.76983 + 0.0003032 * t))
    }

    /// Geometric mean anomaly of the sun, degrees
    fn geometric_mean_anomaly(t: f64) -> f64 {
        357.52911 + t * (35999.05029 - 0.0001537 * t)
    }

    /// Eccentricity of earth's orbit (unitless)
    fn orbit_eccentricity(t: f64) -> f64 {
        0.016708634 - t * (0.000042037 + 0.0000001267 * t)
    }

    /// Equation of center for the sun, degrees
    fn equation_of_center(t: f64) -> f64 {
        let anomaly = Self::geometric_mean_anomaly(t);
        sin_deg(anomaly) * (1.914602 - t * (0.004817 + 0.000014 * t))
            + sin_deg(2.0 * anomaly) * (0.019993 - 0.000101 * t)
            + sin_deg(3.0 * anomaly) * 0.000289
    }

    /// True longitude of the sun, degrees
    fn true_longitude(t: f64) -> f64 {
        Self::geometric_mean_longitude(t) + Self::equation_of_center(t)
    }

    /// Apparent longitude of the sun (corrected for nutation and aberration), degrees
    fn apparent_longitude(t: f64) -> f64 {
        let omega = 125.04 - 1934.136 * t;
        Self::true_longitude(t) - 0.00569 - 0.00478 * sin_deg(omega)
    }

    /// Mean obliquity of the ecliptic, degrees
    fn mean_obliquity(t: f64) -> f64 {
        let seconds = 21.448 - t * (46.8150 + t * (0.00059 - t * 0.001813));
        23.0 + (26.0 + seconds / 60.0) / 60.0
    }

    /// Obliquity corrected for nutation, degrees
    fn obliquity_correction(t: f64) -> f64 {
        let omega = 125.04 - 1934.136 * t;
        Self::mean_obliquity(t) + 0.00256 * cos_deg(omega)
    }

    /// Declination of the sun, degrees
    fn solar_declination(t: f64) -> f64 {
        let sin_declination =
            sin_deg(Self::obliquity_correction(t)) * sin_deg(Self::apparent_longitude(t));
        sin_declination.asin().to_degrees()
    }

    /// Equation of time: apparent minus mean solar time, in minutes
    fn equation_of_time(t: f64) -> f64 {
        let epsilon = Self::obliquity_correction(t).to_radians();
        let mean_longitude = Self::geometric_mean_longitude(t).to_radians();
        let eccentricity = Self::orbit_eccentricity(t);
        let mean_anomaly = Self::geometric_mean_anomaly(t).to_radians();

        let y = (epsilon / 2.0).tan().powi(2);
        let radians = y * (2.0 * mean_longitude).sin() - 2.0 * eccentricity * mean_anomaly.sin()
            + 4.0 * eccentricity * y * mean_anomaly.sin() * (2.0 * mean_longitude).cos()
            - 0.5 * y * y * (4.0 * mean_longitude).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * mean_anomaly).sin();
        radians.to_degrees() * 4.0
    }

    /// Hour angle of the crossing, in radians, positive for sunrise
    ///
    /// `None` when the arc-cosine argument falls outside [-1, 1]: the sun
    /// never reaches the requested zenith on this day at this latitude.
    fn hour_angle_at_sunrise(latitude: f64, declination: f64, zenith: f64) -> Option<f64> {
        let cos_hour_angle = cos_deg(zenith) / (cos_deg(latitude) * cos_deg(declination))
            - tan_deg(latitude) * tan_deg(declination);
        if !(-1.0..=1.0).contains(&cos_hour_angle) {
            return None;
        }
        Some(cos_hour_angle.acos())
    }

    /// Solar noon in minutes from UTC midnight, refined once
    ///
    /// `longitude_west` is positive west of Greenwich, per the NOAA
    /// convention.
    fn solar_noon_utc_minutes(julian_centuries: f64, longitude_west: f64) -> f64 {
        // First approximation using the longitude alone
        let t_noon = Self::julian_centuries(
            Self::julian_day_from_centuries(julian_centuries) + longitude_west / 360.0,
        );
        let equation = Self::equation_of_time(t_noon);
        let first_pass = 720.0 + longitude_west * 4.0 - equation;

        // Refine with the fractional-day estimate from the first pass
        let refined = Self::julian_centuries(
            Self::julian_day_from_centuries(julian_centuries) - 0.5 + first_pass / 1440.0,
        );
        720.0 + longitude_west * 4.0 - Self::equation_of_time(refined)
    }

    /// Event time in minutes from UTC midnight, via two-pass refinement
    fn event_utc_minutes(
        julian_day: f64,
        latitude: f64,
        longitude_west: f64,
        zenith: f64,
        crossing: HorizonCrossing,
    ) -> Option<f64> {
        let t = Self::julian_centuries(julian_day);

        // Pass 1: approximate the event from solar noon
        let noon_minutes = Self::solar_noon_utc_minutes(t, longitude_west);
        let t_noon = Self::julian_centuries(julian_day + noon_minutes / 1440.0);
        let mut equation = Self::equation_of_time(t_noon);
        let mut declination = Self::solar_declination(t_noon);
        let mut hour_angle = Self::hour_angle_at_sunrise(latitude, declination, zenith)?;
        if crossing == HorizonCrossing::Setting {
            hour_angle = -hour_angle;
        }
        let mut event_minutes =
            720.0 + 4.0 * (longitude_west - hour_angle.to_degrees()) - equation;
        trace!("noaa pass 1: {event_minutes:.4} min UTC");

        // Pass 2: recompute at the pass-1 estimate
        let refined = Self::julian_centuries(
            Self::julian_day_from_centuries(t) + event_minutes / 1440.0,
        );
        equation = Self::equation_of_time(refined);
        declination = Self::solar_declination(refined);
        hour_angle = Self::hour_angle_at_sunrise(latitude, declination, zenith)?;
        if crossing == HorizonCrossing::Setting {
            hour_angle = -hour_angle;
        }
        event_minutes = 720.0 + 4.0 * (longitude_west - hour_angle.to_degrees()) - equation;
        trace!("noaa pass 2: {event_minutes:.4} min UTC");

        Some(event_minutes)
    }

    fn utc_event(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
        crossing: HorizonCrossing,
    ) -> Option<f64> {
        let elevation = if adjust_for_elevation {
            location.elevation()
        } else {
            0.0
        };
        let adjusted_zenith = self.adjuster.adjust_zenith(zenith, elevation);
        let minutes = Self::event_utc_minutes(
            date.julian_day(),
            location.latitude(),
            -location.longitude(),
            adjusted_zenith,
            crossing,
        )?;
        Some(normalize_hours(minutes / 60.0))
    }
}

impl SolarPositionCalculator for NoaaCalculator {
    fn name(&self) -> &'static str {
        "US National Oceanic and Atmospheric Administration Algorithm"
    }

    fn utc_sunrise(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
    ) -> Option<f64> {
        self.utc_event(
            date,
            location,
            zenith,
            adjust_for_elevation,
            HorizonCrossing::Rising,
        )
    }

    fn utc_sunset(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
    ) -> Option<f64> {
        self.utc_event(
            date,
            location,
            zenith,
            adjust_for_elevation,
            HorizonCrossing::Setting,
        )
    }

    fn utc_solar_noon(&self, date: &CalendarDate, location: &GeoCoordinate) -> Option<f64> {
        let t = Self::julian_centuries(date.julian_day());
        let minutes = Self::solar_noon_utc_minutes(t, -location.longitude());
        Some(normalize_hours(minutes / 60.0))
    }
}

//! Solar-position calculator strategies
//!
//! Two independent numerical algorithms implement the shared
//! [`SolarPositionCalculator`] contract: [`NoaaCalculator`] (Meeus solar
//! position series, as used by the NOAA solar calculator) and
//! [`SunTimesCalculator`] (the US Naval Observatory almanac approximation).
//! They are intentionally different approximations and are not expected to
//! agree to the second; pick one and stay with it.
//!
//! Both share the [`ZenithAdjuster`] by composition: a small helper that
//! applies the refraction, solar-radius, and elevation corrections to the
//! geometric 90° zenith, and leaves every other zenith angle alone.

use crate::geo::GeoCoordinate;
use crate::timelib::CalendarDate;
use crate::units::Angle;

pub mod noaa;
pub mod usno;

pub use noaa::NoaaCalculator;
pub use usno::SunTimesCalculator;

/// The geometric zenith of the idealized horizon, 90° from overhead
pub const GEOMETRIC_ZENITH: f64 = 90.0;

/// Civil twilight zenith: sun 6° below the idealized horizon
pub const CIVIL_ZENITH: f64 = 96.0;

/// Nautical twilight zenith: sun 12° below the idealized horizon
pub const NAUTICAL_ZENITH: f64 = 102.0;

/// Astronomical twilight zenith: sun 18° below the idealized horizon
pub const ASTRONOMICAL_ZENITH: f64 = 108.0;

/// A strategy for computing the UTC time the sun crosses a given zenith
///
/// Implementations are stateless apart from their tunable physical constants
/// and may be shared freely across threads and queries. Fractional hours are
/// in [0, 24) on the given date's UTC day; `None` means the sun never crosses
/// the requested zenith that day at that location (polar day or night).
pub trait SolarPositionCalculator: Send + Sync {
    /// A short human-readable name for the algorithm
    fn name(&self) -> &'static str;

    /// UTC sunrise, as a fractional hour, for the given zenith angle
    ///
    /// When `adjust_for_elevation` is set and the zenith is the geometric
    /// 90° horizon, the zenith is corrected for refraction, the solar
    /// radius, and the observer's elevation. Twilight zeniths are never
    /// elevation-adjusted.
    fn utc_sunrise(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
    ) -> Option<f64>;

    /// UTC sunset, as a fractional hour, for the given zenith angle
    fn utc_sunset(
        &self,
        date: &CalendarDate,
        location: &GeoCoordinate,
        zenith: f64,
        adjust_for_elevation: bool,
    ) -> Option<f64>;

    /// UTC solar noon as a fractional hour
    ///
    /// The moment the sun crosses the location's meridian. Independent of
    /// zenith and elevation.
    fn utc_solar_noon(&self, date: &CalendarDate, location: &GeoCoordinate) -> Option<f64>;
}

/// Shared refraction / solar-radius / elevation zenith correction
///
/// The three constants are tunable but rarely need to be: 34′ of atmospheric
/// refraction at the horizon, 16′ for the solar radius (events are measured
/// against the upper limb, not the center of the sun), and 6356.9 km for the
/// earth radius used in the elevation dip.
///
/// Only the geometric 90° zenith is ever adjusted. Twilight zenith angles
/// (96°, 102°, 108°, or any caller-supplied dip) encode an absolute
/// light-level threshold that does not change with the observer's elevation,
/// so they pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZenithAdjuster {
    refraction: Angle,
    solar_radius: Angle,
    earth_radius_km: f64,
}

impl Default for ZenithAdjuster {
    fn default() -> Self {
        Self {
            refraction: Angle::from_arc_minutes(34.0),
            solar_radius: Angle::from_arc_minutes(16.0),
            earth_radius_km: 6356.9,
        }
    }
}

impl ZenithAdjuster {
    /// Create an adjuster with explicit physical constants
    pub fn new(refraction: Angle, solar_radius: Angle, earth_radius_km: f64) -> Self {
        Self {
            refraction,
            solar_radius,
            earth_radius_km,
        }
    }

    /// The refraction constant
    pub fn refraction(&self) -> Angle {
        self.refraction
    }

    /// The solar radius constant
    pub fn solar_radius(&self) -> Angle {
        self.solar_radius
    }

    /// The earth radius constant in kilometers
    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    /// Apply the horizon corrections to a zenith angle
    ///
    /// Returns the zenith unchanged unless it is exactly the geometric 90°
    /// zenith, in which case solar radius, refraction, and the elevation
    /// term are added.
    pub fn adjust_zenith(&self, zenith: f64, elevation_m: f64) -> f64 {
        if zenith != GEOMETRIC_ZENITH {
            return zenith;
        }
        zenith
            + self.solar_radius.to_degrees()
            + self.refraction.to_degrees()
            + self.elevation_adjustment(elevation_m)
    }

    /// The horizon dip in degrees visible from a given elevation
    ///
    /// `acos(r / (r + elevation))` on a spherical earth: an observer above
    /// sea level sees slightly past the geometric horizon.
    pub fn elevation_adjustment(&self, elevation_m: f64) -> f64 {
        let radius_m = self.earth_radius_km * 1000.0;
        (radius_m / (radius_m + elevation_m)).acos().to_degrees()
    }
}

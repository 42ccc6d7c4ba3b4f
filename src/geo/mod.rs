//! Geodetic location model and ellipsoidal geodesy
//!
//! This module provides the validated `GeoCoordinate` location value used by
//! every solar query, the timezone-offset math that decides whether a
//! location's civil date agrees with its longitude (the antimeridian
//! adjustment), and geodesic calculations on the WGS-84 reference ellipsoid:
//! Vincenty's inverse formulas for distance and bearings, plus a closed-form
//! rhumb-line distance.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::units::MINUTES_PER_DEGREE;
use crate::{Result, SunfieldError};

// WGS-84 reference ellipsoid
const WGS84_MAJOR_AXIS: f64 = 6_378_137.0;
const WGS84_MINOR_AXIS: f64 = 6_356_752.3142;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

// Vincenty iteration parameters
const VINCENTY_CONVERGENCE: f64 = 1e-12;
const VINCENTY_MAX_ITERATIONS: u32 = 20;

/// Result of an inverse geodesic solution between two coordinates
///
/// Distance is in meters along the ellipsoidal geodesic; bearings are in
/// degrees clockwise from true north, normalized into [0, 360).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicCurve {
    /// Geodesic distance in meters
    pub distance: f64,
    /// Bearing at the start point, degrees from north
    pub initial_bearing: f64,
    /// Bearing at the end point, degrees from north
    pub final_bearing: f64,
}

/// A validated, immutable geographic location
///
/// Latitude must be in [-90, 90], longitude in [-180, 180], and elevation a
/// finite non-negative number of meters. Construction fails fast on any
/// violation. The bound timezone is used to convert computed UTC events into
/// local instants and to decide the antimeridian day adjustment.
///
/// # Examples
///
/// ```rust
/// use sunfield::GeoCoordinate;
///
/// let lakewood = GeoCoordinate::new(
///     "Lakewood, NJ",
///     40.0721087,
///     -74.2400243,
///     15.0,
///     chrono_tz::America::New_York,
/// )
/// .unwrap();
/// assert_eq!(lakewood.latitude(), 40.0721087);
///
/// // Out-of-range values are rejected at construction
/// assert!(GeoCoordinate::new("bad", 91.0, 0.0, 0.0, chrono_tz::UTC).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoCoordinateRepr")]
pub struct GeoCoordinate {
    name: String,
    latitude: f64,
    longitude: f64,
    elevation: f64,
    timezone: Tz,
}

/// Raw deserialization shape, validated through `GeoCoordinate::new`
#[derive(Deserialize)]
struct GeoCoordinateRepr {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: f64,
    timezone: Tz,
}

impl TryFrom<GeoCoordinateRepr> for GeoCoordinate {
    type Error = SunfieldError;

    fn try_from(repr: GeoCoordinateRepr) -> Result<Self> {
        GeoCoordinate::new(
            repr.name,
            repr.latitude,
            repr.longitude,
            repr.elevation,
            repr.timezone,
        )
    }
}

impl GeoCoordinate {
    /// Create a validated location
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        elevation: f64,
        timezone: Tz,
    ) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SunfieldError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SunfieldError::InvalidLongitude(longitude));
        }
        if !elevation.is_finite() || elevation < 0.0 {
            return Err(SunfieldError::InvalidElevation(elevation));
        }
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
            elevation,
            timezone,
        })
    }

    /// Convert degrees-minutes-seconds plus hemisphere into a signed latitude
    ///
    /// Components must be non-negative; the hemisphere letter must be `'N'`
    /// or `'S'`.
    pub fn latitude_from_dms(degrees: f64, minutes: f64, seconds: f64, hemisphere: char) -> Result<f64> {
        let value = dms_to_decimal(degrees, minutes, seconds)?;
        if value > 90.0 {
            return Err(SunfieldError::InvalidLatitude(value));
        }
        match hemisphere {
            'N' => Ok(value),
            'S' => Ok(-value),
            letter => Err(SunfieldError::InvalidHemisphere {
                letter,
                expected: "N, S",
            }),
        }
    }

    /// Convert degrees-minutes-seconds plus hemisphere into a signed longitude
    ///
    /// Components must be non-negative; the hemisphere letter must be `'E'`
    /// or `'W'`.
    pub fn longitude_from_dms(degrees: f64, minutes: f64, seconds: f64, hemisphere: char) -> Result<f64> {
        let value = dms_to_decimal(degrees, minutes, seconds)?;
        if value > 180.0 {
            return Err(SunfieldError::InvalidLongitude(value));
        }
        match hemisphere {
            'E' => Ok(value),
            'W' => Ok(-value),
            letter => Err(SunfieldError::InvalidHemisphere {
                letter,
                expected: "E, W",
            }),
        }
    }

    /// The display name of this location
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latitude in degrees, positive north
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, positive east
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Elevation above sea level in meters
    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// The bound timezone
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The zone's standard (non-DST) UTC offset as of the given instant
    ///
    /// Any daylight saving in effect at `as_of` is excluded. The instant is
    /// an explicit parameter so that calculations for historical or future
    /// dates resolve the offset for *that* date rather than for the wall
    /// clock; zones occasionally change their standard offset (Samoa did in
    /// 2011).
    pub fn standard_time_offset(&self, as_of: DateTime<Utc>) -> Duration {
        self.timezone
            .offset_from_utc_datetime(&as_of.naive_utc())
            .base_utc_offset()
    }

    /// The zone's standard UTC offset as of the system clock
    ///
    /// Convenience wrapper over [`standard_time_offset`](Self::standard_time_offset).
    /// Because it reads the live clock, it can misclassify the offset for
    /// zones that have changed their standard time historically; prefer the
    /// explicit as-of form when calculating for a specific date.
    pub fn standard_time_offset_now(&self) -> Duration {
        self.standard_time_offset(Utc::now())
    }

    /// The difference between local mean (solar) time and zone standard time
    ///
    /// Local mean time runs 4 minutes per degree of longitude ahead of the
    /// Prime Meridian; the offset is that value minus the zone's standard
    /// offset. It is zero only on the zone's natural central meridian.
    pub fn local_mean_time_offset(&self, as_of: DateTime<Utc>) -> Duration {
        let mean_millis = (self.longitude * MINUTES_PER_DEGREE * 60_000.0).round() as i64;
        Duration::milliseconds(mean_millis) - self.standard_time_offset(as_of)
    }

    /// Day adjustment for zones whose civil date disagrees with their longitude
    ///
    /// In the absolute-time model the date increases strictly eastward from
    /// the Prime Meridian. Zones like Samoa sit on the far side of the date
    /// line relative to their longitude, so their civil date is a day off
    /// from the date the longitude implies. Returns −1 when the local mean
    /// time offset is ≤ −20 hours, +1 when it is ≥ +20 hours, and 0
    /// otherwise.
    pub fn antimeridian_adjustment(&self, as_of: DateTime<Utc>) -> i8 {
        let offset_hours =
            self.local_mean_time_offset(as_of).num_milliseconds() as f64 / 3_600_000.0;
        if offset_hours >= 20.0 {
            1
        } else if offset_hours <= -20.0 {
            -1
        } else {
            0
        }
    }

    /// Solve the inverse geodesic problem to another coordinate
    ///
    /// Runs Vincenty's iterative formulas on the WGS-84 ellipsoid, iterating
    /// the reduced longitude difference λ until |Δλ| < 1e-12 or 20 iterations
    /// elapse. Returns `None` if the iteration fails to converge (nearly
    /// antipodal points); coincident points yield a zero-distance curve.
    pub fn geodesic(&self, other: &GeoCoordinate) -> Option<GeodesicCurve> {
        let a = WGS84_MAJOR_AXIS;
        let b = WGS84_MINOR_AXIS;
        let f = WGS84_FLATTENING;

        let big_l = (other.longitude - self.longitude).to_radians();
        let u1 = ((1.0 - f) * self.latitude.to_radians().tan()).atan();
        let u2 = ((1.0 - f) * other.latitude.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = big_l;
        let mut sin_lambda;
        let mut cos_lambda;
        let mut sin_sigma;
        let mut cos_sigma;
        let mut sigma;
        let mut cos_sq_alpha;
        let mut cos_2sigma_m;

        let mut iteration = 0;
        loop {
            sin_lambda = lambda.sin();
            cos_lambda = lambda.cos();
            sin_sigma = ((cos_u2 * sin_lambda).powi(2)
                + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
            if sin_sigma == 0.0 {
                // Coincident points
                return Some(GeodesicCurve {
                    distance: 0.0,
                    initial_bearing: 0.0,
                    final_bearing: 0.0,
                });
            }
            cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            cos_2sigma_m = cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha;
            if cos_2sigma_m.is_nan() {
                // Both points on the equator
                cos_2sigma_m = 0.0;
            }
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let previous = lambda;
            lambda = big_l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

            iteration += 1;
            if (lambda - previous).abs() < VINCENTY_CONVERGENCE {
                debug!(
                    "vincenty converged after {} iterations ({} -> {})",
                    iteration, self.name, other.name
                );
                break;
            }
            if iteration >= VINCENTY_MAX_ITERATIONS {
                warn!(
                    "vincenty failed to converge within {} iterations ({} -> {})",
                    VINCENTY_MAX_ITERATIONS, self.name, other.name
                );
                return None;
            }
        }

        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let big_a =
            1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

        let distance = b * big_a * (sigma - delta_sigma);
        let initial_bearing = (cos_u2 * sin_lambda)
            .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda)
            .to_degrees();
        let final_bearing = (cos_u1 * sin_lambda)
            .atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda)
            .to_degrees();

        Some(GeodesicCurve {
            distance,
            initial_bearing: crate::units::normalize_degrees(initial_bearing),
            final_bearing: crate::units::normalize_degrees(final_bearing),
        })
    }

    /// Geodesic distance in meters, if the solution converges
    pub fn geodesic_distance(&self, other: &GeoCoordinate) -> Option<f64> {
        self.geodesic(other).map(|curve| curve.distance)
    }

    /// Initial geodesic bearing in degrees from north, if the solution converges
    pub fn geodesic_initial_bearing(&self, other: &GeoCoordinate) -> Option<f64> {
        self.geodesic(other).map(|curve| curve.initial_bearing)
    }

    /// Final geodesic bearing in degrees from north, if the solution converges
    pub fn geodesic_final_bearing(&self, other: &GeoCoordinate) -> Option<f64> {
        self.geodesic(other).map(|curve| curve.final_bearing)
    }

    /// Rhumb-line (constant-bearing) distance to another coordinate, in meters
    ///
    /// Closed-form spherical formula; a rhumb line is longer than the
    /// geodesic everywhere except along meridians and the equator.
    pub fn rhumb_line_distance(&self, other: &GeoCoordinate) -> f64 {
        let earth_radius = WGS84_MAJOR_AXIS;
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let mut d_lon = (other.longitude.to_radians() - self.longitude.to_radians()).abs();

        let d_phi = ((lat2 / 2.0 + std::f64::consts::FRAC_PI_4).tan()
            / (lat1 / 2.0 + std::f64::consts::FRAC_PI_4).tan())
        .ln();
        let q = if d_phi.abs() > f64::EPSILON {
            d_lat / d_phi
        } else {
            // East-west course: the meridional stretch is degenerate
            lat1.cos()
        };
        if d_lon > std::f64::consts::PI {
            d_lon = 2.0 * std::f64::consts::PI - d_lon;
        }
        (d_lat * d_lat + q * q * d_lon * d_lon).sqrt() * earth_radius
    }
}

fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> Result<f64> {
    if degrees < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return Err(SunfieldError::InvalidDms {
            degrees,
            minutes,
            seconds,
        });
    }
    Ok(degrees + minutes / 60.0 + seconds / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lakewood() -> GeoCoordinate {
        GeoCoordinate::new(
            "Lakewood, NJ",
            40.0721087,
            -74.2400243,
            15.0,
            chrono_tz::America::New_York,
        )
        .unwrap()
    }

    fn october_2017() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 10, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert!(GeoCoordinate::new("a", 90.5, 0.0, 0.0, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("b", -90.5, 0.0, 0.0, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("c", 0.0, 180.5, 0.0, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("d", 0.0, -180.5, 0.0, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("e", 0.0, 0.0, -1.0, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("f", 0.0, 0.0, f64::NAN, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("g", 0.0, 0.0, f64::INFINITY, chrono_tz::UTC).is_err());
        assert!(GeoCoordinate::new("h", f64::NAN, 0.0, 0.0, chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(GeoCoordinate::new("np", 90.0, 180.0, 0.0, chrono_tz::UTC).is_ok());
        assert!(GeoCoordinate::new("sp", -90.0, -180.0, 0.0, chrono_tz::UTC).is_ok());
    }

    #[test]
    fn test_dms_conversion() {
        // 40° 4' 19.59" N is Lakewood to within a few meters
        let lat = GeoCoordinate::latitude_from_dms(40.0, 4.0, 19.59, 'N').unwrap();
        assert!((lat - 40.0721083).abs() < 1e-6);

        let lat_s = GeoCoordinate::latitude_from_dms(40.0, 4.0, 19.59, 'S').unwrap();
        assert_eq!(lat_s, -lat);

        let lon = GeoCoordinate::longitude_from_dms(74.0, 14.0, 24.09, 'W').unwrap();
        assert!((lon + 74.2400250).abs() < 1e-6);
    }

    #[test]
    fn test_dms_rejects_bad_components() {
        assert!(GeoCoordinate::latitude_from_dms(-1.0, 0.0, 0.0, 'N').is_err());
        assert!(GeoCoordinate::latitude_from_dms(0.0, -5.0, 0.0, 'N').is_err());
        assert!(GeoCoordinate::latitude_from_dms(0.0, 0.0, -0.1, 'S').is_err());
        assert!(GeoCoordinate::latitude_from_dms(91.0, 0.0, 0.0, 'N').is_err());
        assert!(GeoCoordinate::latitude_from_dms(10.0, 0.0, 0.0, 'E').is_err());
        assert!(GeoCoordinate::longitude_from_dms(10.0, 0.0, 0.0, 'n').is_err());
        assert!(GeoCoordinate::longitude_from_dms(181.0, 0.0, 0.0, 'W').is_err());
    }

    #[test]
    fn test_standard_time_offset_ignores_dst() {
        let loc = lakewood();
        // New York is UTC-5 standard; mid-October is still in DST but the
        // standard offset must not include the saving.
        let offset = loc.standard_time_offset(october_2017());
        assert_eq!(offset, Duration::hours(-5));

        let winter = Utc.with_ymd_and_hms(2017, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(loc.standard_time_offset(winter), Duration::hours(-5));
    }

    #[test]
    fn test_local_mean_time_offset() {
        let loc = lakewood();
        // -74.24° × 4 min = -296.96 min; minus the -300 min standard offset
        // leaves about +3 minutes.
        let offset = loc.local_mean_time_offset(october_2017());
        let minutes = offset.num_milliseconds() as f64 / 60_000.0;
        assert!((minutes - 3.039903).abs() < 0.001, "got {minutes}");
    }

    #[test]
    fn test_antimeridian_adjustment_ordinary_zone() {
        assert_eq!(lakewood().antimeridian_adjustment(october_2017()), 0);
    }

    #[test]
    fn test_antimeridian_adjustment_samoa() {
        // Re-derived from first principles: Apia sits at 171.8° W, so its
        // local mean time is 11.45 hours behind Greenwich, yet its civil zone
        // runs 13 hours ahead (14 under DST). The local mean time offset is
        // therefore about -24.45 hours, beyond the -20 hour threshold, and
        // the civil date must be pulled back one day to match the longitude.
        let apia = GeoCoordinate::new("Apia, Samoa", -13.85, -171.8, 0.0, chrono_tz::Pacific::Apia)
            .unwrap();
        let offset_hours =
            apia.local_mean_time_offset(october_2017()).num_milliseconds() as f64 / 3_600_000.0;
        assert!(offset_hours < -20.0, "got {offset_hours}");
        assert_eq!(apia.antimeridian_adjustment(october_2017()), -1);
    }

    #[test]
    fn test_antimeridian_adjustment_positive_side() {
        // Mirror case: far-eastern longitude bound to a far-western zone.
        let loc = GeoCoordinate::new("east of the line", 0.0, 179.0, 0.0, chrono_tz::Etc::GMTPlus12)
            .unwrap();
        assert_eq!(loc.antimeridian_adjustment(october_2017()), 1);
    }

    #[test]
    fn test_geodesic_coincident_points() {
        let loc = lakewood();
        let curve = loc.geodesic(&loc).unwrap();
        assert_eq!(curve.distance, 0.0);
        assert_eq!(curve.initial_bearing, 0.0);
        assert_eq!(curve.final_bearing, 0.0);
    }

    #[test]
    fn test_geodesic_classic_fixture() {
        // Vincenty's own test line: Flinders Peak to Buninyong, Victoria.
        let flinders = GeoCoordinate::new(
            "Flinders Peak",
            -37.951033416,
            144.424867888,
            0.0,
            chrono_tz::Australia::Melbourne,
        )
        .unwrap();
        let buninyong = GeoCoordinate::new(
            "Buninyong",
            -37.652821138,
            143.926495527,
            0.0,
            chrono_tz::Australia::Melbourne,
        )
        .unwrap();

        let curve = flinders.geodesic(&buninyong).unwrap();
        assert!((curve.distance - 54_972.271).abs() < 0.05, "distance {}", curve.distance);
        // Initial azimuth 306° 52' 05.37"; the final bearing is the
        // direction-of-travel azimuth at Buninyong, the published
        // back-azimuth 127° 10' 25.07" plus a half turn.
        assert!((curve.initial_bearing - 306.868158).abs() < 0.001);
        assert!((curve.final_bearing - 307.173631).abs() < 0.001);
    }

    #[test]
    fn test_geodesic_distance_symmetry() {
        let a = lakewood();
        let b = GeoCoordinate::new("Jerusalem", 31.778, 35.2354, 0.0, chrono_tz::Asia::Jerusalem)
            .unwrap();
        let ab = a.geodesic_distance(&b).unwrap();
        let ba = b.geodesic_distance(&a).unwrap();
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_reciprocity() {
        let a = lakewood();
        let b = GeoCoordinate::new("London", 51.5074, -0.1278, 0.0, chrono_tz::Europe::London)
            .unwrap();
        let forward = a.geodesic(&b).unwrap();
        let reverse = b.geodesic(&a).unwrap();
        let diff =
            crate::units::normalize_degrees(forward.initial_bearing - reverse.final_bearing);
        let off_by_half_turn = (diff - 180.0).abs();
        assert!(off_by_half_turn < 1e-6, "diff {diff}");
    }

    #[test]
    fn test_rhumb_line_equator_degree() {
        let west = GeoCoordinate::new("w", 0.0, 0.0, 0.0, chrono_tz::UTC).unwrap();
        let east = GeoCoordinate::new("e", 0.0, 1.0, 0.0, chrono_tz::UTC).unwrap();
        let d = west.rhumb_line_distance(&east);
        // One equatorial degree on a 6378137 m sphere
        assert!((d - 111_319.49).abs() < 1.0, "got {d}");
        assert!((d - east.rhumb_line_distance(&west)).abs() < 1e-9);
    }

    #[test]
    fn test_rhumb_line_exceeds_geodesic() {
        let a = lakewood();
        let b = GeoCoordinate::new("London", 51.5074, -0.1278, 0.0, chrono_tz::Europe::London)
            .unwrap();
        let rhumb = a.rhumb_line_distance(&b);
        let geodesic = a.geodesic_distance(&b).unwrap();
        assert!(rhumb > geodesic);
        // Same order of magnitude though
        assert!(rhumb < geodesic * 1.1);
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let json = r#"{
            "name": "Lakewood, NJ",
            "latitude": 40.0721087,
            "longitude": -74.2400243,
            "elevation": 15.0,
            "timezone": "America/New_York"
        }"#;
        let loc: GeoCoordinate = serde_json::from_str(json).unwrap();
        assert_eq!(loc, lakewood());

        let bad = r#"{
            "name": "nope",
            "latitude": 95.0,
            "longitude": 0.0,
            "elevation": 0.0,
            "timezone": "UTC"
        }"#;
        assert!(serde_json::from_str::<GeoCoordinate>(bad).is_err());
    }
}

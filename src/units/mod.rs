//! Angle and unit conversion primitives
//!
//! The `Angle` type stores angular values in their original format (degrees
//! or radians) to maintain maximum precision; conversion between formats only
//! occurs when explicitly requested. The free functions provide the
//! degree-domain trigonometry used throughout the solar-position algorithms,
//! which are traditionally written against degree inputs.

use std::f64::consts::PI;

/// Minutes of clock time per degree of longitude (24h × 60min / 360°)
pub const MINUTES_PER_DEGREE: f64 = 4.0;

/// Degrees of longitude per hour of clock time (360° / 24h)
pub const DEGREES_PER_HOUR: f64 = 15.0;

/// Internal representation format for angle values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleFormat {
    /// Angle stored in degrees
    Degrees(f64),
    /// Angle stored in radians
    Radians(f64),
}

/// Represents an angular measurement with exact precision preservation
///
/// Values are stored in their original format to prevent precision loss:
/// degrees are stored as degrees, radians as radians, and conversion uses
/// `std::f64::consts::PI` only when the other format is requested.
///
/// # Examples
///
/// ```rust
/// use sunfield::units::Angle;
///
/// let refraction = Angle::from_arc_minutes(34.0);
/// assert!((refraction.to_degrees() - 34.0 / 60.0).abs() < 1e-15);
///
/// let right_angle = Angle::from_radians(std::f64::consts::PI / 2.0);
/// assert!((right_angle.to_degrees() - 90.0).abs() < 1e-13);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    angle: AngleFormat,
}

impl Angle {
    /// Creates an angle from a value in degrees
    pub fn from_degrees(degrees: f64) -> Self {
        Angle {
            angle: AngleFormat::Degrees(degrees),
        }
    }

    /// Creates an angle from a value in radians
    pub fn from_radians(radians: f64) -> Self {
        Angle {
            angle: AngleFormat::Radians(radians),
        }
    }

    /// Creates an angle from a value in minutes of arc (1′ = 1/60°)
    ///
    /// Refraction and solar-radius constants are conventionally quoted in
    /// arc minutes (34′, 16′).
    pub fn from_arc_minutes(minutes: f64) -> Self {
        Angle {
            angle: AngleFormat::Degrees(minutes / 60.0),
        }
    }

    /// Returns the angle value in degrees
    ///
    /// Exact when the angle was constructed from degrees.
    pub fn to_degrees(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg,
            AngleFormat::Radians(rad) => rad * (180.0 / PI),
        }
    }

    /// Returns the angle value in radians
    ///
    /// Exact when the angle was constructed from radians.
    pub fn to_radians(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg * (PI / 180.0),
            AngleFormat::Radians(rad) => rad,
        }
    }

    /// Returns the internal format of this angle
    pub fn format(&self) -> AngleFormat {
        self.angle
    }
}

/// Sine of an angle given in degrees
pub fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

/// Cosine of an angle given in degrees
pub fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

/// Tangent of an angle given in degrees
pub fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

/// Arc sine returning degrees
pub fn asin_deg(x: f64) -> f64 {
    x.asin().to_degrees()
}

/// Arc cosine returning degrees
///
/// Returns NaN outside [-1, 1]; the solar calculators check the domain before
/// calling this so NaN never escapes the algorithm boundary.
pub fn acos_deg(x: f64) -> f64 {
    x.acos().to_degrees()
}

/// Arc tangent returning degrees
pub fn atan_deg(x: f64) -> f64 {
    x.atan().to_degrees()
}

/// Normalize an angle in degrees into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees % 360.0;
    if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    }
}

/// Normalize a fractional hour into [0, 24) by repeated ±24 adjustment
pub fn normalize_hours(hours: f64) -> f64 {
    let mut normalized = hours;
    while normalized < 0.0 {
        normalized += 24.0;
    }
    while normalized >= 24.0 {
        normalized -= 24.0;
    }
    normalized
}

//! Telemetry value types.
//!
//! Every type here is an immutable value: the state containers hand out copies
//! and nothing in the workspace holds a reference into another unit.
//!
//! | Type | Meaning |
//! |---|---|
//! | [`Degrees`] / [`Radian`] | Angles |
//! | [`Altitude`] | Metres, signed (AMSL for absolute positions) |
//! | [`Speed`] | Metres per second, signed |
//! | [`Distance`] | Horizontal ground distance in metres |
//! | [`PositionAbsolute`] / [`HomePosition`] | Geodetic position |
//! | [`VelocityNed`] | Velocity in the local north-east-down frame |
//! | [`Euler`] | Attitude as roll / pitch / yaw |
//! | [`HomeDistance`] | Offset of the vehicle from its home position |

use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// An angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Convert to [`Radian`].
    pub fn to_radians(self) -> Radian {
        Radian(self.0.to_radians())
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// An angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Radian(pub f64);

impl Radian {
    /// Build a [`Radian`] from an angle given in degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self(degrees.to_radians())
    }

    /// Convert back to [`Degrees`].
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }
}

impl From<Degrees> for Radian {
    fn from(value: Degrees) -> Self {
        value.to_radians()
    }
}

/// Altitude in metres. Signed: relative altitudes may be negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Altitude(pub f64);

impl Sub for Altitude {
    type Output = Altitude;

    fn sub(self, rhs: Self) -> Self::Output {
        Altitude(self.0 - rhs.0)
    }
}

impl fmt::Display for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m", self.0)
    }
}

/// Speed in metres per second. Signed: NED components carry direction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Speed(pub f64);

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m/s", self.0)
    }
}

/// Horizontal distance over ground in metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Distance(pub f64);

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m", self.0)
    }
}

/// Vehicle attitude. All three angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub roll: Radian,
    pub pitch: Radian,
    pub yaw: Radian,
}

/// Current geodetic position with absolute (AMSL) altitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionAbsolute {
    pub lat: Degrees,
    pub lon: Degrees,
    pub alt: Altitude,
}

/// Velocity in the local north-east-down frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityNed {
    pub north: Speed,
    pub east: Speed,
    pub down: Speed,
}

/// Position the vehicle will return to on return-to-launch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HomePosition {
    pub lat: Degrees,
    pub lon: Degrees,
    pub alt: Altitude,
}

/// Offset of the vehicle from home.
///
/// `vertical` is positive when the vehicle is above its home position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HomeDistance {
    pub horizontal: Distance,
    pub vertical: Altitude,
}

/// Descriptor of the vehicle's live video stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub uri: String,
}

impl VideoStreamInfo {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_to_radian_conversion() {
        let r = Radian::from_degrees(180.0);
        assert!((r.0 - std::f64::consts::PI).abs() < 1e-12);

        let r: Radian = Degrees(90.0).into();
        assert!((r.0 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn radian_back_to_degrees() {
        let d = Radian(std::f64::consts::FRAC_PI_4).to_degrees();
        assert!((d.0 - 45.0).abs() < 1e-9);
    }

    #[test]
    fn altitude_difference_keeps_sign() {
        assert_eq!(Altitude(120.0) - Altitude(100.0), Altitude(20.0));
        assert_eq!(Altitude(90.0) - Altitude(100.0), Altitude(-10.0));
    }

    #[test]
    fn position_serializes_as_plain_numbers() {
        let pos = PositionAbsolute {
            lat: Degrees(47.39),
            lon: Degrees(8.54),
            alt: Altitude(488.0),
        };
        let json = serde_json::to_value(pos).unwrap();
        assert_eq!(json["lat"], 47.39);
        assert_eq!(json["alt"], 488.0);
    }

    #[test]
    fn display_includes_units() {
        assert_eq!(Speed(2.5).to_string(), "2.5 m/s");
        assert_eq!(Distance(10.0).to_string(), "10 m");
    }
}

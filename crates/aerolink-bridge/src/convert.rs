//! Raw backend samples → vehicle model values.

use aerolink_types::{
    Altitude, Degrees, Euler, HomePosition, PositionAbsolute, Radian, Speed, VelocityNed,
    VideoStreamInfo,
};

use crate::backend::{RawEulerAngle, RawPosition, RawVelocityNed, RawVideoStreamInfo};

/// Uses the absolute (AMSL) altitude; the relative one is dropped.
pub fn position(raw: &RawPosition) -> PositionAbsolute {
    PositionAbsolute {
        lat: Degrees(raw.latitude_deg),
        lon: Degrees(raw.longitude_deg),
        alt: Altitude(f64::from(raw.absolute_altitude_m)),
    }
}

pub fn home(raw: &RawPosition) -> HomePosition {
    HomePosition {
        lat: Degrees(raw.latitude_deg),
        lon: Degrees(raw.longitude_deg),
        alt: Altitude(f64::from(raw.absolute_altitude_m)),
    }
}

pub fn velocity(raw: &RawVelocityNed) -> VelocityNed {
    VelocityNed {
        north: Speed(f64::from(raw.north_m_s)),
        east: Speed(f64::from(raw.east_m_s)),
        down: Speed(f64::from(raw.down_m_s)),
    }
}

/// The backend reports degrees; the model stores radians.
pub fn attitude(raw: &RawEulerAngle) -> Euler {
    Euler {
        roll: Radian::from_degrees(f64::from(raw.roll_deg)),
        pitch: Radian::from_degrees(f64::from(raw.pitch_deg)),
        yaw: Radian::from_degrees(f64::from(raw.yaw_deg)),
    }
}

pub fn video_stream_info(raw: &RawVideoStreamInfo) -> VideoStreamInfo {
    VideoStreamInfo::new(raw.uri.clone())
}

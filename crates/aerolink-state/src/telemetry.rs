//! Telemetry container: six independently updated latest-value fields.

use aerolink_types::{Euler, HomeDistance, HomePosition, PositionAbsolute, Speed, VelocityNed};

use crate::field::{Latest, LatestWriter, field};

/// Create a telemetry container with every field absent.
pub fn telemetry() -> (Telemetry, TelemetryWriter) {
    let (position, position_writer) = field();
    let (velocity, velocity_writer) = field();
    let (attitude, attitude_writer) = field();
    let (home_position, home_position_writer) = field();
    let (distance_to_home, distance_to_home_writer) = field();
    let (ground_speed, ground_speed_writer) = field();
    (
        Telemetry {
            position,
            velocity,
            attitude,
            home_position,
            distance_to_home,
            ground_speed,
        },
        TelemetryWriter {
            position: position_writer,
            velocity: velocity_writer,
            attitude: attitude_writer,
            home_position: home_position_writer,
            distance_to_home: distance_to_home_writer,
            ground_speed: ground_speed_writer,
        },
    )
}

/// Read-only telemetry.
#[derive(Debug, Clone)]
pub struct Telemetry {
    position: Latest<PositionAbsolute>,
    velocity: Latest<VelocityNed>,
    attitude: Latest<Euler>,
    home_position: Latest<HomePosition>,
    distance_to_home: Latest<HomeDistance>,
    ground_speed: Latest<Speed>,
}

impl Telemetry {
    pub fn position(&self) -> &Latest<PositionAbsolute> {
        &self.position
    }

    pub fn velocity(&self) -> &Latest<VelocityNed> {
        &self.velocity
    }

    pub fn attitude(&self) -> &Latest<Euler> {
        &self.attitude
    }

    pub fn home_position(&self) -> &Latest<HomePosition> {
        &self.home_position
    }

    /// Derived from position and home position.
    pub fn distance_to_home(&self) -> &Latest<HomeDistance> {
        &self.distance_to_home
    }

    /// Derived from the horizontal velocity components.
    pub fn ground_speed(&self) -> &Latest<Speed> {
        &self.ground_speed
    }
}

/// Mutate-only telemetry, held by the backend adapter.
#[derive(Debug, Clone)]
pub struct TelemetryWriter {
    pub position: LatestWriter<PositionAbsolute>,
    pub velocity: LatestWriter<VelocityNed>,
    pub attitude: LatestWriter<Euler>,
    pub home_position: LatestWriter<HomePosition>,
    pub distance_to_home: LatestWriter<HomeDistance>,
    pub ground_speed: LatestWriter<Speed>,
}

impl TelemetryWriter {
    /// Return every field to absent.
    pub fn reset(&self) {
        self.position.clear();
        self.velocity.clear();
        self.attitude.clear();
        self.home_position.clear();
        self.distance_to_home.clear();
        self.ground_speed.clear();
    }
}

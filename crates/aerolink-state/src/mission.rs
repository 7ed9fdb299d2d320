//! Mission container.
//!
//! Holds the position an active mission believes the vehicle is at. The
//! adapter currently feeds it from the same backend stream as
//! [`Telemetry::position`](crate::telemetry::Telemetry::position), but the two
//! are stored separately.

use aerolink_types::PositionAbsolute;

use crate::field::{Latest, LatestWriter, field};

pub fn mission() -> (Mission, MissionWriter) {
    let (position, position_writer) = field();
    (
        Mission { position },
        MissionWriter {
            position: position_writer,
        },
    )
}

#[derive(Debug, Clone)]
pub struct Mission {
    position: Latest<PositionAbsolute>,
}

impl Mission {
    pub fn position(&self) -> &Latest<PositionAbsolute> {
        &self.position
    }
}

#[derive(Debug, Clone)]
pub struct MissionWriter {
    pub position: LatestWriter<PositionAbsolute>,
}

impl MissionWriter {
    pub fn reset(&self) {
        self.position.clear();
    }
}

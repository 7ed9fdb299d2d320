//! [`Vehicle`] – the aggregate application code holds.
//!
//! One pair is built per connection session by [`vehicle`]:
//!
//! * the [`Vehicle`] with its read-only views ([`Vehicle::action`],
//!   [`Vehicle::telemetry`], …) goes to consumers, and
//! * the [`VehicleWriter`] goes to the backend adapter that drives them.
//!
//! [`VehicleWriter::reset`] is what the adapter calls on disconnect so no
//! stale value or bound command survives the connection.

use crate::action::{Action, ActionWriter, action};
use crate::camera::{Camera, CameraWriter, camera};
use crate::mission::{Mission, MissionWriter, mission};
use crate::telemetry::{Telemetry, TelemetryWriter, telemetry};

/// Build a vehicle with every field absent and every action unbound.
pub fn vehicle() -> (Vehicle, VehicleWriter) {
    let (action, action_writer) = action();
    let (camera, camera_writer) = camera();
    let (telemetry, telemetry_writer) = telemetry();
    let (mission, mission_writer) = mission();
    (
        Vehicle {
            action,
            camera,
            telemetry,
            mission,
        },
        VehicleWriter {
            action: action_writer,
            camera: camera_writer,
            telemetry: telemetry_writer,
            mission: mission_writer,
        },
    )
}

/// Read-only aggregate of the four state containers. Cloning is cheap and
/// all clones observe the same state.
#[derive(Clone)]
pub struct Vehicle {
    action: Action,
    camera: Camera,
    telemetry: Telemetry,
    mission: Mission,
}

impl Vehicle {
    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }
}

/// Mutate-only view over all four containers, held by the backend adapter.
#[derive(Clone)]
pub struct VehicleWriter {
    pub action: ActionWriter,
    pub camera: CameraWriter,
    pub telemetry: TelemetryWriter,
    pub mission: MissionWriter,
}

impl VehicleWriter {
    /// Unbind every action and return every field to absent.
    pub fn reset(&self) {
        self.action.reset();
        self.camera.reset();
        self.telemetry.reset();
        self.mission.reset();
    }
}

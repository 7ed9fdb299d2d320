//! `aerolink-state` – the vehicle model.
//!
//! State containers with a split read-only / mutate-only capability, the
//! [`Vehicle`] aggregate that owns them, and the pure logic used to derive
//! telemetry from raw streams.
//!
//! # Modules
//!
//! - [`field`] – [`Latest`] / [`LatestWriter`]: the latest-value cell every
//!   container field is made of.
//! - [`action`] – [`Action`] / [`ActionWriter`]: bindable, awaitable commands.
//! - [`telemetry`], [`mission`], [`camera`] – the three value containers.
//! - [`vehicle`](mod@vehicle) – [`Vehicle`] / [`VehicleWriter`]: the aggregate and its
//!   `reset()`.
//! - [`derived`] – ground speed, distance-to-home and the
//!   [`CombineLatest`] node.
//! - [`geo`] – great-circle distance.

pub mod action;
pub mod camera;
pub mod derived;
pub mod field;
pub mod geo;
pub mod mission;
pub mod telemetry;
pub mod vehicle;

pub use action::{Action, ActionFn, ActionFuture, ActionWriter};
pub use camera::{Camera, CameraWriter};
pub use derived::{CombineLatest, distance_to_home, ground_speed};
pub use field::{Latest, LatestWriter};
pub use mission::{Mission, MissionWriter};
pub use telemetry::{Telemetry, TelemetryWriter};
pub use vehicle::{Vehicle, VehicleWriter, vehicle};

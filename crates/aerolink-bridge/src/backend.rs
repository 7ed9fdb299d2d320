//! The interface aerolink consumes from an external flight backend.
//!
//! The backend is push-and-callback based, in the shape of MAVSDK-style
//! servers:
//!
//! * [`FlightBackend::connect`] bootstraps the backend and returns a
//!   [`BackendSession`].
//! * Every command is a single-shot call that reports its outcome once
//!   through a [`Completion`] and can be abandoned through the returned
//!   [`Disposable`].
//! * Every telemetry stream is a push subscription that calls its sample
//!   handler until disposed, or calls its error handler once and stops.
//!
//! Callbacks may run on any thread the backend chooses.

use std::fmt;
use std::sync::Arc;

use aerolink_types::ActionKind;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConnectionConfig;

/// Backend-specific failure. Never crosses the vehicle model boundary as
/// is; the adapter wraps it as the cause of an
/// [`ActionError`][aerolink_types::ActionError].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The vehicle or autopilot refused or failed a command.
    #[error("{action} rejected with {result}: {message}")]
    Command {
        action: ActionKind,
        /// Backend result code, e.g. `COMMAND_DENIED`.
        result: String,
        message: String,
    },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("{stream} stream failed: {message}")]
    Stream { stream: StreamKind, message: String },

    /// The session was shut down while the call was outstanding.
    #[error("backend session closed")]
    Closed,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The telemetry and camera streams the adapter subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Position,
    Home,
    VelocityNed,
    AttitudeEuler,
    VideoStreamInfo,
}

impl StreamKind {
    pub const ALL: [StreamKind; 5] = [
        StreamKind::Position,
        StreamKind::Home,
        StreamKind::VelocityNed,
        StreamKind::AttitudeEuler,
        StreamKind::VideoStreamInfo,
    ];
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamKind::Position => "position",
            StreamKind::Home => "home",
            StreamKind::VelocityNed => "velocity_ned",
            StreamKind::AttitudeEuler => "attitude_euler",
            StreamKind::VideoStreamInfo => "video_stream_info",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw samples, as the backend delivers them
// ─────────────────────────────────────────────────────────────────────────────

/// Geodetic position sample. Used for both the vehicle and its home.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub absolute_altitude_m: f32,
    pub relative_altitude_m: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawVelocityNed {
    pub north_m_s: f32,
    pub east_m_s: f32,
    pub down_m_s: f32,
}

/// Attitude sample in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawEulerAngle {
    pub roll_deg: f32,
    pub pitch_deg: f32,
    pub yaw_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawVideoStreamInfo {
    pub uri: String,
    pub horizontal_resolution_pix: u32,
    pub vertical_resolution_pix: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Callback and handle types
// ─────────────────────────────────────────────────────────────────────────────

/// One-shot completion handler of a command.
pub type Completion = Box<dyn FnOnce(BackendResult<()>) + Send>;

/// Sample handler of a stream subscription.
pub type SampleHandler<T> = Box<dyn Fn(T) + Send + Sync>;

/// Error handler of a stream subscription. Called at most once, after which
/// the stream delivers nothing more.
pub type ErrorHandler = Box<dyn FnOnce(BackendError) + Send>;

/// Handle to an outstanding command or a live subscription.
pub trait Disposable: Send + Sync {
    /// Cancel the command or end the subscription. Idempotent. After this
    /// returns the backend must not start new callbacks for it.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend traits
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point of a flight backend.
#[async_trait]
pub trait FlightBackend: Send + Sync + 'static {
    /// Start or attach to the backend and open a control session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Connection`] when the backend cannot be
    /// reached.
    async fn connect(&self, config: &ConnectionConfig) -> BackendResult<Arc<dyn BackendSession>>;
}

/// A connected backend session.
pub trait BackendSession: Send + Sync {
    /// Issue `kind` once. `on_complete` is called exactly once unless the
    /// returned handle is disposed first.
    fn action(&self, kind: ActionKind, on_complete: Completion) -> Box<dyn Disposable>;

    fn position(
        &self,
        on_sample: SampleHandler<RawPosition>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable>;

    fn home(
        &self,
        on_sample: SampleHandler<RawPosition>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable>;

    fn velocity_ned(
        &self,
        on_sample: SampleHandler<RawVelocityNed>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable>;

    fn attitude_euler(
        &self,
        on_sample: SampleHandler<RawEulerAngle>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable>;

    fn video_stream_info(
        &self,
        on_sample: SampleHandler<RawVideoStreamInfo>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable>;

    /// Release the backend process and its control channel.
    fn shutdown(&self);
}

//! `aerolink-bridge` – connects a vehicle model to a flight backend.
//!
//! Translates the backend's callback world (one-shot completions, push
//! subscriptions, backend-specific errors) into the vehicle's state
//! containers and awaitable actions.
//!
//! # Modules
//!
//! - [`backend`] – [`FlightBackend`] / [`BackendSession`]: what the bridge
//!   consumes, plus raw sample types and [`BackendError`].
//! - [`adapter`] – [`BackendAdapter`]: connect, link and tear down one
//!   connection.
//! - [`config`] – [`ConnectionConfig`] loaded from TOML and `AEROLINK_*`
//!   environment variables.
//! - [`convert`] – raw samples to model values.
//! - [`sim`] – [`SimBackend`](sim::SimBackend), an in-process backend for
//!   tests and CI.

pub mod adapter;
pub mod backend;
mod completion;
pub mod config;
pub mod convert;
pub mod sim;
mod subscription;

pub use adapter::{BackendAdapter, BridgeError, ConnectionState, SessionInfo};
pub use backend::{BackendError, BackendSession, Disposable, FlightBackend, StreamKind};
pub use config::{ConfigError, ConnectionConfig};

//! `aerolink-runtime` – hosting pieces for applications embedding aerolink.
//!
//! # Modules
//!
//! - [`logging`] – `tracing` subscriber setup with optional OTLP export.
//! - [`worker`] – [`BackendWorker`], the dedicated thread backend work runs on.
//! - [`session`] – [`VehicleSession`]: one vehicle per connection, with
//!   connect, destroy and reconnect.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use aerolink_bridge::sim::SimBackend;
//! use aerolink_runtime::{BackendWorker, VehicleSession, logging, session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let _guard = logging::init_tracing("ground-station");
//! let config = session::load_config("aerolink.toml".as_ref())?;
//! let worker = BackendWorker::start("aerolink-backend")?;
//!
//! let mut vehicle_session = VehicleSession::new(Arc::new(SimBackend::new()), config, worker.handle());
//! vehicle_session.connect().await?;
//! vehicle_session.vehicle().action().arm().await?;
//! vehicle_session.destroy();
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod session;
pub mod worker;

use aerolink_bridge::{BridgeError, ConfigError};
use thiserror::Error;

pub use session::VehicleSession;
pub use worker::BackendWorker;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to start backend worker: {0}")]
    Worker(#[source] std::io::Error),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

//! [`VehicleSession`] – host-side owner of one vehicle and its connection.
//!
//! Every connection gets its own [`Vehicle`] and its own
//! [`BackendAdapter`]. [`destroy`](VehicleSession::destroy) retires both, and
//! the next [`connect`](VehicleSession::connect) starts from a fresh vehicle,
//! so nothing observed through an old vehicle handle changes afterwards.
//! [`reconnect`](VehicleSession::reconnect) is the two steps in one call.

use std::path::Path;
use std::sync::Arc;

use aerolink_bridge::{
    BackendAdapter, ConnectionConfig, ConnectionState, FlightBackend, SessionInfo,
};
use aerolink_state::{Vehicle, VehicleWriter, vehicle};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::info;

use crate::SessionError;

/// Load a connection config from `path`, falling back to the defaults (plus
/// environment overrides) when the file does not exist.
pub fn load_config(path: &Path) -> Result<ConnectionConfig, SessionError> {
    match ConnectionConfig::load_from(path)? {
        Some(config) => Ok(config),
        None => {
            let mut config = ConnectionConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }
}

pub struct VehicleSession<B: FlightBackend> {
    backend: Arc<B>,
    config: ConnectionConfig,
    worker: Handle,
    vehicle: Vehicle,
    writer: VehicleWriter,
    adapter: Option<BackendAdapter<B>>,
}

impl<B: FlightBackend> VehicleSession<B> {
    pub fn new(backend: Arc<B>, config: ConnectionConfig, worker: Handle) -> Self {
        let (vehicle, writer) = vehicle();
        Self {
            backend,
            config,
            worker,
            vehicle,
            writer,
            adapter: None,
        }
    }

    /// The vehicle of the current connection.
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Lifecycle of the current adapter; `None` before the first connect and
    /// after [`destroy`](Self::destroy).
    pub fn state(&self) -> Option<watch::Receiver<ConnectionState>> {
        self.adapter.as_ref().map(BackendAdapter::state)
    }

    /// Connect the current vehicle. A failed attempt may be retried.
    pub async fn connect(&mut self) -> Result<SessionInfo, SessionError> {
        let adapter = self.adapter.get_or_insert_with(|| {
            BackendAdapter::new(
                Arc::clone(&self.backend),
                self.writer.clone(),
                self.config.clone(),
                self.worker.clone(),
            )
        });
        Ok(adapter.connect().await?)
    }

    /// Tear the current connection down. The retired vehicle is left reset
    /// and [`vehicle`](Self::vehicle) returns a fresh, unbound one.
    pub fn destroy(&mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            adapter.destroy();
            (self.vehicle, self.writer) = vehicle();
        }
    }

    /// Destroy the current connection and connect a brand-new vehicle.
    pub async fn reconnect(&mut self) -> Result<SessionInfo, SessionError> {
        self.destroy();
        let info = self.connect().await?;
        info!(session_id = %info.id, "vehicle session reconnected");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerolink_bridge::backend::RawVelocityNed;
    use aerolink_bridge::sim::SimBackend;
    use aerolink_bridge::{BridgeError, StreamKind};
    use aerolink_types::{ActionKind, Speed};

    fn session(backend: &SimBackend) -> VehicleSession<SimBackend> {
        VehicleSession::new(
            Arc::new(backend.clone()),
            ConnectionConfig::default(),
            Handle::current(),
        )
    }

    #[tokio::test]
    async fn connect_drives_the_current_vehicle() -> Result<(), Box<dyn std::error::Error>> {
        let backend = SimBackend::new();
        let mut session = session(&backend);
        assert!(session.state().is_none());

        session.connect().await?;
        assert_eq!(
            session.state().map(|s| *s.borrow()),
            Some(ConnectionState::Connected)
        );
        session.vehicle().action().arm().await?;
        assert_eq!(backend.calls(ActionKind::Arm), 1);
        Ok(())
    }

    #[tokio::test]
    async fn reconnect_builds_a_fresh_vehicle() {
        let backend = SimBackend::new();
        let mut session = session(&backend);
        let first = session.connect().await.unwrap();
        let old_vehicle = session.vehicle().clone();
        backend.push_velocity(RawVelocityNed {
            north_m_s: 3.0,
            east_m_s: 4.0,
            down_m_s: 0.0,
        });
        assert_eq!(old_vehicle.telemetry().ground_speed().get(), Some(Speed(5.0)));

        let second = session.reconnect().await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(backend.connect_count(), 2);
        assert_eq!(backend.shutdown_count(), 1);
        assert_eq!(backend.live_subscriptions(StreamKind::VelocityNed), 1);

        backend.push_velocity(RawVelocityNed {
            north_m_s: 0.0,
            east_m_s: 2.0,
            down_m_s: 0.0,
        });
        assert!(old_vehicle.telemetry().ground_speed().get().is_none());
        assert!(!old_vehicle.action().is_bound(ActionKind::Arm));
        assert_eq!(
            session.vehicle().telemetry().ground_speed().get(),
            Some(Speed(2.0))
        );
    }

    #[tokio::test]
    async fn failed_connect_can_be_retried() {
        let backend = SimBackend::new();
        backend.fail_next_connect("no heartbeat");
        let mut session = session(&backend);

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, SessionError::Bridge(BridgeError::Connect(_))));
        session.connect().await.unwrap();
        assert_eq!(backend.connect_count(), 1);
    }

    #[tokio::test]
    async fn destroy_then_connect_starts_over() {
        let backend = SimBackend::new();
        let mut session = session(&backend);
        session.connect().await.unwrap();
        let old_vehicle = session.vehicle().clone();
        session.destroy();
        assert!(session.state().is_none());
        assert!(!old_vehicle.action().is_bound(ActionKind::Land));
        assert!(!session.vehicle().action().is_bound(ActionKind::Land));

        session.connect().await.unwrap();
        assert!(session.vehicle().action().is_bound(ActionKind::Land));
        assert!(!old_vehicle.action().is_bound(ActionKind::Land));
        assert_eq!(backend.connect_count(), 2);

        backend.push_velocity(RawVelocityNed {
            north_m_s: 6.0,
            east_m_s: 8.0,
            down_m_s: 0.0,
        });
        assert!(old_vehicle.telemetry().ground_speed().get().is_none());
        assert_eq!(
            session.vehicle().telemetry().ground_speed().get(),
            Some(Speed(10.0))
        );
    }

    #[test]
    fn load_config_reads_file_or_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("aerolink.toml");

        let mut defaults = ConnectionConfig::default();
        defaults.apply_env_overrides();
        assert_eq!(load_config(&path).unwrap(), defaults);

        std::fs::write(&path, "system_address = \"udp://:14550\"\n").unwrap();
        let mut expected = ConnectionConfig {
            system_address: "udp://:14550".to_string(),
            ..ConnectionConfig::default()
        };
        expected.apply_env_overrides();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, expected);
        if std::env::var_os("AEROLINK_SYSTEM_ADDRESS").is_none() {
            assert_eq!(loaded.system_address, "udp://:14550");
        }
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("aerolink.toml");
        std::fs::write(&path, "server_port = [").unwrap();
        assert!(matches!(load_config(&path), Err(SessionError::Config(_))));
    }
}

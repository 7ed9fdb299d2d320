//! [`BackendAdapter`] – binds one flight backend connection to a vehicle.
//!
//! On [`connect`](BackendAdapter::connect) the adapter bootstraps the backend
//! on the injected worker runtime, then
//!
//! | Step | Effect on the vehicle |
//! |---|---|
//! | bind actions | every [`ActionKind`] runs its backend command |
//! | position stream | `telemetry.position`, `mission.position`, distance-to-home |
//! | home stream | `telemetry.home_position`, distance-to-home |
//! | velocity stream | `telemetry.velocity`, `telemetry.ground_speed` |
//! | attitude stream | `telemetry.attitude` |
//! | video stream | `camera.video_stream_info` |
//!
//! A stream that fails is logged and left alone; its field keeps the last
//! delivered value.
//!
//! [`destroy`](BackendAdapter::destroy) closes the delivery gate, disposes
//! every subscription, resets the vehicle and shuts the backend session down,
//! in that order. After it returns no backend callback touches the vehicle,
//! and the adapter refuses to connect again.

use std::fmt;
use std::sync::Arc;

use aerolink_state::{ActionWriter, CombineLatest, VehicleWriter, distance_to_home, ground_speed};
use aerolink_types::{ActionKind, HomePosition, PositionAbsolute};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{BackendError, BackendSession, ErrorHandler, FlightBackend, StreamKind};
use crate::completion::run_action;
use crate::config::ConnectionConfig;
use crate::convert;
use crate::subscription::{DeliveryGate, SubscriptionSet};

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("adapter is already connected")]
    AlreadyConnected,

    #[error("adapter was destroyed")]
    SessionEnded,

    #[error("backend connect failed: {0}")]
    Connect(#[from] BackendError),

    #[error("backend worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        })
    }
}

/// Identity of one successful connection.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: Uuid,
    pub connected_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Live connection
// ─────────────────────────────────────────────────────────────────────────────

struct Connection {
    info: SessionInfo,
    session: Arc<dyn BackendSession>,
    subscriptions: SubscriptionSet,
    gate: DeliveryGate,
    closed: CancellationToken,
}

impl Connection {
    fn open(
        session: Arc<dyn BackendSession>,
        vehicle: &VehicleWriter,
        config: &ConnectionConfig,
    ) -> Self {
        let connection = Self {
            info: SessionInfo {
                id: Uuid::new_v4(),
                connected_at: Utc::now(),
            },
            session,
            subscriptions: SubscriptionSet::new(),
            gate: DeliveryGate::new(),
            closed: CancellationToken::new(),
        };
        connection.bind_actions(&vehicle.action, config);
        connection.link_streams(vehicle);
        connection
    }

    fn bind_actions(&self, actions: &ActionWriter, config: &ConnectionConfig) {
        let timeout = config.action_timeout();
        for kind in ActionKind::ALL {
            let session = Arc::clone(&self.session);
            let closed = self.closed.clone();
            actions.bind(kind, move || {
                run_action(Arc::clone(&session), kind, closed.clone(), timeout)
            });
        }
    }

    fn link_streams(&self, vehicle: &VehicleWriter) {
        let home_distance = Arc::new(CombineLatest::<PositionAbsolute, HomePosition>::new());

        let gate = self.gate.clone();
        let telemetry = vehicle.telemetry.clone();
        let mission = vehicle.mission.clone();
        let combine = Arc::clone(&home_distance);
        self.subscriptions.track(self.session.position(
            Box::new(move |raw| {
                let position = convert::position(&raw);
                gate.deliver(|| {
                    telemetry.position.set(position);
                    mission.position.set(position);
                    combine.push_left(position, |p, h| {
                        telemetry.distance_to_home.set(distance_to_home(p, h));
                    });
                });
            }),
            stream_failed(StreamKind::Position),
        ));

        let gate = self.gate.clone();
        let telemetry = vehicle.telemetry.clone();
        let combine = home_distance;
        self.subscriptions.track(self.session.home(
            Box::new(move |raw| {
                let home = convert::home(&raw);
                gate.deliver(|| {
                    telemetry.home_position.set(home);
                    combine.push_right(home, |p, h| {
                        telemetry.distance_to_home.set(distance_to_home(p, h));
                    });
                });
            }),
            stream_failed(StreamKind::Home),
        ));

        let gate = self.gate.clone();
        let telemetry = vehicle.telemetry.clone();
        self.subscriptions.track(self.session.velocity_ned(
            Box::new(move |raw| {
                let velocity = convert::velocity(&raw);
                gate.deliver(|| {
                    telemetry.velocity.set(velocity);
                    telemetry.ground_speed.set(ground_speed(&velocity));
                });
            }),
            stream_failed(StreamKind::VelocityNed),
        ));

        let gate = self.gate.clone();
        let telemetry = vehicle.telemetry.clone();
        self.subscriptions.track(self.session.attitude_euler(
            Box::new(move |raw| {
                let attitude = convert::attitude(&raw);
                gate.deliver(|| telemetry.attitude.set(attitude));
            }),
            stream_failed(StreamKind::AttitudeEuler),
        ));

        let gate = self.gate.clone();
        let camera = vehicle.camera.clone();
        self.subscriptions.track(self.session.video_stream_info(
            Box::new(move |raw| {
                let info = convert::video_stream_info(&raw);
                gate.deliver(|| camera.video_stream_info.set(info));
            }),
            stream_failed(StreamKind::VideoStreamInfo),
        ));
    }

    fn close(self, vehicle: &VehicleWriter) {
        self.closed.cancel();
        self.gate.close();
        let disposed = self.subscriptions.dispose_all();
        vehicle.reset();
        self.session.shutdown();
        info!(session_id = %self.info.id, disposed, "flight backend session closed");
    }
}

fn stream_failed(stream: StreamKind) -> ErrorHandler {
    Box::new(move |error| {
        warn!(%stream, %error, "telemetry stream stopped; keeping last value");
    })
}

/// Returns the adapter to `Disconnected` if a connect attempt does not finish.
struct ConnectAttempt<'a> {
    state: &'a watch::Sender<ConnectionState>,
    settled: bool,
}

impl Drop for ConnectAttempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.send_replace(ConnectionState::Disconnected);
        }
    }
}

/// A bootstrapped session nobody has taken yet. Shut down on drop unless
/// claimed, so an abandoned connect does not leak the backend.
struct UnclaimedSession {
    session: Arc<dyn BackendSession>,
    claimed: bool,
}

impl UnclaimedSession {
    fn claim(mut self) -> Arc<dyn BackendSession> {
        self.claimed = true;
        Arc::clone(&self.session)
    }
}

impl Drop for UnclaimedSession {
    fn drop(&mut self) {
        if !self.claimed {
            debug!("connect abandoned; shutting down bootstrapped backend session");
            self.session.shutdown();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Bridges a [`FlightBackend`] into a vehicle's state containers.
///
/// One adapter serves at most one connection. Build a new adapter, with a
/// fresh vehicle, to connect again.
pub struct BackendAdapter<B: FlightBackend> {
    backend: Arc<B>,
    vehicle: VehicleWriter,
    config: ConnectionConfig,
    worker: Handle,
    state: watch::Sender<ConnectionState>,
    connection: Option<Connection>,
    ended: bool,
}

impl<B: FlightBackend> BackendAdapter<B> {
    /// `worker` is the runtime the backend bootstrap runs on.
    pub fn new(backend: Arc<B>, vehicle: VehicleWriter, config: ConnectionConfig, worker: Handle) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            backend,
            vehicle,
            config,
            worker,
            state,
            connection: None,
            ended: false,
        }
    }

    /// Bootstrap the backend, bind every action and subscribe every stream.
    ///
    /// Dropping the returned future before it resolves leaves the adapter
    /// `Disconnected`. A backend session that finishes bootstrapping after
    /// that is shut down on the worker.
    ///
    /// # Errors
    ///
    /// * [`BridgeError::SessionEnded`] after [`destroy`](Self::destroy).
    /// * [`BridgeError::AlreadyConnected`] while connected.
    /// * [`BridgeError::Connect`] when the backend cannot be reached; the
    ///   adapter is `Disconnected` again and may retry.
    /// * [`BridgeError::Worker`] when the worker runtime dropped the bootstrap.
    pub async fn connect(&mut self) -> Result<SessionInfo, BridgeError> {
        if self.ended {
            return Err(BridgeError::SessionEnded);
        }
        if self.connection.is_some() {
            return Err(BridgeError::AlreadyConnected);
        }

        self.state.send_replace(ConnectionState::Connecting);
        let mut attempt = ConnectAttempt {
            state: &self.state,
            settled: false,
        };
        info!(
            system_address = %self.config.system_address,
            server_host = %self.config.server_host,
            server_port = self.config.server_port,
            "connecting to flight backend"
        );

        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();
        let bootstrap = self.worker.spawn(async move {
            let session = backend.connect(&config).await?;
            Ok::<_, BackendError>(UnclaimedSession {
                session,
                claimed: false,
            })
        });
        let session = match bootstrap.await {
            Ok(Ok(unclaimed)) => unclaimed.claim(),
            Ok(Err(error)) => {
                warn!(%error, "flight backend connect failed");
                return Err(BridgeError::Connect(error));
            }
            Err(join) => return Err(BridgeError::Worker(join.to_string())),
        };

        let connection = Connection::open(session, &self.vehicle, &self.config);
        let info = connection.info.clone();
        debug!(
            session_id = %info.id,
            subscriptions = connection.subscriptions.len(),
            "actions bound and streams linked"
        );
        self.connection = Some(connection);
        attempt.settled = true;
        self.state.send_replace(ConnectionState::Connected);
        info!(session_id = %info.id, "flight backend connected");
        Ok(info)
    }

    /// Tear the connection down and end the adapter. Idempotent.
    ///
    /// Safe to call on an adapter that never connected: the vehicle is still
    /// reset.
    pub fn destroy(&mut self) {
        self.ended = true;
        match self.connection.take() {
            Some(connection) => connection.close(&self.vehicle),
            None => self.vehicle.reset(),
        }
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Observe lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// The live connection, if any.
    pub fn session_info(&self) -> Option<&SessionInfo> {
        self.connection.as_ref().map(|c| &c.info)
    }

    /// Whether the live connection still accepts backend deliveries.
    pub fn is_delivering(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| c.gate.is_open())
    }
}

impl<B: FlightBackend> Drop for BackendAdapter<B> {
    fn drop(&mut self) {
        if self.connection.is_some() {
            self.destroy();
        }
    }
}

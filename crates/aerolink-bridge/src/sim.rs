//! In-process simulated flight backend for tests and CI.
//!
//! [`SimBackend`] implements [`FlightBackend`] without any autopilot behind
//! it. Tests drive it from the outside:
//!
//! | Concern | Control |
//! |---|---|
//! | Telemetry | `push_position`, `push_home`, `push_velocity`, `push_attitude`, `push_video` |
//! | Stream failure | [`SimBackend::fail_stream`] |
//! | Command outcome | [`SimBackend::script_action`] with an [`ActionScript`] |
//! | Held commands | [`SimBackend::complete_pending`] |
//! | Bootstrap failure | [`SimBackend::fail_next_connect`] |
//!
//! and inspect it through call, cancellation, subscription and shutdown
//! counters.
//!
//! Samples are delivered synchronously on the thread that pushes them, the
//! same way a real backend calls back from its own worker.
//!
//! # Example
//!
//! ```rust
//! use aerolink_bridge::sim::{ActionScript, SimBackend};
//! use aerolink_types::ActionKind;
//!
//! let backend = SimBackend::new();
//! backend.script_action(ActionKind::Takeoff, ActionScript::Pending);
//! assert_eq!(backend.calls(ActionKind::Takeoff), 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use aerolink_types::ActionKind;
use async_trait::async_trait;

use crate::backend::{
    BackendError, BackendResult, BackendSession, Completion, Disposable, ErrorHandler,
    FlightBackend, RawEulerAngle, RawPosition, RawVelocityNed, RawVideoStreamInfo,
    SampleHandler, StreamKind,
};
use crate::config::ConnectionConfig;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// How the simulated backend answers a command.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActionScript {
    /// Complete successfully right away.
    #[default]
    Succeed,
    /// Fail right away with a command rejection.
    Fail { result: String, message: String },
    /// Hold the command until [`SimBackend::complete_pending`] is called.
    Pending,
}

impl ActionScript {
    pub fn fail(result: impl Into<String>, message: impl Into<String>) -> Self {
        ActionScript::Fail {
            result: result.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream hub
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber<T> {
    on_sample: SampleHandler<T>,
    on_error: Mutex<Option<ErrorHandler>>,
    disposed: Arc<AtomicBool>,
}

struct StreamHub<T> {
    subscribers: Mutex<Vec<Arc<Subscriber<T>>>>,
}

impl<T> Default for StreamHub<T> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> StreamHub<T> {
    fn subscribe(&self, on_sample: SampleHandler<T>, on_error: ErrorHandler) -> Box<dyn Disposable> {
        let disposed = Arc::new(AtomicBool::new(false));
        lock(&self.subscribers).push(Arc::new(Subscriber {
            on_sample,
            on_error: Mutex::new(Some(on_error)),
            disposed: Arc::clone(&disposed),
        }));
        Box::new(SimSubscription { disposed })
    }

    fn publish(&self, sample: T, late_delivery: bool) -> usize {
        // Snapshot first so handlers run without the hub lock held.
        let targets: Vec<_> = lock(&self.subscribers)
            .iter()
            .filter(|s| late_delivery || !s.disposed.load(Ordering::SeqCst))
            .cloned()
            .collect();
        for subscriber in &targets {
            (subscriber.on_sample)(sample.clone());
        }
        targets.len()
    }

    fn fail(&self, error: BackendError) -> usize {
        let failed: Vec<_> = {
            let mut subscribers = lock(&self.subscribers);
            let (failed, kept): (Vec<_>, Vec<_>) = subscribers
                .drain(..)
                .partition(|s| !s.disposed.load(Ordering::SeqCst));
            *subscribers = kept;
            failed
        };
        for subscriber in &failed {
            if let Some(on_error) = lock(&subscriber.on_error).take() {
                on_error(error.clone());
            }
        }
        failed.len()
    }

    fn live(&self) -> usize {
        lock(&self.subscribers)
            .iter()
            .filter(|s| !s.disposed.load(Ordering::SeqCst))
            .count()
    }
}

struct SimSubscription {
    disposed: Arc<AtomicBool>,
}

impl Disposable for SimSubscription {
    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

struct PendingAction {
    kind: ActionKind,
    on_complete: Completion,
    cancelled: Arc<AtomicBool>,
}

struct SimOperation {
    kind: ActionKind,
    cancelled: Arc<AtomicBool>,
    inner: Weak<SimInner>,
}

impl Disposable for SimOperation {
    fn dispose(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            if let Some(inner) = self.inner.upgrade() {
                *lock(&inner.cancellations).entry(self.kind).or_default() += 1;
            }
        }
    }

    fn is_disposed(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SimInner {
    connect_failure: Mutex<Option<String>>,
    connects: AtomicUsize,
    shutdowns: AtomicUsize,
    late_delivery: AtomicBool,

    scripts: Mutex<HashMap<ActionKind, ActionScript>>,
    calls: Mutex<HashMap<ActionKind, usize>>,
    cancellations: Mutex<HashMap<ActionKind, usize>>,
    pending: Mutex<Vec<PendingAction>>,

    position: StreamHub<RawPosition>,
    home: StreamHub<RawPosition>,
    velocity: StreamHub<RawVelocityNed>,
    attitude: StreamHub<RawEulerAngle>,
    video: StreamHub<RawVideoStreamInfo>,
}

/// Simulated backend. Clones share the same simulated vehicle.
#[derive(Clone, Default)]
pub struct SimBackend {
    inner: Arc<SimInner>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`FlightBackend::connect`] fail with `message`.
    pub fn fail_next_connect(&self, message: impl Into<String>) {
        *lock(&self.inner.connect_failure) = Some(message.into());
    }

    /// Number of successful connects.
    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Number of session shutdowns.
    pub fn shutdown_count(&self) -> usize {
        self.inner.shutdowns.load(Ordering::SeqCst)
    }

    /// Keep delivering samples to disposed subscriptions, emulating a backend
    /// whose in-flight callbacks race an unsubscribe.
    pub fn set_late_delivery(&self, enabled: bool) {
        self.inner.late_delivery.store(enabled, Ordering::SeqCst);
    }

    pub fn script_action(&self, kind: ActionKind, script: ActionScript) {
        lock(&self.inner.scripts).insert(kind, script);
    }

    /// How many times `kind` reached the backend.
    pub fn calls(&self, kind: ActionKind) -> usize {
        lock(&self.inner.calls).get(&kind).copied().unwrap_or(0)
    }

    /// How many outstanding `kind` operations were disposed before completing.
    pub fn cancellations(&self, kind: ActionKind) -> usize {
        lock(&self.inner.cancellations).get(&kind).copied().unwrap_or(0)
    }

    /// Held commands that have not been cancelled.
    pub fn pending_actions(&self) -> usize {
        lock(&self.inner.pending)
            .iter()
            .filter(|p| !p.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Complete the oldest held `kind` command with `outcome`.
    ///
    /// The completion is delivered even if the operation was cancelled, the
    /// way a backend reply can cross a cancellation on the wire. Returns
    /// `false` when nothing of that kind is held.
    pub fn complete_pending(&self, kind: ActionKind, outcome: BackendResult<()>) -> bool {
        let held = {
            let mut pending = lock(&self.inner.pending);
            pending
                .iter()
                .position(|p| p.kind == kind)
                .map(|i| pending.remove(i))
        };
        match held {
            Some(action) => {
                (action.on_complete)(outcome);
                true
            }
            None => false,
        }
    }

    pub fn push_position(&self, sample: RawPosition) -> usize {
        self.inner.position.publish(sample, self.late_delivery())
    }

    pub fn push_home(&self, sample: RawPosition) -> usize {
        self.inner.home.publish(sample, self.late_delivery())
    }

    pub fn push_velocity(&self, sample: RawVelocityNed) -> usize {
        self.inner.velocity.publish(sample, self.late_delivery())
    }

    pub fn push_attitude(&self, sample: RawEulerAngle) -> usize {
        self.inner.attitude.publish(sample, self.late_delivery())
    }

    pub fn push_video(&self, sample: RawVideoStreamInfo) -> usize {
        self.inner.video.publish(sample, self.late_delivery())
    }

    /// Terminate every live subscription of `stream` with an error.
    pub fn fail_stream(&self, stream: StreamKind, message: impl Into<String>) -> usize {
        let error = BackendError::Stream {
            stream,
            message: message.into(),
        };
        match stream {
            StreamKind::Position => self.inner.position.fail(error),
            StreamKind::Home => self.inner.home.fail(error),
            StreamKind::VelocityNed => self.inner.velocity.fail(error),
            StreamKind::AttitudeEuler => self.inner.attitude.fail(error),
            StreamKind::VideoStreamInfo => self.inner.video.fail(error),
        }
    }

    /// Live (not disposed, not failed) subscriptions on `stream`.
    pub fn live_subscriptions(&self, stream: StreamKind) -> usize {
        match stream {
            StreamKind::Position => self.inner.position.live(),
            StreamKind::Home => self.inner.home.live(),
            StreamKind::VelocityNed => self.inner.velocity.live(),
            StreamKind::AttitudeEuler => self.inner.attitude.live(),
            StreamKind::VideoStreamInfo => self.inner.video.live(),
        }
    }

    fn late_delivery(&self) -> bool {
        self.inner.late_delivery.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlightBackend for SimBackend {
    async fn connect(&self, _config: &ConnectionConfig) -> BackendResult<Arc<dyn BackendSession>> {
        if let Some(message) = lock(&self.inner.connect_failure).take() {
            return Err(BackendError::Connection(message));
        }
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(SimSession {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct SimSession {
    inner: Arc<SimInner>,
}

impl BackendSession for SimSession {
    fn action(&self, kind: ActionKind, on_complete: Completion) -> Box<dyn Disposable> {
        *lock(&self.inner.calls).entry(kind).or_default() += 1;
        let script = lock(&self.inner.scripts).get(&kind).cloned().unwrap_or_default();
        let cancelled = Arc::new(AtomicBool::new(false));

        match script {
            ActionScript::Succeed => on_complete(Ok(())),
            ActionScript::Fail { result, message } => on_complete(Err(BackendError::Command {
                action: kind,
                result,
                message,
            })),
            ActionScript::Pending => lock(&self.inner.pending).push(PendingAction {
                kind,
                on_complete,
                cancelled: Arc::clone(&cancelled),
            }),
        }

        Box::new(SimOperation {
            kind,
            cancelled,
            inner: Arc::downgrade(&self.inner),
        })
    }

    fn position(
        &self,
        on_sample: SampleHandler<RawPosition>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable> {
        self.inner.position.subscribe(on_sample, on_error)
    }

    fn home(
        &self,
        on_sample: SampleHandler<RawPosition>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable> {
        self.inner.home.subscribe(on_sample, on_error)
    }

    fn velocity_ned(
        &self,
        on_sample: SampleHandler<RawVelocityNed>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable> {
        self.inner.velocity.subscribe(on_sample, on_error)
    }

    fn attitude_euler(
        &self,
        on_sample: SampleHandler<RawEulerAngle>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable> {
        self.inner.attitude.subscribe(on_sample, on_error)
    }

    fn video_stream_info(
        &self,
        on_sample: SampleHandler<RawVideoStreamInfo>,
        on_error: ErrorHandler,
    ) -> Box<dyn Disposable> {
        self.inner.video.subscribe(on_sample, on_error)
    }

    /// Drops every held command with [`BackendError::Closed`]; cancelled ones
    /// are discarded silently.
    fn shutdown(&self) {
        self.inner.shutdowns.fetch_add(1, Ordering::SeqCst);
        let held: Vec<_> = lock(&self.inner.pending).drain(..).collect();
        for action in held {
            if !action.cancelled.load(Ordering::SeqCst) {
                (action.on_complete)(Err(BackendError::Closed));
            }
        }
    }
}

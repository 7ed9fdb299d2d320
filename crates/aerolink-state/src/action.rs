//! Action capability: the six vehicle commands.
//!
//! [`Action`] is the consumer side: `arm()`, `takeoff()`, … suspend until the
//! bound implementation reports completion. [`ActionWriter`] is the adapter
//! side: it binds one implementation per [`ActionKind`], replacing whatever
//! was bound before, and [`ActionWriter::reset`] unbinds everything.
//!
//! The container itself never serialises invocations; every call runs the
//! bound future independently.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use aerolink_types::{ActionError, ActionKind, VehicleError};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

/// Future produced by a bound action implementation.
pub type ActionFuture = BoxFuture<'static, Result<(), ActionError>>;

/// A bound action implementation. Each call starts one backend operation.
pub type ActionFn = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

#[derive(Default)]
struct Bindings {
    slots: RwLock<[Option<ActionFn>; 6]>,
}

impl Bindings {
    fn get(&self, kind: ActionKind) -> Option<ActionFn> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots[kind.index()].clone()
    }

    fn set(&self, kind: ActionKind, f: Option<ActionFn>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots[kind.index()] = f;
    }
}

/// Create an action container with nothing bound.
pub fn action() -> (Action, ActionWriter) {
    let bindings = Arc::new(Bindings::default());
    (
        Action {
            bindings: Arc::clone(&bindings),
        },
        ActionWriter { bindings },
    )
}

/// Consumer view of the vehicle's commands.
#[derive(Clone)]
pub struct Action {
    bindings: Arc<Bindings>,
}

impl Action {
    /// Run `kind` and wait for the backend to finish it.
    ///
    /// Dropping the returned future before it resolves abandons the command;
    /// the bound implementation is responsible for cancelling the backend
    /// operation in that case.
    ///
    /// # Errors
    ///
    /// * [`VehicleError::NotBound`] when nothing is bound for `kind`.
    /// * [`VehicleError::Action`] when the backend rejects or fails it.
    pub async fn invoke(&self, kind: ActionKind) -> Result<(), VehicleError> {
        let Some(run) = self.bindings.get(kind) else {
            return Err(VehicleError::NotBound(kind));
        };
        debug!(action = %kind, "invoking action");
        run()
            .await
            .map_err(|source| VehicleError::Action { action: kind, source })
    }

    /// Whether an implementation is currently bound for `kind`.
    pub fn is_bound(&self, kind: ActionKind) -> bool {
        self.bindings.get(kind).is_some()
    }

    pub async fn arm(&self) -> Result<(), VehicleError> {
        self.invoke(ActionKind::Arm).await
    }

    pub async fn disarm(&self) -> Result<(), VehicleError> {
        self.invoke(ActionKind::Disarm).await
    }

    pub async fn takeoff(&self) -> Result<(), VehicleError> {
        self.invoke(ActionKind::Takeoff).await
    }

    pub async fn land(&self) -> Result<(), VehicleError> {
        self.invoke(ActionKind::Land).await
    }

    pub async fn hold(&self) -> Result<(), VehicleError> {
        self.invoke(ActionKind::Hold).await
    }

    pub async fn return_to_launch(&self) -> Result<(), VehicleError> {
        self.invoke(ActionKind::ReturnToLaunch).await
    }
}

/// Adapter view of the vehicle's commands.
#[derive(Clone)]
pub struct ActionWriter {
    bindings: Arc<Bindings>,
}

impl ActionWriter {
    /// Bind `f` as the implementation of `kind`, replacing any previous one.
    pub fn bind<F, Fut>(&self, kind: ActionKind, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        let run: ActionFn = Arc::new(move || f().boxed());
        self.bindings.set(kind, Some(run));
    }

    pub fn unbind(&self, kind: ActionKind) {
        self.bindings.set(kind, None);
    }

    /// Unbind all six actions.
    pub fn reset(&self) {
        for kind in ActionKind::ALL {
            self.unbind(kind);
        }
    }
}

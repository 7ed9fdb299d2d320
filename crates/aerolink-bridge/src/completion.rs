//! Turns a callback-style backend command into a future.
//!
//! [`run_action`] issues the command, parks the caller on a oneshot until the
//! backend's completion fires, and translates the outcome into an
//! [`ActionError`]. Dropping the future before the reply arrives disposes the
//! backend operation, so an abandoned command never reports back.

use std::sync::Arc;
use std::time::Duration;

use aerolink_types::{ActionError, ActionKind};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backend::{BackendError, BackendResult, BackendSession, Disposable};

/// Disposes the backend operation on drop unless it already completed.
struct PendingOperation {
    kind: ActionKind,
    handle: Box<dyn Disposable>,
    completed: bool,
}

impl Drop for PendingOperation {
    fn drop(&mut self) {
        if !self.completed && !self.handle.is_disposed() {
            debug!(action = %self.kind, "cancelling backend operation");
            self.handle.dispose();
        }
    }
}

/// Run `kind` on `session` once.
///
/// Resolves when the backend reports completion, when `timeout` elapses, or
/// when `closed` is cancelled by connection teardown, whichever comes first.
/// In the last two cases the backend operation is disposed.
pub(crate) async fn run_action(
    session: Arc<dyn BackendSession>,
    kind: ActionKind,
    closed: CancellationToken,
    timeout: Option<Duration>,
) -> Result<(), ActionError> {
    if closed.is_cancelled() {
        return Err(ActionError::from_cause(BackendError::Closed));
    }

    let (tx, rx) = oneshot::channel::<BackendResult<()>>();
    let handle = session.action(
        kind,
        Box::new(move |result| {
            // The receiver is gone when the caller gave up; nothing to do.
            let _ = tx.send(result);
        }),
    );
    let mut operation = PendingOperation {
        kind,
        handle,
        completed: false,
    };

    let reply = tokio::select! {
        reply = wait_for_reply(rx, timeout) => reply,
        () = closed.cancelled() => {
            return Err(ActionError::from_cause(BackendError::Closed));
        }
    };

    match reply {
        Ok(Ok(outcome)) => {
            operation.completed = true;
            outcome.map_err(translate)
        }
        Ok(Err(_)) => {
            // Completion dropped without being called.
            operation.completed = true;
            Err(ActionError::from_cause(BackendError::Closed))
        }
        Err(elapsed) => {
            warn!(action = %kind, ?timeout, "backend did not answer in time");
            Err(ActionError::with_cause(
                Some(format!("{kind} timed out")),
                elapsed,
            ))
        }
    }
}

async fn wait_for_reply(
    rx: oneshot::Receiver<BackendResult<()>>,
    timeout: Option<Duration>,
) -> Result<Result<BackendResult<()>, oneshot::error::RecvError>, tokio::time::error::Elapsed> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, rx).await,
        None => Ok(rx.await),
    }
}

/// The backend's own message when it gave one, its display form otherwise.
fn translate(error: BackendError) -> ActionError {
    let message = match &error {
        BackendError::Command { message, .. } => message.clone(),
        other => other.to_string(),
    };
    ActionError::with_cause(Some(message), error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FlightBackend;
    use crate::config::ConnectionConfig;
    use crate::sim::{ActionScript, SimBackend};

    async fn connected() -> (SimBackend, Arc<dyn BackendSession>) {
        let backend = SimBackend::new();
        let session = backend.connect(&ConnectionConfig::default()).await.unwrap();
        (backend, session)
    }

    fn cause_of(err: &ActionError) -> &BackendError {
        err.cause()
            .and_then(|c| c.downcast_ref::<BackendError>())
            .expect("backend error cause")
    }

    #[tokio::test]
    async fn success_resolves_ok() {
        let (backend, session) = connected().await;
        run_action(session, ActionKind::Arm, CancellationToken::new(), None)
            .await
            .unwrap();
        assert_eq!(backend.calls(ActionKind::Arm), 1);
        assert_eq!(backend.cancellations(ActionKind::Arm), 0);
    }

    #[tokio::test]
    async fn rejection_keeps_message_and_cause() {
        let (backend, session) = connected().await;
        backend.script_action(
            ActionKind::Takeoff,
            ActionScript::fail("COMMAND_DENIED", "Command denied"),
        );

        let err = run_action(session, ActionKind::Takeoff, CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), Some("Command denied"));
        assert!(matches!(
            cause_of(&err),
            BackendError::Command { action: ActionKind::Takeoff, .. }
        ));
    }

    #[tokio::test]
    async fn pending_resolves_when_backend_completes() {
        let (backend, session) = connected().await;
        backend.script_action(ActionKind::Land, ActionScript::Pending);

        let task = tokio::spawn(run_action(
            session,
            ActionKind::Land,
            CancellationToken::new(),
            None,
        ));
        while backend.pending_actions() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        assert!(backend.complete_pending(ActionKind::Land, Ok(())));
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn dropping_the_future_disposes_the_operation() {
        let (backend, session) = connected().await;
        backend.script_action(ActionKind::Hold, ActionScript::Pending);

        let task = tokio::spawn(run_action(
            session,
            ActionKind::Hold,
            CancellationToken::new(),
            None,
        ));
        while backend.pending_actions() == 0 {
            tokio::task::yield_now().await;
        }
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(backend.cancellations(ActionKind::Hold), 1);
        // A reply racing the cancellation goes nowhere.
        assert!(backend.complete_pending(ActionKind::Hold, Ok(())));
    }

    #[tokio::test]
    async fn timeout_cancels_and_reports_elapsed() {
        let (backend, session) = connected().await;
        backend.script_action(ActionKind::ReturnToLaunch, ActionScript::Pending);

        let err = run_action(
            session,
            ActionKind::ReturnToLaunch,
            CancellationToken::new(),
            Some(Duration::from_millis(20)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.message(), Some("return_to_launch timed out"));
        assert!(
            err.cause()
                .is_some_and(|c| c.is::<tokio::time::error::Elapsed>())
        );
        assert_eq!(backend.cancellations(ActionKind::ReturnToLaunch), 1);
    }

    #[tokio::test]
    async fn teardown_fails_pending_action() {
        let (backend, session) = connected().await;
        backend.script_action(ActionKind::Disarm, ActionScript::Pending);
        let closed = CancellationToken::new();

        let task = tokio::spawn(run_action(
            session,
            ActionKind::Disarm,
            closed.clone(),
            None,
        ));
        while backend.pending_actions() == 0 {
            tokio::task::yield_now().await;
        }
        closed.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(cause_of(&err), &BackendError::Closed);
        assert_eq!(backend.cancellations(ActionKind::Disarm), 1);
    }

    #[tokio::test]
    async fn closed_session_never_reaches_backend() {
        let (backend, session) = connected().await;
        let closed = CancellationToken::new();
        closed.cancel();

        let err = run_action(session, ActionKind::Arm, closed, None)
            .await
            .unwrap_err();
        assert_eq!(cause_of(&err), &BackendError::Closed);
        assert_eq!(backend.calls(ActionKind::Arm), 0);
    }
}

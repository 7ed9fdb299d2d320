//! Dedicated thread that hosts backend work.
//!
//! A [`BackendWorker`] owns one OS thread running its own Tokio runtime.
//! Adapters receive its [`Handle`] and run the backend bootstrap there, so
//! backend callbacks never depend on whichever runtime the application
//! happens to use. The worker is explicit: it is started by the host, passed
//! down, and stopped when dropped.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::SessionError;

/// How long outstanding worker tasks get to finish on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct BackendWorker {
    name: String,
    handle: Handle,
    stop: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl BackendWorker {
    /// Start a worker thread called `name`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Worker`] when the runtime or the thread cannot be
    /// created.
    pub fn start(name: impl Into<String>) -> Result<Self, SessionError> {
        let name = name.into();
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SessionError::Worker)?;
        let handle = runtime.handle().clone();
        let (stop, stopped) = oneshot::channel::<()>();

        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                runtime.block_on(async {
                    // Either an explicit stop or the sender being dropped.
                    let _ = stopped.await;
                });
                runtime.shutdown_timeout(SHUTDOWN_GRACE);
            })
            .map_err(SessionError::Worker)?;

        debug!(worker = %name, "backend worker started");
        Ok(Self {
            name,
            handle,
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    /// Handle for spawning onto the worker.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the runtime and join the thread. Also done on drop.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(worker = %self.name, "backend worker thread panicked");
            } else {
                debug!(worker = %self.name, "backend worker stopped");
            }
        }
    }
}

impl Drop for BackendWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_futures_on_its_own_thread() {
        let worker = BackendWorker::start("aerolink-test-worker").unwrap();
        assert_eq!(worker.name(), "aerolink-test-worker");

        let (tx, rx) = std::sync::mpsc::channel();
        worker.handle().spawn(async move {
            let current = thread::current();
            tx.send((current.id(), current.name().map(str::to_string))).unwrap();
        });

        let (ran_on, name) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(ran_on, thread::current().id());
        assert_eq!(name.as_deref(), Some("aerolink-test-worker"));
        worker.shutdown();
    }

    #[tokio::test]
    async fn handle_is_usable_from_another_runtime() {
        let worker = BackendWorker::start("aerolink-test-worker").unwrap();
        let answer = worker.handle().spawn(async { 6 * 7 }).await.unwrap();
        assert_eq!(answer, 42);
        // Joining a thread is blocking; keep it off the test's runtime.
        tokio::task::spawn_blocking(move || drop(worker)).await.unwrap();
    }

    #[test]
    fn tasks_spawned_after_shutdown_never_run() {
        let worker = BackendWorker::start("aerolink-test-worker").unwrap();
        let handle = worker.handle();
        worker.shutdown();

        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let _ = handle.spawn(async move {
            let _ = tx.send(());
        });
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }
}

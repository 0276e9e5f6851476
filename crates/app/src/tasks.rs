//! Background jobs polled from the UI thread.
//!
//! Every slow operation (model query, model list, screenshot, email) runs on
//! its own thread and hands its result back through a channel. The frame
//! loop calls [`poll_slot`] once per frame; that is the only join point.

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// A job that died without producing a value (it panicked).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailed {
    pub label: &'static str,
}

impl fmt::Display for TaskFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "background task '{}' stopped unexpectedly", self.label)
    }
}

impl std::error::Error for TaskFailed {}

pub struct BackgroundTask<T> {
    label: &'static str,
    rx: Receiver<thread::Result<T>>,
    started: Instant,
}

impl<T: Send + 'static> BackgroundTask<T> {
    pub fn spawn<F>(label: &'static str, job: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = channel();
        thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job));
            // The receiver is gone if the UI dropped the task; nothing to do.
            let _ = tx.send(outcome);
        });
        tracing::debug!(label, "background task started");
        Self {
            label,
            rx,
            started: Instant::now(),
        }
    }
}

impl<T> BackgroundTask<T> {
    /// Non-blocking. `None` while the job is still running.
    pub fn poll(&self) -> Option<Result<T, TaskFailed>> {
        match self.rx.try_recv() {
            Ok(Ok(value)) => {
                tracing::debug!(label = self.label, elapsed = ?self.started.elapsed(), "background task finished");
                Some(Ok(value))
            }
            Ok(Err(_)) | Err(TryRecvError::Disconnected) => {
                tracing::warn!(label = self.label, "background task panicked");
                Some(Err(TaskFailed { label: self.label }))
            }
            Err(TryRecvError::Empty) => None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Poll the task in `slot` and empty the slot once it has finished.
pub fn poll_slot<T>(slot: &mut Option<BackgroundTask<T>>) -> Option<Result<T, TaskFailed>> {
    let outcome = slot.as_ref()?.poll()?;
    *slot = None;
    Some(outcome)
}

/// Drive a future to completion on a fresh current-thread runtime.
/// Only called from inside a [`BackgroundTask`] job.
pub fn block_on<F: Future>(future: F) -> std::io::Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(future))
}

#[cfg(test)]
pub(crate) fn wait_for<T>(slot: &mut Option<BackgroundTask<T>>) -> Result<T, TaskFailed> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(outcome) = poll_slot(slot) {
            return outcome;
        }
        assert!(Instant::now() < deadline, "background task did not finish");
        thread::sleep(Duration::from_millis(5));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_task_delivers_value_once() {
        let mut slot = Some(BackgroundTask::spawn("sum", || 2 + 2));
        assert_eq!(wait_for(&mut slot), Ok(4));
        assert!(slot.is_none());
        assert!(poll_slot(&mut slot).is_none());
    }

    #[test]
    fn test_poll_is_pending_until_job_finishes() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut slot = Some(BackgroundTask::spawn("gated", move || {
            let _ = release_rx.recv();
            "done"
        }));

        assert!(poll_slot(&mut slot).is_none());
        assert!(slot.is_some());

        release_tx.send(()).unwrap();
        assert_eq!(wait_for(&mut slot), Ok("done"));
    }

    #[test]
    fn test_panicking_job_is_reported_not_propagated() {
        let mut slot: Option<BackgroundTask<u32>> =
            Some(BackgroundTask::spawn("boom", || panic!("worker exploded")));
        let err = wait_for(&mut slot).unwrap_err();
        assert_eq!(err.label, "boom");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_block_on_runs_async_work() {
        let value = block_on(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            7
        })
        .unwrap();
        assert_eq!(value, 7);
    }
}

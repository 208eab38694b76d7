//! # Request Context
//!
//! Deadline and cancellation for `_with_context` calls. A context is cheap to
//! clone; clones share the same deadline and cancellation signal.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every clone of the context it was created with
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl RequestContext {
    /// No deadline, never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// Context that can be cancelled through the returned handle
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancel: Some(receiver),
            },
            CancelHandle { sender },
        )
    }

    /// Same context with `timeout` applied; an earlier deadline is kept
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|receiver| *receiver.borrow())
    }

    /// Drive `future` until it completes, the context is cancelled, or the deadline passes
    ///
    /// # Errors
    ///
    /// [`Error::Canceled`] or [`Error::DeadlineExceeded`]; `future` is dropped.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output> {
        let mut cancel = self.cancel.clone();
        let cancelled = async move {
            match cancel.as_mut() {
                Some(receiver) => {
                    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(Error::Canceled),
            () = expired => Err(Error::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = RequestContext::background();
        assert_eq!(ctx.run(async { 7 }).await.unwrap(), 7);
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_future() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(80));
        let err = ctx
            .run(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deadline exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_fails_immediately() {
        let ctx = RequestContext::with_timeout(Duration::ZERO);
        assert!(matches!(
            ctx.run(async { 1 }).await,
            Err(Error::DeadlineExceeded)
        ));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_clones() {
        let (ctx, handle) = RequestContext::with_cancel();
        let clone = ctx.clone();
        let waiter = tokio::spawn(async move { clone.run(std::future::pending::<()>()).await });
        handle.cancel();
        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "context canceled");
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (ctx, handle) = RequestContext::with_cancel();
        drop(handle);
        assert_eq!(ctx.run(async { "done" }).await.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_earlier_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(1)).timeout(Duration::from_secs(5));
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(1));
    }
}

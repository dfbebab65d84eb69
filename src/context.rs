//! Cancellation and deadline carried by a single logical call.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::{MistyError, Result};

/// Cancellation signal plus an optional absolute deadline.
///
/// Cloning shares the cancellation token, so cancelling any clone cancels
/// every call made with it. [`CallContext::child`] derives a context that is
/// cancelled with its parent but can be dropped independently.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Creates a context with no deadline that is never cancelled unless
    /// [`CallContext::cancel`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline `timeout` from now.
    ///
    /// A timeout too large to represent leaves the context without a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Uses an existing cancellation token instead of a private one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancels every call running under this context or its children.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Derives a context that keeps the deadline and is cancelled when this
    /// one is. Dropping the child unregisters it from the parent.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    /// Returns the error this context has already fired with, if any.
    ///
    /// Cancellation wins over an expired deadline.
    pub fn err(&self) -> Option<MistyError> {
        if self.cancel.is_cancelled() {
            return Some(MistyError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(MistyError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> MistyError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => MistyError::Cancelled,
                _ = sleep_until(deadline) => MistyError::DeadlineExceeded,
            },
            None => {
                self.cancel.cancelled().await;
                MistyError::Cancelled
            }
        }
    }

    /// Runs `fut` to completion unless the context fires first.
    ///
    /// A context that has already fired never polls `fut`.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = fut => Ok(output),
        }
    }

    /// Sleeps for `delay` unless the context fires first.
    pub async fn sleep(&self, delay: Duration) -> Result<()> {
        self.run(tokio::time::sleep(delay)).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::CallContext;
    use crate::MistyError;

    #[tokio::test]
    async fn fresh_context_has_not_fired() {
        let ctx = CallContext::new();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn expired_deadline_never_polls_future() {
        let ctx = CallContext::new().with_deadline(Instant::now() - Duration::from_millis(1));
        let mut polled = false;
        let err = ctx
            .run(async { polled = true })
            .await
            .expect_err("expired context must fail");
        assert!(matches!(err, MistyError::DeadlineExceeded));
        assert!(!polled);
    }

    #[tokio::test]
    async fn cancellation_wins_over_expired_deadline() {
        let ctx = CallContext::new().with_deadline(Instant::now() - Duration::from_millis(1));
        ctx.cancel();
        assert!(matches!(ctx.err(), Some(MistyError::Cancelled)));
    }

    #[tokio::test]
    async fn deadline_interrupts_sleep() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(20));
        let started = Instant::now();
        let err = ctx
            .sleep(Duration::from_secs(5))
            .await
            .expect_err("sleep must be interrupted");
        assert!(matches!(err, MistyError::DeadlineExceeded));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unrepresentable_timeout_leaves_no_deadline() {
        let ctx = CallContext::new().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(ctx.err().is_none());
    }

    #[tokio::test]
    async fn cancelling_parent_cancels_child() {
        let parent = CallContext::new();
        let child = parent.child();
        let waiter = tokio::spawn(async move { child.sleep(Duration::from_secs(5)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        parent.cancel();
        let result = waiter.await.expect("task must not panic");
        assert!(matches!(result, Err(MistyError::Cancelled)));
    }

    #[tokio::test]
    async fn dropping_child_leaves_parent_untouched() {
        let parent = CallContext::new();
        drop(parent.child());
        assert!(parent.err().is_none());
    }
}

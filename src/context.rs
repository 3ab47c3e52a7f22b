//! Cancellation scope for API calls.
//!
//! A [`Context`] pairs a [`CancellationToken`] with an optional deadline.
//! Every dispatch runs under one; when it ends, the in-flight request is
//! dropped and the reason is reported as the call's error.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`Context`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Cancellation {
    #[error("context canceled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that only ends when [`Context::cancel`] is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// A child context that also ends once `timeout` has elapsed.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A child context that also ends at `deadline`. An earlier deadline on
    /// `self` is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// A child context; cancelling it leaves `self` running.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The underlying token, for wiring into other `tokio-util` users.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the reason this context has ended, or `None` while it is live.
    pub fn err(&self) -> Option<Cancellation> {
        if self.token.is_cancelled() {
            Some(Cancellation::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(Cancellation::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Resolves once the context ends.
    pub async fn done(&self) -> Cancellation {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => Cancellation::Cancelled,
                () = tokio::time::sleep_until(deadline) => Cancellation::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                Cancellation::Cancelled
            }
        }
    }
}

/// Adopts an existing token as a context without a deadline.
impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.deadline(), None);
    }

    #[test]
    fn test_cancel_reports_cancelled() {
        let ctx = Context::background();
        ctx.cancel();
        assert_eq!(ctx.err(), Some(Cancellation::Cancelled));
    }

    #[test]
    fn test_parent_cancel_reaches_child() {
        let parent = Context::background();
        let child = parent.child();
        parent.cancel();
        assert_eq!(child.err(), Some(Cancellation::Cancelled));
    }

    #[test]
    fn test_child_cancel_spares_parent() {
        let parent = Context::background();
        let child = parent.child();
        child.cancel();
        assert_eq!(parent.err(), None);
    }

    #[test]
    fn test_child_keeps_earlier_parent_deadline() {
        let parent = Context::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn test_elapsed_deadline_reports_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        assert_eq!(ctx.done().await, Cancellation::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(Cancellation::DeadlineExceeded));
    }

    #[test]
    fn test_context_from_token_follows_token() {
        let token = CancellationToken::new();
        let ctx = Context::from(token.clone());
        assert_eq!(ctx.deadline(), None);
        assert_eq!(ctx.err(), None);
        token.cancel();
        assert_eq!(ctx.err(), Some(Cancellation::Cancelled));
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let ctx = Context::background().with_timeout(Duration::from_secs(60));
        let token = ctx.cancellation_token().clone();
        assert!(!token.is_cancelled());
        ctx.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_done_wakes_on_cancel() {
        let ctx = Context::background().with_timeout(Duration::from_secs(60));
        let handle = ctx.clone();
        tokio::spawn(async move { handle.cancel() });
        assert_eq!(ctx.done().await, Cancellation::Cancelled);
    }
}

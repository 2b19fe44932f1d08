//! Cooperative cancellation for long-running queries.

use tokio_util::sync::CancellationToken;

use super::error::{Result, TreeError};

/// Caller-driven cancellation flag checked at every scope-walk and
/// traversal step.
///
/// Cloning shares the flag. There are no implicit timeouts.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: Option<CancellationToken>,
}

impl Cancellation {
    /// A fresh, not yet cancelled flag.
    pub fn new() -> Self {
        Self {
            token: Some(CancellationToken::new()),
        }
    }

    /// A flag that can never be cancelled.
    pub fn none() -> Self {
        Self { token: None }
    }

    /// Wrap an existing token, e.g. one owned by a request handler.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token: Some(token) }
    }

    /// A child flag: cancelled whenever this one is, but cancelling the
    /// child leaves the parent untouched.
    pub fn child(&self) -> Self {
        match &self.token {
            Some(token) => Self::from_token(token.child_token()),
            None => Self::new(),
        }
    }

    pub fn cancel(&self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Fails with [`TreeError::Cancelled`] once cancelled.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(TreeError::Cancelled);
        }
        Ok(())
    }
}

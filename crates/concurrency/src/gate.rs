//! Readiness gate for one direction of a connection.
//!
//! A gate starts `Pending`, becomes `Ready` when the connection opens, and is
//! replaced by a terminal error when its direction ends. Waiters suspend until
//! the gate leaves `Pending` and then observe either readiness or the error.

use mercury_core::{Error, Result};
use tokio::sync::watch;

/// Current contents of a [`Gate`].
#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    /// Direction not yet usable
    Pending,
    /// Direction open
    Ready,
    /// Direction ended; every waiter receives this error
    Failed(Error),
}

/// Awaitable cell holding "ready" or a terminal error.
#[derive(Debug)]
pub struct Gate {
    state: watch::Sender<GateState>,
}

impl Gate {
    /// Create a gate in the `Pending` state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState::Pending);
        Self { state }
    }

    /// Resolve a pending gate to `Ready`.
    ///
    /// Returns false (and changes nothing) if the gate already resolved; a
    /// direction that failed while connecting never reopens.
    pub fn open(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == GateState::Pending {
                *state = GateState::Ready;
                true
            } else {
                false
            }
        })
    }

    /// Replace the gate's contents with a terminal error.
    pub fn fail(&self, error: Error) {
        self.state.send_replace(GateState::Failed(error));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GateState {
        self.state.borrow().clone()
    }

    /// True once the gate holds an error.
    pub fn is_terminal(&self) -> bool {
        matches!(*self.state.borrow(), GateState::Failed(_))
    }

    /// Non-blocking check: `Ok` if ready, the terminal error if failed.
    pub fn check(&self) -> Result<()> {
        match &*self.state.borrow() {
            GateState::Ready => Ok(()),
            GateState::Failed(e) => Err(e.clone()),
            GateState::Pending => Err(Error::not_initialized("connection")),
        }
    }

    /// Wait until the gate resolves.
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let resolved = rx
            .wait_for(|state| *state != GateState::Pending)
            .await
            .map_err(|_| Error::transport("readiness gate dropped"))?;
        match &*resolved {
            GateState::Failed(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_on_open() {
        let gate = Arc::new(Gate::new());
        let g = Arc::clone(&gate);
        let waiter = tokio::spawn(async move { g.wait().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        assert!(gate.open());
        waiter.await.unwrap().unwrap();
        assert_eq!(gate.state(), GateState::Ready);
    }

    #[tokio::test]
    async fn test_fail_wakes_waiters_with_error() {
        let gate = Arc::new(Gate::new());
        let g = Arc::clone(&gate);
        let waiter = tokio::spawn(async move { g.wait().await });

        gate.fail(Error::transport("refused"));
        assert_eq!(
            waiter.await.unwrap().unwrap_err(),
            Error::transport("refused")
        );
    }

    #[tokio::test]
    async fn test_terminal_replaces_ready() {
        let gate = Gate::new();
        gate.open();
        gate.wait().await.unwrap();

        gate.fail(Error::already_closed("closed for sending"));
        assert!(gate.is_terminal());
        assert_eq!(
            gate.wait().await.unwrap_err(),
            Error::already_closed("closed for sending")
        );

        gate.fail(Error::Eof);
        assert_eq!(gate.check().unwrap_err(), Error::Eof);
    }

    #[test]
    fn test_open_after_failure_is_ignored() {
        let gate = Gate::new();
        gate.fail(Error::transport("refused"));
        assert!(!gate.open());
        assert!(gate.is_terminal());
    }

    #[test]
    fn test_check_pending() {
        let gate = Gate::new();
        assert!(matches!(gate.check(), Err(Error::NotInitialized { .. })));
    }
}

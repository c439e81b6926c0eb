//! Repeatable "new item buffered" notification.
//!
//! Every [`notify`](ArrivalSignal::notify) starts a new generation. A waiter
//! records the generation it has already seen *before* inspecting the buffer,
//! then waits for a later one, so an arrival that lands between the check and
//! the wait is never missed.

use mercury_core::{Error, Result};
use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Arrivals {
    generation: u64,
    failure: Option<Error>,
}

/// Message-arrival signal shared by the message handler and receivers.
#[derive(Debug)]
pub struct ArrivalSignal {
    state: watch::Sender<Arrivals>,
}

impl ArrivalSignal {
    /// Create a signal at generation zero.
    pub fn new() -> Self {
        let (state, _) = watch::channel(Arrivals {
            generation: 0,
            failure: None,
        });
        Self { state }
    }

    /// Generation most recently published.
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Publish a new arrival and arm the signal for the next one.
    pub fn notify(&self) {
        self.state.send_modify(|s| s.generation += 1);
    }

    /// Fail current and future waits that see no newer arrival.
    pub fn fail(&self, error: Error) {
        self.state.send_modify(|s| s.failure = Some(error));
    }

    /// Wait for an arrival newer than `seen`.
    ///
    /// A newer arrival wins over a recorded failure so buffered data is
    /// always collected before the failure is reported.
    pub async fn wait_after(&self, seen: u64) -> Result<()> {
        let mut rx = self.state.subscribe();
        let state = rx
            .wait_for(|s| s.generation > seen || s.failure.is_some())
            .await
            .map_err(|_| Error::transport("arrival signal dropped"))?;
        if state.generation > seen {
            return Ok(());
        }
        match &state.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Default for ArrivalSignal {
    fn default() -> Self {
        Self::new()
    }
}

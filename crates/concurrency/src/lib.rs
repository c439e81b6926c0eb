//! Concurrency primitives for Mercury
//!
//! - [`Sequencer`]: runs submitted operations one at a time, in submission
//!   order, with failures scoped to the submitting caller
//! - [`Gate`]: awaitable readiness cell for one direction of a connection
//! - [`ArrivalSignal`]: repeatable "something new was buffered" notification
//!
//! The stream transport composes three sequencers (core, send, receive), two
//! gates (send, receive) and one arrival signal.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod sequencer;
pub mod signal;

pub use gate::{Gate, GateState};
pub use sequencer::{Sequencer, SequencerStats};
pub use signal::ArrivalSignal;

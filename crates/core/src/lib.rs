//! Core types for Mercury
//!
//! This crate defines the pieces every other Mercury crate agrees on:
//! - Error: the error taxonomy shared by the codec, the sequencer and the
//!   stream transport
//! - Wire constants: the end-of-stream sentinel and WebSocket close codes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;

pub use constants::{CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS, EOF_MESSAGE};
pub use error::{Error, Result};

//! Streaming transport for Mercury
//!
//! Streaming calls ride one WebSocket carrying one JSON-encoded message per
//! text frame. The literal frame `EOF` marks the end of a direction.
//!
//! - [`socket`]: collaborator traits for opening and writing sockets
//! - [`StreamTransport`]: ordered send/receive with half-close and abort
//! - [`stream`]: client-streaming, server-streaming and bidirectional shapes
//! - [`TungsteniteSocketFactory`]: real sockets via `tokio-tungstenite`
//! - [`testing`]: scripted in-memory sockets for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod socket;
pub mod stream;
pub mod testing;
pub mod transport;
pub mod tungstenite;

pub use socket::{EventSink, Socket, SocketEvent, SocketFactory};
pub use stream::{ClientStream, DualStream, ServerStream};
pub use transport::{ConnectionPhase, Phases, StreamTransport};
pub use tungstenite::TungsteniteSocketFactory;

//! Streaming call shapes.
//!
//! Each shape wraps one [`StreamTransport`](crate::StreamTransport) and only
//! exposes the operations its call pattern allows:
//!
//! | Shape | Client sends | Server sends |
//! |-------|--------------|--------------|
//! | [`ClientStream`] | many, then `close_and_recv` | one response |
//! | [`ServerStream`] | one request (at `init`) | many, until EOF |
//! | [`DualStream`] | many, then `close_send` | many, until EOF |
//!
//! All shapes offer `close_early` to abort the call.

mod client;
mod dual;
mod server;

pub use client::ClientStream;
pub use dual::DualStream;
pub use server::ServerStream;

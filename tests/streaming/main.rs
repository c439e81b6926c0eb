//! Streaming Integration Tests
//!
//! Stream shapes driven through the public client, first against scripted
//! sockets, then against a real WebSocket server on localhost.

#[path = "../common/mod.rs"]
mod common;

mod loopback;
mod scripted;

//! Unary Integration Tests
//!
//! Unary calls through the default `ureq` transport against a one-shot HTTP
//! responder on localhost.

#[path = "../common/mod.rs"]
mod common;

mod http;

//! Codec Integration Tests
//!
//! Message-level encode/decode through the public `ProtoJson` entry point.

#[path = "../common/mod.rs"]
mod common;

mod messages;
mod paths;

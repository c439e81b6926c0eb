//! # Mercury Wire
//!
//! Deterministic, bidirectional mapping between native Rust values and the
//! canonical proto3 JSON wire representation.
//!
//! Every function here is pure: encoders are infallible and produce a
//! [`JsonValue`]; decoders validate the JSON type of their input first and
//! fail with [`mercury_core::Error::Decode`] naming the field, the expected
//! type and the type actually found.
//!
//! Messages describe themselves with a static table of [`Field`]s instead of
//! runtime introspection; [`encode_message`] and [`decode_message`] walk that
//! table generically.

#![warn(missing_docs)]

pub mod json;

pub use json::*;

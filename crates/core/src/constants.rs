//! Wire-level constants shared by the transport and the client.

/// Payload of the text frame that half-closes one direction of a stream.
///
/// The frame is compared against the raw payload before any JSON decoding, so
/// an application message that serializes to exactly `EOF` cannot be sent.
pub const EOF_MESSAGE: &str = "EOF";

/// Normal closure (RFC 6455 §7.4.1).
pub const CLOSE_NORMAL: u16 = 1000;

/// Close frame carried no status code.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Connection dropped without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

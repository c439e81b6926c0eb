//! Socket collaborator traits.
//!
//! A [`SocketFactory`] opens a connection and reports everything that happens
//! to it as [`SocketEvent`]s on an [`EventSink`]; the returned [`Socket`]
//! handle is used only for writing frames and closing.

use async_trait::async_trait;
use mercury_core::Result;
use tokio::sync::mpsc;

/// Something that happened to a socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// Handshake completed
    Open,
    /// One inbound text frame
    Message(String),
    /// Connection ended
    Close {
        /// Close code (1006 when no close frame was received)
        code: u16,
        /// Close reason
        reason: String,
        /// True when a close frame was exchanged
        clean: bool,
    },
    /// Socket-level failure
    Error(String),
}

/// Write half of a connection.
#[async_trait]
pub trait Socket: Send + Sync {
    /// Write one text frame.
    async fn send(&self, text: String) -> Result<()>;

    /// Start the closing handshake.
    async fn close(&self, code: u16, reason: &str) -> Result<()>;
}

/// Opens sockets.
pub trait SocketFactory: Send + Sync {
    /// Begin connecting to `url`.
    ///
    /// Returns as soon as the attempt is under way; the outcome is reported
    /// through `events` (`Open`, or `Error` followed by an unclean `Close`).
    /// An `Err` here means the attempt could not even be started.
    fn connect(&self, url: &str, events: EventSink) -> Result<Box<dyn Socket>>;
}

/// Sender side of a socket's event stream.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<SocketEvent>,
}

impl EventSink {
    /// Create a sink and the receiver that drains it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SocketEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report an event. Returns false once nobody is listening.
    pub fn emit(&self, event: SocketEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// True once the receiving transport has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

//! WebSocket sockets backed by `tokio-tungstenite`.

use crate::socket::{EventSink, Socket, SocketEvent, SocketFactory};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use mercury_core::{Error, Result, CLOSE_ABNORMAL, CLOSE_NO_STATUS};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

const LOG_TARGET: &str = "mercury::socket";

/// Opens real WebSocket connections (`ws://` and `wss://`).
///
/// Each connection runs on a background task of the current tokio runtime,
/// so [`connect`](SocketFactory::connect) must be called from within one.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteSocketFactory;

impl TungsteniteSocketFactory {
    /// Create a factory.
    pub fn new() -> Self {
        Self
    }
}

impl SocketFactory for TungsteniteSocketFactory {
    fn connect(&self, url: &str, events: EventSink) -> Result<Box<dyn Socket>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::transport(format!("no async runtime: {}", e)))?;
        let (outgoing, rx) = mpsc::unbounded_channel();
        runtime.spawn(run_connection(url.to_string(), events, rx));
        Ok(Box::new(TungsteniteSocket { outgoing }))
    }
}

struct TungsteniteSocket {
    outgoing: mpsc::UnboundedSender<Message>,
}

impl TungsteniteSocket {
    fn queue(&self, message: Message) -> Result<()> {
        self.outgoing
            .send(message)
            .map_err(|_| Error::transport("connection is no longer writable"))
    }
}

#[async_trait]
impl Socket for TungsteniteSocket {
    async fn send(&self, text: String) -> Result<()> {
        self.queue(Message::Text(text))
    }

    async fn close(&self, code: u16, reason: &str) -> Result<()> {
        self.queue(Message::Close(Some(CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        })))
    }
}

async fn run_connection(
    url: String,
    events: EventSink,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
) {
    let stream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(target: LOG_TARGET, url = %url, error = %e, "WebSocket connect failed");
            events.emit(SocketEvent::Error(e.to_string()));
            events.emit(SocketEvent::Close {
                code: CLOSE_ABNORMAL,
                reason: e.to_string(),
                clean: false,
            });
            return;
        }
    };
    debug!(target: LOG_TARGET, url = %url, "WebSocket handshake complete");
    events.emit(SocketEvent::Open);

    let (mut write, mut read) = stream.split();
    let writer = tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = write.send(message).await {
                warn!(target: LOG_TARGET, error = %e, "WebSocket write failed");
                return;
            }
            if closing {
                return;
            }
        }
        // Every handle dropped without closing
        let _ = write.close().await;
    });

    let mut closed_by: Option<(u16, String)> = None;
    let mut failure: Option<String> = None;
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                events.emit(SocketEvent::Message(text));
            }
            Ok(Message::Binary(bytes)) => {
                events.emit(SocketEvent::Message(
                    String::from_utf8_lossy(&bytes).into_owned(),
                ));
            }
            Ok(Message::Close(frame)) => {
                // Keep reading so the close reply is flushed.
                closed_by = Some(match frame {
                    Some(f) => (u16::from(f.code), f.reason.into_owned()),
                    None => (CLOSE_NO_STATUS, String::new()),
                });
            }
            Ok(_) => {}
            Err(e) => {
                if closed_by.is_none() {
                    failure = Some(e.to_string());
                }
                break;
            }
        }
    }
    writer.abort();

    match closed_by {
        Some((code, reason)) => {
            debug!(target: LOG_TARGET, url = %url, code, reason = %reason, "WebSocket closed");
            events.emit(SocketEvent::Close {
                code,
                reason,
                clean: true,
            });
        }
        None => {
            let reason =
                failure.unwrap_or_else(|| "connection ended without a close frame".to_string());
            warn!(target: LOG_TARGET, url = %url, error = %reason, "WebSocket failed");
            events.emit(SocketEvent::Error(reason.clone()));
            events.emit(SocketEvent::Close {
                code: CLOSE_ABNORMAL,
                reason,
                clean: false,
            });
        }
    }
}

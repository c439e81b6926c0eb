//! Testing utilities for stream transports
//!
//! [`ScriptedSocketFactory`] stands in for a WebSocket server: every frame the
//! transport writes is recorded, and the test drives the connection by
//! injecting socket events.
//!
//! ```ignore
//! let factory = ScriptedSocketFactory::new();
//! let transport = StreamTransport::<Value, Value>::new("ws://test", Arc::new(factory.clone()));
//! transport.init().await?;
//! factory.open();
//! factory.message(r#"{"n":1}"#);
//! assert_eq!(transport.recv().await?, json!({"n": 1}));
//! ```

use crate::socket::{EventSink, Socket, SocketEvent, SocketFactory};
use async_trait::async_trait;
use mercury_core::{Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Parks frame writes until the test releases them one at a time.
#[derive(Default)]
struct SendHold {
    release: Notify,
    parked: AtomicUsize,
}

#[derive(Default)]
struct Script {
    sink: Option<EventSink>,
    urls: Vec<String>,
    sent: Vec<String>,
    closes: Vec<(u16, String)>,
    connect_error: Option<String>,
    auto_open: bool,
    hold: Option<Arc<SendHold>>,
}

/// In-memory socket factory driven by the test.
///
/// Clones share the same script, so a test keeps one clone and hands another
/// to the transport.
#[derive(Clone, Default)]
pub struct ScriptedSocketFactory {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSocketFactory {
    /// Factory whose connections succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose connections open as soon as they are made.
    pub fn auto_open() -> Self {
        let factory = Self::default();
        factory.script.lock().auto_open = true;
        factory
    }

    /// Factory whose `connect` fails with a transport error.
    pub fn failing(reason: impl Into<String>) -> Self {
        let factory = Self::default();
        factory.script.lock().connect_error = Some(reason.into());
        factory
    }

    /// Deliver an event to the connected transport.
    ///
    /// Returns false if nothing is connected or the transport has gone away.
    pub fn emit(&self, event: SocketEvent) -> bool {
        match &self.script.lock().sink {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    /// Complete the handshake.
    pub fn open(&self) {
        self.emit(SocketEvent::Open);
    }

    /// Deliver one text frame.
    pub fn message(&self, text: &str) {
        self.emit(SocketEvent::Message(text.to_string()));
    }

    /// Socket-level failure.
    pub fn error(&self, reason: &str) {
        self.emit(SocketEvent::Error(reason.to_string()));
    }

    /// Close with a close frame.
    pub fn close_clean(&self, code: u16, reason: &str) {
        self.emit(SocketEvent::Close {
            code,
            reason: reason.to_string(),
            clean: true,
        });
    }

    /// Close without a close frame.
    pub fn close_unclean(&self, code: u16, reason: &str) {
        self.emit(SocketEvent::Close {
            code,
            reason: reason.to_string(),
            clean: false,
        });
    }

    /// Make every later `send` wait for [`release_send`](Self::release_send)
    /// before its frame is recorded.
    pub fn hold_sends(&self) {
        self.script.lock().hold = Some(Arc::new(SendHold::default()));
    }

    /// Let one held `send` complete.
    pub fn release_send(&self) {
        if let Some(hold) = &self.script.lock().hold {
            hold.release.notify_one();
        }
    }

    /// Number of `send` calls that have reached the hold.
    pub fn parked_sends(&self) -> usize {
        self.script
            .lock()
            .hold
            .as_ref()
            .map_or(0, |hold| hold.parked.load(Ordering::SeqCst))
    }

    /// URLs passed to `connect`, in order.
    pub fn urls(&self) -> Vec<String> {
        self.script.lock().urls.clone()
    }

    /// Frames written by the transport, in order.
    pub fn sent(&self) -> Vec<String> {
        self.script.lock().sent.clone()
    }

    /// `(code, reason)` of every close request.
    pub fn closes(&self) -> Vec<(u16, String)> {
        self.script.lock().closes.clone()
    }
}

impl std::fmt::Debug for ScriptedSocketFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let script = self.script.lock();
        f.debug_struct("ScriptedSocketFactory")
            .field("connected", &script.sink.is_some())
            .field("sent", &script.sent.len())
            .field("closes", &script.closes.len())
            .finish()
    }
}

impl SocketFactory for ScriptedSocketFactory {
    fn connect(&self, url: &str, events: EventSink) -> Result<Box<dyn Socket>> {
        let mut script = self.script.lock();
        script.urls.push(url.to_string());
        if let Some(reason) = &script.connect_error {
            return Err(Error::transport(reason.clone()));
        }
        if script.auto_open {
            events.emit(SocketEvent::Open);
        }
        script.sink = Some(events);
        Ok(Box::new(ScriptedSocket {
            script: Arc::clone(&self.script),
        }))
    }
}

struct ScriptedSocket {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl Socket for ScriptedSocket {
    async fn send(&self, text: String) -> Result<()> {
        let hold = self.script.lock().hold.clone();
        if let Some(hold) = hold {
            hold.parked.fetch_add(1, Ordering::SeqCst);
            hold.release.notified().await;
        }
        self.script.lock().sent.push(text);
        Ok(())
    }

    async fn close(&self, code: u16, reason: &str) -> Result<()> {
        self.script.lock().closes.push((code, reason.to_string()));
        Ok(())
    }
}

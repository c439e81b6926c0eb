//! Stream transport: an ordered, awaitable message channel over one socket.
//!
//! # Structure
//!
//! | Piece | Role |
//! |-------|------|
//! | core sequencer | runs `init` and every socket event handler, one at a time |
//! | send sequencer | serializes frame writes (`send`, `close_send`) |
//! | recv sequencer | serializes buffer pops |
//! | send / recv gates | "ready" or the direction's terminal error |
//! | receive buffer | decoded messages and terminal markers, FIFO |
//! | arrival signal | wakes receivers when the buffer grows |
//!
//! # Ordering
//!
//! Everything the server sent before an end-of-stream or a transport failure
//! is delivered before that end or failure is reported. Terminal markers stay
//! at the head of the buffer, so every later `recv` reports the same outcome.
//! A local [`close`](StreamTransport::close) is not drained: pending and later
//! receives fail at once with "manually closed".

use crate::socket::{EventSink, Socket, SocketEvent, SocketFactory};
use mercury_concurrency::{ArrivalSignal, Gate, Sequencer};
use mercury_core::{Error, Result, EOF_MESSAGE};
use mercury_wire::{decode_text, encode_text, ProtoJson};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

const LOG_TARGET: &str = "mercury::transport";

/// Lifecycle phase of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// `init` not called yet
    Uninitialized,
    /// Socket opening
    Connecting,
    /// Direction usable
    Open,
    /// Local side sent the end-of-stream sentinel
    SendClosed,
    /// Remote side sent the end-of-stream sentinel or closed cleanly
    RecvClosed,
    /// Socket error or unclean close
    Errored,
    /// Closed by the connection ending or by `close`
    Closed,
}

/// Phases of both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phases {
    /// Send direction
    pub send: ConnectionPhase,
    /// Receive direction
    pub recv: ConnectionPhase,
}

enum Inbound<Res> {
    Message(Res),
    DecodeFailed(Error),
    Eof,
    Failed(Error),
}

impl<Res> Inbound<Res> {
    fn is_terminal(&self) -> bool {
        matches!(self, Inbound::Eof | Inbound::Failed(_))
    }
}

struct Inner<Res> {
    id: Uuid,
    url: String,
    factory: Arc<dyn SocketFactory>,
    initialised: AtomicBool,
    phases: Mutex<Phases>,
    socket: Mutex<Option<Arc<dyn Socket>>>,
    send_gate: Gate,
    recv_gate: Gate,
    buffer: Mutex<VecDeque<Inbound<Res>>>,
    arrivals: ArrivalSignal,
    core: Sequencer,
    send_seq: Sequencer,
    recv_seq: Sequencer,
}

/// Bidirectional message channel over one WebSocket.
///
/// `Req` is written with the canonical JSON codec; every inbound text frame
/// other than the `"EOF"` sentinel is decoded as `Res`. Cloning yields another
/// handle to the same connection.
pub struct StreamTransport<Req, Res> {
    inner: Arc<Inner<Res>>,
    _req: PhantomData<fn(Req)>,
}

impl<Req, Res> Clone for StreamTransport<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _req: PhantomData,
        }
    }
}

impl<Req, Res> std::fmt::Debug for StreamTransport<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("id", &self.inner.id)
            .field("url", &self.inner.url)
            .field("phases", &*self.inner.phases.lock())
            .finish()
    }
}

impl<Req, Res> StreamTransport<Req, Res>
where
    Req: ProtoJson,
    Res: ProtoJson + Send + 'static,
{
    /// Create an uninitialised transport for `url`.
    pub fn new(url: impl Into<String>, factory: Arc<dyn SocketFactory>) -> Self {
        let id = Uuid::new_v4();
        let label = id.simple().to_string();
        Self {
            inner: Arc::new(Inner {
                id,
                url: url.into(),
                factory,
                initialised: AtomicBool::new(false),
                phases: Mutex::new(Phases {
                    send: ConnectionPhase::Uninitialized,
                    recv: ConnectionPhase::Uninitialized,
                }),
                socket: Mutex::new(None),
                send_gate: Gate::new(),
                recv_gate: Gate::new(),
                buffer: Mutex::new(VecDeque::new()),
                arrivals: ArrivalSignal::new(),
                core: Sequencer::new(format!("{}/core", label)),
                send_seq: Sequencer::new(format!("{}/send", label)),
                recv_seq: Sequencer::new(format!("{}/recv", label)),
            }),
            _req: PhantomData,
        }
    }

    /// Correlation id used in log lines.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// URL this transport connects to.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Current phase of each direction.
    pub fn phases(&self) -> Phases {
        *self.inner.phases.lock()
    }

    /// Open the socket. May be called once.
    ///
    /// Returns once the connection attempt is under way; `send` and `recv`
    /// wait for the socket to open. A connection that cannot be started fails
    /// both directions with a transport error, which is also returned here.
    pub async fn init(&self) -> Result<()> {
        if self.inner.initialised.swap(true, Ordering::SeqCst) {
            return Err(Error::already_initialized("stream transport"));
        }
        let inner = Arc::clone(&self.inner);
        self.inner.core.run(move || inner.connect()).await
    }

    /// Encode `message` and write it as one text frame.
    pub async fn send(&self, message: &Req) -> Result<()> {
        self.ensure_initialised()?;
        self.inner.send_gate.wait().await?;
        let text = encode_text(message);
        let inner = Arc::clone(&self.inner);
        self.inner
            .send_seq
            .run_async(move || async move {
                // close_send may have been sequenced ahead of us
                inner.send_gate.check()?;
                let socket = inner.socket()?;
                trace!(target: LOG_TARGET, stream = %inner.id, bytes = text.len(), "Sending frame");
                socket.send(text).await
            })
            .await
    }

    /// Write the end-of-stream sentinel and close the send direction.
    pub async fn close_send(&self) -> Result<()> {
        self.ensure_initialised()?;
        self.inner.send_gate.wait().await?;
        let inner = Arc::clone(&self.inner);
        self.inner
            .send_seq
            .run_async(move || async move {
                inner.send_gate.check()?;
                let socket = inner.socket()?;
                socket.send(EOF_MESSAGE.to_string()).await?;
                inner
                    .send_gate
                    .fail(Error::already_closed("closed for sending"));
                inner.phases.lock().send = ConnectionPhase::SendClosed;
                debug!(target: LOG_TARGET, stream = %inner.id, "Send direction closed");
                Ok(())
            })
            .await
    }

    /// Receive the next message.
    ///
    /// Returns `Err(Error::Eof)` once the server has finished and every
    /// message it sent has been received.
    pub async fn recv(&self) -> Result<Res> {
        self.ensure_initialised()?;
        if let Err(e) = self.inner.recv_gate.wait().await {
            if !e.is_drainable() {
                return Err(e);
            }
        }
        loop {
            // Read the generation before looking at the buffer so an arrival
            // between the pop and the wait still wakes us.
            let seen = self.inner.arrivals.generation();
            let inner = Arc::clone(&self.inner);
            match self.inner.recv_seq.run(move || inner.pop_head()).await? {
                Some(message) => return Ok(message),
                None => self.inner.arrivals.wait_after(seen).await?,
            }
        }
    }

    /// Terminate the connection.
    ///
    /// Waits for any queued send, then any queued buffer access, before tearing
    /// down. Afterwards every operation fails with "manually closed".
    pub async fn close(&self, code: u16, reason: &str) -> Result<()> {
        self.ensure_initialised()?;
        if let Err(e) = self.inner.recv_gate.wait().await {
            // A finished stream can still be closed; anything else is reported.
            if !e.is_eof() {
                return Err(e);
            }
        }
        let inner = Arc::clone(&self.inner);
        let reason = reason.to_string();
        self.inner
            .send_seq
            .run_async(move || async move {
                let recv_inner = Arc::clone(&inner);
                inner
                    .recv_seq
                    .run_async(move || async move {
                        let core_inner = Arc::clone(&recv_inner);
                        let socket = recv_inner.core.run(move || core_inner.tear_down()).await?;
                        info!(target: LOG_TARGET, stream = %recv_inner.id, code, reason = %reason, "Closing connection");
                        socket.close(code, &reason).await
                    })
                    .await
            })
            .await
    }

    fn ensure_initialised(&self) -> Result<()> {
        if self.inner.initialised.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::not_initialized("stream transport"))
        }
    }
}

// ============================================================================
// Connection state (runs on the core sequencer)
// ============================================================================

impl<Res> Inner<Res>
where
    Res: ProtoJson + Send + 'static,
{
    fn connect(self: &Arc<Self>) -> Result<()> {
        self.set_phases(ConnectionPhase::Connecting, ConnectionPhase::Connecting);
        debug!(target: LOG_TARGET, stream = %self.id, url = %self.url, "Connecting");

        let (sink, events) = EventSink::channel();
        match self.factory.connect(&self.url, sink) {
            Ok(socket) => {
                *self.socket.lock() = Some(Arc::from(socket));
                tokio::spawn(pump_events(Arc::downgrade(self), events));
                Ok(())
            }
            Err(e) => {
                let error = match e {
                    Error::Transport { .. } => e,
                    other => Error::transport(other.to_string()),
                };
                self.on_failure(error.clone());
                Err(error)
            }
        }
    }

    fn handle(&self, event: SocketEvent) {
        match event {
            SocketEvent::Open => self.on_open(),
            SocketEvent::Message(text) => self.on_message(text),
            SocketEvent::Close {
                code,
                reason,
                clean: true,
            } => self.on_clean_close(code, &reason),
            SocketEvent::Close {
                code,
                reason,
                clean: false,
            } => self.on_failure(Error::transport(format!(
                "connection closed uncleanly (code {}: {})",
                code, reason
            ))),
            SocketEvent::Error(reason) => self.on_failure(Error::transport(reason)),
        }
    }

    fn on_open(&self) {
        let mut phases = self.phases.lock();
        if phases.send != ConnectionPhase::Connecting {
            return;
        }
        *phases = Phases {
            send: ConnectionPhase::Open,
            recv: ConnectionPhase::Open,
        };
        self.send_gate.open();
        self.recv_gate.open();
        info!(target: LOG_TARGET, stream = %self.id, "Connection open");
    }

    fn on_message(&self, text: String) {
        if self.phases.lock().recv == ConnectionPhase::Closed {
            trace!(target: LOG_TARGET, stream = %self.id, "Dropping frame after close");
            return;
        }
        let mut buffer = self.buffer.lock();
        if buffer.back().map_or(false, Inbound::is_terminal) {
            warn!(target: LOG_TARGET, stream = %self.id, "Frame received after end of stream, dropped");
            return;
        }

        if text == EOF_MESSAGE {
            debug!(target: LOG_TARGET, stream = %self.id, "Server finished sending");
            self.recv_gate.fail(Error::Eof);
            self.phases.lock().recv = ConnectionPhase::RecvClosed;
            buffer.push_back(Inbound::Eof);
        } else {
            match decode_text::<Res>(&text) {
                Ok(message) => buffer.push_back(Inbound::Message(message)),
                Err(e) => {
                    warn!(target: LOG_TARGET, stream = %self.id, error = %e, "Undecodable frame");
                    buffer.push_back(Inbound::DecodeFailed(e));
                }
            }
        }
        drop(buffer);
        self.arrivals.notify();
    }

    fn on_clean_close(&self, code: u16, reason: &str) {
        let mut phases = self.phases.lock();
        if matches!(
            phases.recv,
            ConnectionPhase::Closed | ConnectionPhase::Errored
        ) {
            return;
        }
        info!(target: LOG_TARGET, stream = %self.id, code, reason = %reason, "Connection closed by peer");
        self.send_gate
            .fail(Error::already_closed("connection closed"));
        phases.send = ConnectionPhase::Closed;
        phases.recv = ConnectionPhase::RecvClosed;
        drop(phases);

        let mut buffer = self.buffer.lock();
        if !buffer.back().map_or(false, Inbound::is_terminal) {
            self.recv_gate.fail(Error::Eof);
            buffer.push_back(Inbound::Eof);
            drop(buffer);
            self.arrivals.notify();
        }
    }

    fn on_failure(&self, error: Error) {
        let mut phases = self.phases.lock();
        if matches!(
            phases.recv,
            ConnectionPhase::Closed | ConnectionPhase::Errored
        ) {
            return;
        }
        warn!(target: LOG_TARGET, stream = %self.id, error = %error, "Connection failed");
        *phases = Phases {
            send: ConnectionPhase::Errored,
            recv: ConnectionPhase::Errored,
        };
        drop(phases);

        self.send_gate.fail(error.clone());
        self.recv_gate.fail(error.clone());
        let mut buffer = self.buffer.lock();
        if !buffer.back().map_or(false, Inbound::is_terminal) {
            buffer.push_back(Inbound::Failed(error.clone()));
        }
        drop(buffer);
        self.arrivals.notify();
        self.arrivals.fail(error);
    }

    fn tear_down(&self) -> Result<Arc<dyn Socket>> {
        let manual = Error::already_closed("manually closed");
        self.set_phases(ConnectionPhase::Closed, ConnectionPhase::Closed);
        self.send_gate.fail(manual.clone());
        self.recv_gate.fail(manual.clone());
        self.arrivals.fail(manual);
        self.socket
            .lock()
            .take()
            .ok_or_else(|| Error::already_closed("manually closed"))
    }

    /// Pop the head of the receive buffer. Terminal markers are left in place.
    fn pop_head(&self) -> Result<Option<Res>> {
        let mut buffer = self.buffer.lock();
        match buffer.front() {
            None => return Ok(None),
            Some(Inbound::Eof) => return Err(Error::Eof),
            Some(Inbound::Failed(e)) => return Err(e.clone()),
            Some(_) => {}
        }
        match buffer.pop_front() {
            Some(Inbound::Message(message)) => Ok(Some(message)),
            Some(Inbound::DecodeFailed(e)) => Err(e),
            _ => Ok(None),
        }
    }

    fn socket(&self) -> Result<Arc<dyn Socket>> {
        self.socket
            .lock()
            .clone()
            .ok_or_else(|| Error::already_closed("manually closed"))
    }

    fn set_phases(&self, send: ConnectionPhase, recv: ConnectionPhase) {
        *self.phases.lock() = Phases { send, recv };
    }
}

/// Feed socket events into the core sequencer, in arrival order.
async fn pump_events<Res>(weak: Weak<Inner<Res>>, mut events: mpsc::UnboundedReceiver<SocketEvent>)
where
    Res: ProtoJson + Send + 'static,
{
    while let Some(event) = events.recv().await {
        let Some(inner) = weak.upgrade() else {
            break;
        };
        let handler = Arc::clone(&inner);
        let outcome = inner
            .core
            .run(move || {
                handler.handle(event);
                Ok(())
            })
            .await;
        if let Err(e) = outcome {
            warn!(target: LOG_TARGET, stream = %inner.id, error = %e, "Event handler failed");
        }
    }
}

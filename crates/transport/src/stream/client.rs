use crate::transport::StreamTransport;
use mercury_core::{Error, Result};
use mercury_wire::ProtoJson;
use std::sync::atomic::{AtomicBool, Ordering};

/// Client-streaming call: any number of sends, then one response.
#[derive(Debug)]
pub struct ClientStream<Req, Res> {
    transport: StreamTransport<Req, Res>,
    closed: AtomicBool,
}

impl<Req, Res> ClientStream<Req, Res>
where
    Req: ProtoJson,
    Res: ProtoJson + Send + 'static,
{
    /// Wrap an initialised transport.
    pub fn new(transport: StreamTransport<Req, Res>) -> Self {
        Self {
            transport,
            closed: AtomicBool::new(false),
        }
    }

    /// Send one request.
    pub async fn send(&self, request: &Req) -> Result<()> {
        self.ensure_usable()?;
        self.transport.send(request).await
    }

    /// Finish sending and wait for the single response.
    ///
    /// The stream cannot be used afterwards, whatever the outcome.
    pub async fn close_and_recv(&self) -> Result<Res> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(closed_error());
        }
        self.transport.close_send().await?;
        self.transport.recv().await
    }

    /// Abort the call and close the connection.
    pub async fn close_early(&self, code: u16, reason: &str) -> Result<()> {
        self.transport.close(code, reason).await
    }

    /// Underlying transport.
    pub fn transport(&self) -> &StreamTransport<Req, Res> {
        &self.transport
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(closed_error())
        } else {
            Ok(())
        }
    }
}

fn closed_error() -> Error {
    Error::already_closed("cannot use closed client stream")
}

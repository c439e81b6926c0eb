use crate::transport::StreamTransport;
use mercury_core::{Error, Result};
use mercury_wire::ProtoJson;
use parking_lot::Mutex;

/// Server-streaming call: one request, then many responses.
#[derive(Debug)]
pub struct ServerStream<Req, Res> {
    transport: StreamTransport<Req, Res>,
    // Taken by the first `init`
    request: Mutex<Option<Req>>,
}

impl<Req, Res> ServerStream<Req, Res>
where
    Req: ProtoJson + Send,
    Res: ProtoJson + Send + 'static,
{
    /// Wrap an initialised transport; `request` is sent by [`init`](Self::init).
    pub fn new(transport: StreamTransport<Req, Res>, request: Req) -> Self {
        Self {
            transport,
            request: Mutex::new(Some(request)),
        }
    }

    /// Send the initiating request. May be called once.
    pub async fn init(&self) -> Result<()> {
        let request = self
            .request
            .lock()
            .take()
            .ok_or_else(|| Error::already_initialized("server stream"))?;
        self.transport.send(&request).await
    }

    /// Receive the next response; `Err(Error::Eof)` when the server is done.
    pub async fn recv(&self) -> Result<Res> {
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
}

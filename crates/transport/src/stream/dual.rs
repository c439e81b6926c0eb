use crate::transport::StreamTransport;
use mercury_core::Result;
use mercury_wire::ProtoJson;

/// Bidirectional streaming call with unrestricted interleaving.
///
/// Cloning yields another handle to the same call, so sending and receiving
/// can happen on different tasks.
#[derive(Debug)]
pub struct DualStream<Req, Res> {
    transport: StreamTransport<Req, Res>,
}

impl<Req, Res> Clone for DualStream<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<Req, Res> DualStream<Req, Res>
where
    Req: ProtoJson,
    Res: ProtoJson + Send + 'static,
{
    /// Wrap an initialised transport.
    pub fn new(transport: StreamTransport<Req, Res>) -> Self {
        Self { transport }
    }

    /// Send one request.
    pub async fn send(&self, request: &Req) -> Result<()> {
        self.transport.send(request).await
    }

    /// Receive the next response; `Err(Error::Eof)` when the server is done.
    pub async fn recv(&self) -> Result<Res> {
        self.transport.recv().await
    }

    /// Finish sending; responses can still be received.
    pub async fn close_send(&self) -> Result<()> {
        self.transport.close_send().await
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

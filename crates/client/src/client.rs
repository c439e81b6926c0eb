//! RPC client: unary calls over HTTP, streaming calls over WebSockets.

use crate::config::ClientConfig;
use crate::http::{HttpMethod, HttpRequest, HttpTransport, UreqHttpTransport};
use crate::query::encode_query;
use crate::url::build_url;
use mercury_core::{Error, Result};
use mercury_transport::{
    ClientStream, DualStream, ServerStream, SocketFactory, StreamTransport,
    TungsteniteSocketFactory,
};
use mercury_wire::{JsonValue, ProtoJson};
use std::sync::Arc;
use tracing::debug;

const LOG_TARGET: &str = "mercury::client";

/// RPC client for one API base path.
///
/// Service-specific wrappers are expected to sit on top of this, fixing the
/// endpoint names and message types of each method.
///
/// # Example
///
/// ```ignore
/// let client = Client::new(ClientConfig::default());
/// let reply: Reply = client.call("Echo", HttpMethod::Post, &request).await?;
///
/// let feed = client.start_server_stream::<Query, Item>("Feed", query).await?;
/// loop {
///     match feed.recv().await {
///         Ok(item) => handle(item),
///         Err(Error::Eof) => break,
///         Err(e) => return Err(e),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    http: Arc<dyn HttpTransport>,
    sockets: Arc<dyn SocketFactory>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client using `ureq` for unary calls and `tokio-tungstenite` for streams.
    pub fn new(config: ClientConfig) -> Self {
        let http = Arc::new(UreqHttpTransport::new(config.timeout()));
        Self::with_transports(config, http, Arc::new(TungsteniteSocketFactory::new()))
    }

    /// Client with caller-supplied transports.
    pub fn with_transports(
        config: ClientConfig,
        http: Arc<dyn HttpTransport>,
        sockets: Arc<dyn SocketFactory>,
    ) -> Self {
        Self {
            config,
            http,
            sockets,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Close code for aborting a stream without a specific reason.
    pub fn close_code(&self) -> u16 {
        self.config.close_code
    }

    /// URL of `endpoint`, for unary calls or for WebSocket streams.
    pub fn build_url(&self, endpoint: &str, websocket: bool) -> String {
        build_url(&self.config.base_path, endpoint, websocket, self.config.use_tls)
    }

    // ========================================================================
    // Unary
    // ========================================================================

    /// Send a unary request and hand the raw JSON response to `parse`.
    ///
    /// Body-carrying verbs send the encoded request as the body; GET, HEAD and
    /// OPTIONS flatten it into query parameters.
    ///
    /// # Errors
    ///
    /// `Unsupported` for CONNECT and TRACE (before any I/O), otherwise whatever
    /// the HTTP transport or `parse` returns.
    pub async fn send_unary<Req, Res, F>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        request: &Req,
        parse: F,
    ) -> Result<Res>
    where
        Req: ProtoJson,
        F: FnOnce(JsonValue) -> Result<Res>,
    {
        if !method.is_supported() {
            return Err(Error::unsupported(method.as_str()));
        }
        let message = request.to_proto_json();
        let url = self.build_url(endpoint, false);
        let (query, body) = if method.carries_body() {
            (Vec::new(), Some(message))
        } else {
            (encode_query(&message)?, None)
        };
        debug!(target: LOG_TARGET, method = %method, url = %url, "Unary call");

        let response = self
            .http
            .request(HttpRequest {
                method,
                url,
                query,
                body,
            })
            .await?;
        parse(response)
    }

    /// Send a unary request and decode the response with the codec.
    pub async fn call<Req, Res>(&self, endpoint: &str, method: HttpMethod, request: &Req) -> Result<Res>
    where
        Req: ProtoJson,
        Res: ProtoJson,
    {
        self.send_unary(endpoint, method, request, |response| {
            Res::from_proto_json(&response)
        })
        .await
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Open a client-streaming call.
    pub async fn start_client_stream<Req, Res>(&self, endpoint: &str) -> Result<ClientStream<Req, Res>>
    where
        Req: ProtoJson,
        Res: ProtoJson + Send + 'static,
    {
        let transport = self.open_stream(endpoint).await?;
        Ok(ClientStream::new(transport))
    }

    /// Open a server-streaming call and send its initiating request.
    ///
    /// Returns once the request has been written.
    pub async fn start_server_stream<Req, Res>(
        &self,
        endpoint: &str,
        request: Req,
    ) -> Result<ServerStream<Req, Res>>
    where
        Req: ProtoJson + Send,
        Res: ProtoJson + Send + 'static,
    {
        let transport = self.open_stream(endpoint).await?;
        let stream = ServerStream::new(transport, request);
        stream.init().await?;
        Ok(stream)
    }

    /// Open a bidirectional streaming call.
    pub async fn start_dual_stream<Req, Res>(&self, endpoint: &str) -> Result<DualStream<Req, Res>>
    where
        Req: ProtoJson,
        Res: ProtoJson + Send + 'static,
    {
        let transport = self.open_stream(endpoint).await?;
        Ok(DualStream::new(transport))
    }

    async fn open_stream<Req, Res>(&self, endpoint: &str) -> Result<StreamTransport<Req, Res>>
    where
        Req: ProtoJson,
        Res: ProtoJson + Send + 'static,
    {
        let url = self.build_url(endpoint, true);
        let transport = StreamTransport::new(url, Arc::clone(&self.sockets));
        debug!(target: LOG_TARGET, stream = %transport.id(), url = %transport.url(), "Starting stream");
        transport.init().await?;
        Ok(transport)
    }
}

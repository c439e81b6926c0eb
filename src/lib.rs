//! Mercury - RPC over HTTP and WebSockets
//!
//! Mercury lets a client call RPC-style operations on a backend that speaks
//! only HTTP and WebSockets:
//!
//! - **Unary** calls are plain HTTP requests carrying canonical proto3 JSON
//! - **Streaming** calls (client, server, bidirectional) share one WebSocket
//!   per call, one JSON message per text frame, with a literal `EOF` frame
//!   closing each direction
//!
//! # Quick Start
//!
//! ```ignore
//! use mercury::{Client, ClientConfig, Error, HttpMethod};
//!
//! let client = Client::new(ClientConfig::default());
//!
//! // Unary
//! let reply: Reply = client.call("Echo", HttpMethod::Post, &request).await?;
//!
//! // Bidirectional
//! let chat = client.start_dual_stream::<Line, Line>("Chat").await?;
//! chat.send(&line).await?;
//! chat.close_send().await?;
//! while let Ok(line) = chat.recv().await {
//!     println!("{:?}", line);
//! }
//! ```
//!
//! # Architecture
//!
//! | Crate | Provides |
//! |-------|----------|
//! | `mercury-core` | [`Error`], [`Result`], wire constants |
//! | `mercury-concurrency` | [`Sequencer`], [`Gate`], [`ArrivalSignal`] |
//! | `mercury-wire` | the proto3 JSON codec ([`wire`]) |
//! | `mercury-transport` | [`StreamTransport`] and the stream shapes |
//! | `mercury-client` | [`Client`] and [`ClientConfig`] |

pub use mercury_client::{
    build_url, encode_query, Client, ClientConfig, HttpMethod, HttpRequest, HttpTransport,
    UreqHttpTransport, CONFIG_FILE_NAME,
};
pub use mercury_concurrency::{ArrivalSignal, Gate, GateState, Sequencer, SequencerStats};
pub use mercury_core::{Error, Result, CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS, EOF_MESSAGE};
pub use mercury_transport::{
    ClientStream, ConnectionPhase, DualStream, EventSink, Phases, ServerStream, Socket,
    SocketEvent, SocketFactory, StreamTransport, TungsteniteSocketFactory,
};
pub use mercury_wire::{Field, Message, ProtoEnum, ProtoJson};

/// The canonical proto3 JSON codec.
pub mod wire {
    pub use mercury_wire::*;
}

/// Test doubles for the socket and HTTP seams.
pub mod testing {
    pub use mercury_client::testing::RecordingHttpTransport;
    pub use mercury_transport::testing::ScriptedSocketFactory;
}

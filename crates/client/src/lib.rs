//! Mercury RPC client
//!
//! Unary calls ride plain HTTP; streaming calls ride one WebSocket each.
//!
//! - [`Client`]: unary calls and stream starters for one API base path
//! - [`ClientConfig`]: base path, TLS, timeout and close code (`mercury.toml`)
//! - [`HttpTransport`]: unary transport seam, with a `ureq` implementation
//! - [`build_url`] and [`encode_query`]: URL and query-parameter construction
//! - [`testing`]: in-memory HTTP transport for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod http;
pub mod query;
pub mod testing;
pub mod url;

pub use client::Client;
pub use config::{ClientConfig, CONFIG_FILE_NAME};
pub use http::{HttpMethod, HttpRequest, HttpTransport, UreqHttpTransport};
pub use query::encode_query;
pub use url::build_url;

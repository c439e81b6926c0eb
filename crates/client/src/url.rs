//! Endpoint URL construction.

/// Build the URL of `endpoint` under `base_path`.
///
/// | `websocket` | `use_tls` | scheme |
/// |-------------|-----------|--------|
/// | false | true | `https` |
/// | false | false | `http` |
/// | true | true | `wss` |
/// | true | false | `ws` |
pub fn build_url(base_path: &str, endpoint: &str, websocket: bool, use_tls: bool) -> String {
    let scheme = match (websocket, use_tls) {
        (false, true) => "https",
        (false, false) => "http",
        (true, true) => "wss",
        (true, false) => "ws",
    };
    format!("{}://{}/{}", scheme, base_path, endpoint)
}

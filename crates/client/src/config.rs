//! Client configuration via `mercury.toml`
//!
//! Every key is optional; a missing key takes its default.

use mercury_core::{Error, Result, CLOSE_NORMAL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "mercury.toml";

/// Client configuration.
///
/// # Example
///
/// ```toml
/// base_path = "api.example.com/rpc"
/// use_tls = true
/// timeout_ms = 10000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Host and path prefix, without a scheme (e.g. `"localhost/api"`)
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// `https`/`wss` when true, `http`/`ws` when false
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    /// Unary request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Close code used when aborting a stream without an explicit code
    #[serde(default = "default_close_code")]
    pub close_code: u16,
}

fn default_base_path() -> String {
    "localhost/api".to_string()
}

fn default_use_tls() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_close_code() -> u16 {
    CLOSE_NORMAL
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            use_tls: default_use_tls(),
            timeout_ms: default_timeout_ms(),
            close_code: default_close_code(),
        }
    }
}

impl ClientConfig {
    /// Unary request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check values that would only fail later, at request time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty or scheme-qualified `base_path`, a
    /// zero timeout, or a close code an endpoint may not send.
    pub fn validate(&self) -> Result<()> {
        if self.base_path.trim().is_empty() {
            return Err(Error::invalid_input("base_path must not be empty"));
        }
        if self.base_path.contains("://") {
            return Err(Error::invalid_input(format!(
                "base_path '{}' must not include a scheme; set use_tls instead",
                self.base_path
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::invalid_input("timeout_ms must be greater than zero"));
        }
        if !(self.close_code == CLOSE_NORMAL || (3000..=4999).contains(&self.close_code)) {
            return Err(Error::invalid_input(format!(
                "close_code {} is not 1000 or in 3000-4999",
                self.close_code
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Mercury client configuration
#
# Host and path prefix of the API, without a scheme.
base_path = "localhost/api"

# Use https:// and wss:// (true, default) or http:// and ws:// (false).
use_tls = true

# Timeout for unary HTTP calls, in milliseconds (default: 30000).
timeout_ms = 30000

# WebSocket close code sent when a stream is aborted without an explicit
# code (default: 1000). Must be 1000 or in 3000-4999.
close_code = 1000
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_input(format!("Failed to parse client config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_input(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

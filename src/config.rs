//! Configuration for dcpctl
//!
//! Centralized client configuration with sensible defaults.

use std::collections::HashMap;
use std::time::Duration;

use crate::protocol::RequestDefinition;

/// Control port the server listens on
pub const DEFAULT_PORT: u16 = 11730;

/// Connection settings for one device
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Endpoint
    // -------------------------------------------------------------------------
    pub host: String,

    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Reply timeout for commands without their own budget
    pub read_timeout: Duration,

    /// Ceiling applied to every reply timeout
    pub max_read_timeout: Duration,

    /// Reply timeouts by command name, taking precedence over the catalog
    pub command_timeouts: HashMap<String, Duration>,

    // -------------------------------------------------------------------------
    // Correlation
    // -------------------------------------------------------------------------
    /// Reject responses whose request id differs from the one sent
    pub strict_request_id: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            max_read_timeout: Duration::from_secs(3600),
            command_timeouts: HashMap::new(),
            strict_request_id: false,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// `host:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Effective reply timeout for a command.
    ///
    /// Explicit override, then the command's own budget, then the default,
    /// clamped to `max_read_timeout`.
    pub fn timeout_for(&self, definition: &RequestDefinition) -> Duration {
        self.command_timeouts
            .get(&definition.name)
            .copied()
            .or(definition.timeout)
            .unwrap_or(self.read_timeout)
            .min(self.max_read_timeout)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the TCP connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the default reply timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the ceiling for every reply timeout
    pub fn max_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.max_read_timeout = timeout;
        self
    }

    /// Override the reply timeout of one command
    pub fn command_timeout(mut self, name: impl Into<String>, timeout: Duration) -> Self {
        self.config.command_timeouts.insert(name.into(), timeout);
        self
    }

    /// Enable request id verification
    pub fn strict_request_id(mut self, strict: bool) -> Self {
        self.config.strict_request_id = strict;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

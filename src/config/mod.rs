mod test;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// Hub configuration.
///
/// Every field has a default, so an empty TOML file (or no file at all) yields a
/// working hub on `0.0.0.0:8080/ws`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the WebSocket endpoint
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Frames queued per connection before the connection is closed as stalled
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Release room seats held by a connection when its transport closes
    #[serde(default = "default_leave_on_disconnect")]
    pub leave_on_disconnect: bool,

    /// Redirect hint attached to join rejections
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_leave_on_disconnect() -> bool {
    true
}

fn default_redirect_url() -> String {
    "/".to_string()
}

/// Route of the health endpoint served next to the WebSocket endpoint.
pub const HEALTH_PATH: &str = "/health";

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            bind: default_bind(),
            port: default_port(),
            ws_path: default_ws_path(),
            outbound_buffer: default_outbound_buffer(),
            leave_on_disconnect: default_leave_on_disconnect(),
            redirect_url: default_redirect_url(),
        }
    }
}

impl HubConfig {
    /// Reads and validates a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, HubError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, HubError> {
        let config: HubConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HubError> {
        if self.outbound_buffer == 0 {
            return Err(HubError::InvalidConfig(
                "outbound_buffer must be at least 1".to_string(),
            ));
        }
        if !self.ws_path.starts_with('/') {
            return Err(HubError::InvalidConfig(format!(
                "ws_path must start with '/': {}",
                self.ws_path
            )));
        }
        if self.ws_path == HEALTH_PATH {
            return Err(HubError::InvalidConfig(format!(
                "ws_path collides with the health endpoint: {}",
                HEALTH_PATH
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

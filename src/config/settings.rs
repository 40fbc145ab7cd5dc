use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HTTP_PORT: u16 = 8888;

/// Delays and timeouts applied to the serial connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimings {
    /// Pause after opening, while the controller reboots from the DTR toggle
    pub open_settle_ms: u64,
    /// Pause between writing a command and draining its reply
    pub command_settle_ms: u64,
    /// Per-read timeout configured on the port
    pub read_timeout_ms: u64,
}

impl SessionTimings {
    pub fn open_settle(&self) -> Duration {
        Duration::from_millis(self.open_settle_ms)
    }

    pub fn command_settle(&self) -> Duration {
        Duration::from_millis(self.command_settle_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// No waiting at all; used against in-memory links.
    pub fn immediate() -> Self {
        Self {
            open_settle_ms: 0,
            command_settle_ms: 0,
            read_timeout_ms: 10,
        }
    }
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            open_settle_ms: 2000,
            command_settle_ms: 100,
            read_timeout_ms: 1000,
        }
    }
}

/// Runtime settings for the bridge process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub host: String,
    pub http_port: u16,
    /// Device to open at startup; auto-detected when absent
    pub device: Option<String>,
    pub timings: SessionTimings,
}

impl BridgeConfig {
    /// Address handed to the listener; hostnames are resolved at bind time
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            http_port: DEFAULT_HTTP_PORT,
            device: None,
            timings: SessionTimings::default(),
        }
    }
}

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::SessionTimings;
use crate::serial::{self, PortBackend, PortDescriptor, Result, SerialError, SerialInterface};
use super::SessionStatus;

/// The process-wide connection to the robot controller.
///
/// `interface` is the only lock that touches the port: connect, disconnect and
/// each write/settle/drain cycle hold it for their whole duration, so at most
/// one command is on the wire at a time. `connected_port` mirrors the
/// interface state for status queries, which never wait behind a command.
pub struct SerialSession {
    backend: Arc<dyn PortBackend>,
    timings: SessionTimings,
    interface: Mutex<SerialInterface>,
    connected_port: RwLock<Option<String>>,
}

impl SerialSession {
    pub fn new(backend: Arc<dyn PortBackend>, timings: SessionTimings) -> Self {
        Self {
            backend,
            timings,
            interface: Mutex::new(SerialInterface::new()),
            connected_port: RwLock::new(None),
        }
    }

    pub fn list_ports(&self) -> Vec<PortDescriptor> {
        serial::list_ports(self.backend.as_ref())
    }

    /// Open `device`, replacing any current connection
    pub async fn connect(&self, device: &str) -> Result<()> {
        let mut interface = self.interface.lock().await;
        *self.connected_port.write().await = None;

        log::info!("Connecting to {}...", device);
        let result = interface
            .connect(
                self.backend.as_ref(),
                device,
                self.timings.read_timeout(),
                self.timings.open_settle(),
            )
            .await;

        *self.connected_port.write().await = interface.device().map(str::to_string);

        if let Err(ref e) = result {
            log::error!("Error connecting to {}: {}", device, e);
        }
        result
    }

    /// Close the connection. Returns false when nothing was open.
    pub async fn disconnect(&self) -> bool {
        let mut interface = self.interface.lock().await;
        let closed = interface.disconnect();
        *self.connected_port.write().await = None;
        closed
    }

    /// Relay one command line and return the device's reply.
    ///
    /// I/O failures are reported to the caller and the port stays open.
    pub async fn send(&self, command: &str) -> Result<String> {
        if command.is_empty() {
            return Err(SerialError::EmptyCommand);
        }
        if self.connected_port.read().await.is_none() {
            return Err(SerialError::NotConnected);
        }

        // Write and drain block this worker while the lock is held, each read
        // bounded by the port read timeout
        let mut interface = self.interface.lock().await;
        interface
            .send_command(command, self.timings.command_settle())
            .await
            .map_err(|e| {
                log::warn!("Command '{}' failed: {}", command, e);
                e
            })
    }

    pub async fn status(&self) -> SessionStatus {
        let port = self.connected_port.read().await.clone();
        SessionStatus {
            connected: port.is_some(),
            port,
        }
    }
}

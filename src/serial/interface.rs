use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use super::{PortBackend, Result, SerialError};

// The controller sketch listens at this rate; it is not negotiable.
pub const BAUD_RATE: u32 = 115200;

// Upper bound on a single drained response. A device that never stops
// talking would otherwise keep the drain loop spinning.
const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// One open byte stream to the robot controller
pub trait SerialLink: Read + Write + Send {
    /// Number of bytes already buffered by the driver and readable without blocking
    fn bytes_to_read(&self) -> Result<u32>;
}

/// Owner of at most one open serial connection
pub struct SerialInterface {
    link: Option<Box<dyn SerialLink>>,
    device: Option<String>,
}

impl SerialInterface {
    pub fn new() -> Self {
        Self {
            link: None,
            device: None,
        }
    }

    /// Open `device` and wait `settle` for the board to come out of its reset-on-open.
    ///
    /// Any connection already held is closed first. On failure the interface
    /// stays disconnected.
    pub async fn connect(
        &mut self,
        backend: &dyn PortBackend,
        device: &str,
        read_timeout: Duration,
        settle: Duration,
    ) -> Result<()> {
        self.disconnect();

        let link = backend.open(device, BAUD_RATE, read_timeout)?;
        log::debug!("Opened {}, waiting {:?} for controller reset", device, settle);
        tokio::time::sleep(settle).await;

        self.link = Some(link);
        self.device = Some(device.to_string());

        log::info!("Connected to {} at {} baud", device, BAUD_RATE);
        Ok(())
    }

    /// Close the current connection. Returns false if there was none.
    pub fn disconnect(&mut self) -> bool {
        match self.link.take() {
            Some(link) => {
                drop(link);
                if let Some(device) = self.device.take() {
                    log::info!("Disconnected from {}", device);
                }
                true
            }
            None => false,
        }
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Write one command line, wait `settle`, then return whatever the device sent back.
    ///
    /// There is no end-of-response marker in the controller's output, so the
    /// reply is only what arrived inside the settle window. Later bytes stay in
    /// the driver buffer and show up at the front of the next reply.
    pub async fn send_command(&mut self, command: &str, settle: Duration) -> Result<String> {
        let link = self.link.as_mut().ok_or(SerialError::NotConnected)?;

        let line = format!("{}\n", command);
        link.write_all(line.as_bytes())?;
        link.flush()?;
        log::debug!("-> {}", command);

        tokio::time::sleep(settle).await;

        let received = drain(link.as_mut())?;
        let response = String::from_utf8_lossy(&received).into_owned();
        log::debug!("<- {} bytes", received.len());
        Ok(response)
    }
}

impl Default for SerialInterface {
    fn default() -> Self {
        Self::new()
    }
}

/// Read everything the driver currently holds.
fn drain(link: &mut dyn SerialLink) -> Result<Vec<u8>> {
    let mut received = Vec::new();
    let mut buffer = [0u8; 1024];

    while received.len() < MAX_RESPONSE_BYTES {
        let available = link.bytes_to_read()? as usize;
        if available == 0 {
            break;
        }

        let want = available.min(buffer.len());
        match link.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => received.extend_from_slice(&buffer[..n]),
            Err(ref e) if e.kind() == ErrorKind::TimedOut => break,
            Err(e) => return Err(SerialError::IoError(e)),
        }
    }

    Ok(received)
}

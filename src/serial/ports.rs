use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

use super::{PortDescriptor, Result, SerialError, SerialLink};

// Description fragments of the USB-serial bridges the robot has shipped with
const DEVICE_HINTS: [&str; 3] = ["Arduino", "CH340", "USB"];

/// Host side of serial access: what endpoints exist, and opening one
pub trait PortBackend: Send + Sync {
    fn available_ports(&self) -> Result<Vec<PortDescriptor>>;

    fn open(&self, device: &str, baud_rate: u32, read_timeout: Duration)
        -> Result<Box<dyn SerialLink>>;
}

/// The operating system's serial ports, via the `serialport` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl PortBackend for SystemPorts {
    fn available_ports(&self) -> Result<Vec<PortDescriptor>> {
        let ports = serialport::available_ports()?;
        Ok(ports
            .into_iter()
            .map(|port| PortDescriptor::new(port.port_name, describe(&port.port_type)))
            .collect())
    }

    fn open(
        &self,
        device: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Box<dyn SerialLink>> {
        let port = serialport::new(device, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice
                | serialport::ErrorKind::Io(io::ErrorKind::NotFound) => {
                    SerialError::PortNotFound(device.to_string())
                }
                _ => SerialError::ConnectionFailed(format!("{}: {}", device, e)),
            })?;

        Ok(Box::new(NativeLink(port)))
    }
}

struct NativeLink(Box<dyn SerialPort>);

impl Read for NativeLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for NativeLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl SerialLink for NativeLink {
    fn bytes_to_read(&self) -> Result<u32> {
        Ok(self.0.bytes_to_read()?)
    }
}

/// Enumerate serial ports. Enumeration failures read as "no ports".
pub fn list_ports(backend: &dyn PortBackend) -> Vec<PortDescriptor> {
    match backend.available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            log::warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}

/// Human-readable label for a port, in the spirit of what OS device managers show
pub fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .clone()
            .or_else(|| usb.manufacturer.clone())
            .unwrap_or_else(|| format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid)),
        SerialPortType::PciPort => "PCI serial port".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth serial port".to_string(),
        SerialPortType::Unknown => "n/a".to_string(),
    }
}

/// Pick the port most likely to be the robot.
///
/// Prefers the first port whose description names a known USB-serial bridge,
/// and otherwise falls back to the first port listed.
pub fn auto_detect(ports: &[PortDescriptor]) -> Option<&PortDescriptor> {
    ports
        .iter()
        .find(|port| DEVICE_HINTS.iter().any(|hint| port.description.contains(hint)))
        .or_else(|| ports.first())
}

/// Device to open at startup: the one named on the command line, else the auto-detected one
pub fn choose_device(requested: Option<&str>, ports: &[PortDescriptor]) -> Option<String> {
    match requested {
        Some(device) => Some(device.to_string()),
        None => auto_detect(ports).map(|port| port.device.clone()),
    }
}

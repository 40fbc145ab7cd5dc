#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use damson_bridge_lib::config::SessionTimings;
use damson_bridge_lib::serial::{PortBackend, PortDescriptor, Result, SerialError, SerialLink};
use damson_bridge_lib::session::SerialSession;

/// How a stub device reacts to a written line
#[derive(Clone, Copy)]
pub enum Behavior {
    /// Reply with fixed bytes to every line
    Reply(&'static [u8]),
    /// Accept writes, never answer
    Silent,
    /// Every write fails with an I/O error
    BrokenWrite,
}

#[derive(Default)]
pub struct Recorder {
    pub written: Mutex<Vec<String>>,
    pub open_links: AtomicUsize,
    pub opens: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// Baud rate and read timeout of the most recent open
    pub last_open: Mutex<Option<(u32, Duration)>>,
}

impl Recorder {
    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    pub fn last_open(&self) -> Option<(u32, Duration)> {
        *self.last_open.lock().unwrap()
    }
}

/// In-memory stand-in for the host's serial ports
pub struct StubBackend {
    devices: Vec<(PortDescriptor, Behavior)>,
    pub recorder: Arc<Recorder>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            recorder: Arc::new(Recorder::default()),
        }
    }

    pub fn with_device(mut self, device: &str, description: &str, behavior: Behavior) -> Self {
        self.devices.push((PortDescriptor::new(device, description), behavior));
        self
    }
}

impl PortBackend for StubBackend {
    fn available_ports(&self) -> Result<Vec<PortDescriptor>> {
        Ok(self.devices.iter().map(|(port, _)| port.clone()).collect())
    }

    fn open(&self, device: &str, baud_rate: u32, read_timeout: Duration) -> Result<Box<dyn SerialLink>> {
        let behavior = self
            .devices
            .iter()
            .find(|(port, _)| port.device == device)
            .map(|(_, behavior)| *behavior)
            .ok_or_else(|| SerialError::PortNotFound(device.to_string()))?;

        *self.recorder.last_open.lock().unwrap() = Some((baud_rate, read_timeout));
        self.recorder.opens.fetch_add(1, Ordering::SeqCst);
        self.recorder.open_links.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubLink {
            behavior,
            pending: VecDeque::new(),
            in_cycle: Cell::new(false),
            recorder: self.recorder.clone(),
        }))
    }
}

struct StubLink {
    behavior: Behavior,
    pending: VecDeque<u8>,
    in_cycle: Cell<bool>,
    recorder: Arc<Recorder>,
}

impl Read for StubLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for StubLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Behavior::BrokenWrite = self.behavior {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }

        let now = self.recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.in_cycle.set(true);

        self.recorder
            .written
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(buf).into_owned());
        if let Behavior::Reply(reply) = self.behavior {
            self.pending.extend(reply.iter().copied());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialLink for StubLink {
    fn bytes_to_read(&self) -> Result<u32> {
        if self.pending.is_empty() && self.in_cycle.replace(false) {
            self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(self.pending.len() as u32)
    }
}

impl Drop for StubLink {
    fn drop(&mut self) {
        self.recorder.open_links.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A robot on /dev/ttyACM0 that answers "OK\n", plus a silent and a broken port
pub fn stub_backend() -> StubBackend {
    StubBackend::new()
        .with_device("/dev/ttyACM0", "Arduino Mega 2560", Behavior::Reply(b"OK\n"))
        .with_device("/dev/ttyS0", "n/a", Behavior::Silent)
        .with_device("/dev/ttyUSB9", "USB2.0-Serial", Behavior::BrokenWrite)
}

pub fn session_with(backend: StubBackend, timings: SessionTimings) -> (Arc<SerialSession>, Arc<Recorder>) {
    let recorder = backend.recorder.clone();
    let session = Arc::new(SerialSession::new(Arc::new(backend), timings));
    (session, recorder)
}

pub fn stub_session() -> (Arc<SerialSession>, Arc<Recorder>) {
    session_with(stub_backend(), SessionTimings::immediate())
}

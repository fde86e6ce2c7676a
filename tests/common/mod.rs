//! Scripted serial device shared by the integration tests.

#![allow(dead_code)]

use serial_scale::{PollTiming, PortBackend, PortSettings, ScaleLink, ScaleReader, ScaleError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// What the fake scale does and what it has seen
#[derive(Default)]
pub struct DeviceState {
    /// Devices reported by enumeration
    pub ports: Vec<String>,
    /// Bytes the scale answers each command with
    pub reply: Vec<u8>,
    /// Received bytes not yet read
    pub rx: VecDeque<u8>,
    /// Everything written to the scale
    pub written: Vec<u8>,
    /// Links currently open
    pub open_links: usize,
    /// Calls to `bytes_to_read` across all transactions
    pub polls: usize,
    pub fail_open: bool,
    pub fail_write: bool,
    pub opened_with: Option<PortSettings>,
}

#[derive(Clone, Default)]
pub struct Device(Arc<Mutex<DeviceState>>);

impl Device {
    pub fn replying(reply: &[u8]) -> Self {
        let device = Device::default();
        device.state().reply = reply.to_vec();
        device
    }

    pub fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.0.lock().unwrap()
    }

    pub fn reader(&self) -> ScaleReader {
        ScaleReader::with_backend(PortSettings::new("/dev/ttyUSB0"), self.clone())
            .with_timing(fast_timing())
    }
}

/// 5 ms polls, timing out once more than 10 ms have been waited
pub fn fast_timing() -> PollTiming {
    PollTiming {
        wait_interval: Duration::from_millis(5),
        max_wait: Duration::from_millis(10),
    }
}

impl PortBackend for Device {
    fn available_ports(&self) -> serial_scale::Result<Vec<String>> {
        Ok(self.state().ports.clone())
    }

    fn open(&self, settings: &PortSettings) -> serial_scale::Result<Box<dyn ScaleLink>> {
        let mut state = self.state();
        if state.fail_open {
            return Err(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                "No such file or directory",
            )
            .into());
        }
        state.open_links += 1;
        state.opened_with = Some(settings.clone());
        Ok(Box::new(Link(self.clone())))
    }
}

struct Link(Device);

impl ScaleLink for Link {
    fn clear_input(&mut self) -> serial_scale::Result<()> {
        self.0.state().rx.clear();
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> serial_scale::Result<()> {
        let mut state = self.0.state();
        if state.fail_write {
            return Err(ScaleError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Broken pipe",
            )));
        }
        state.written.extend_from_slice(bytes);
        let reply = state.reply.clone();
        state.rx.extend(reply);
        Ok(())
    }

    fn bytes_to_read(&mut self) -> serial_scale::Result<u32> {
        let mut state = self.0.state();
        state.polls += 1;
        Ok(state.rx.len() as u32)
    }

    fn read_byte(&mut self) -> serial_scale::Result<u8> {
        Ok(self.0.state().rx.pop_front().expect("read past buffered bytes"))
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.0.state().open_links -= 1;
    }
}

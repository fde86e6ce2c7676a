//! Read transactions against the scale and the settings they use.

use crate::error::Result;
use crate::port::{PortBackend, ScaleLink, SystemPorts};
use crate::settings;
use crate::types::*;
use log::{debug, info, warn};
use std::thread;
use std::time::Duration;

/// Scale reader: live port settings plus the transaction engine that uses them.
///
/// One instance drives one scale. Callers sharing it between requests are
/// expected to wrap it in a single lock so that a read never observes a
/// half-applied settings update.
pub struct ScaleReader {
    settings: PortSettings,
    timing: PollTiming,
    protocol: ScaleProtocol,
    waited: Duration,
    backend: Box<dyn PortBackend>,
}

impl ScaleReader {
    /// Create a reader for `port_name` on the host's serial devices
    pub fn new(port_name: &str) -> Self {
        Self::with_backend(PortSettings::new(port_name), SystemPorts)
    }

    /// Create a reader over any device backend
    pub fn with_backend(settings: PortSettings, backend: impl PortBackend + 'static) -> Self {
        ScaleReader {
            settings,
            timing: PollTiming::default(),
            protocol: ScaleProtocol::default(),
            waited: Duration::ZERO,
            backend: Box::new(backend),
        }
    }

    /// Replace the port settings wholesale, without validation
    pub fn with_settings(mut self, settings: PortSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the poll interval and max wait
    pub fn with_timing(mut self, timing: PollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Override the read command and end-of-weight marker
    pub fn with_protocol(mut self, protocol: ScaleProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// List attached serial devices
    pub fn list_ports(&self) -> Result<Vec<String>> {
        self.backend.available_ports()
    }

    /// Snapshot of the current settings
    pub fn get_settings(&self) -> PortSettings {
        self.settings.clone()
    }

    /// Validate and apply `update`, returning the rejected fields
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> SettingsErrors {
        settings::apply_update(&mut self.settings, update, self.backend.as_ref())
    }

    /// [`update_settings`](Self::update_settings) plus the resulting settings
    pub fn update_and_get_settings(&mut self, update: &SettingsUpdate) -> SettingsReport {
        let errors = self.update_settings(update);
        SettingsReport {
            errors,
            settings: self.get_settings(),
        }
    }

    /// Wait time accumulated since the last timeout
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Send the read command and wait for a complete weight.
    ///
    /// Transport faults and timeouts come back as [`ReadOutcome`] values.
    /// Only faults that are not the link's, such as undecodable output,
    /// are returned as errors.
    pub fn read(&mut self) -> Result<ReadOutcome> {
        match self.transact() {
            Ok(ReadOutcome::TimedOut) => {
                warn!("No end-of-weight marker within {:?}", self.timing.max_wait);
                Ok(ReadOutcome::TimedOut)
            }
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_transport() => {
                warn!("Scale read on {} failed: {}", self.settings.port, e);
                Ok(ReadOutcome::Fault(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// [`read`](Self::read) rendered as the text sent back to clients
    pub fn read_weight(&mut self) -> Result<String> {
        self.read().map(|outcome| outcome.to_string())
    }

    fn transact(&mut self) -> Result<ReadOutcome> {
        // Closed when dropped, on every return path
        let mut link = self.backend.open(&self.settings)?;
        link.clear_input()?;

        debug!("TX {:02X?}", self.protocol.read_command);
        link.write_all(&self.protocol.read_command)?;

        let mut output = Vec::new();
        loop {
            if self.waited > self.timing.max_wait {
                self.waited = Duration::ZERO;
                // Undecodable output is a fault even without a marker
                std::str::from_utf8(&output)?;
                return Ok(ReadOutcome::TimedOut);
            }
            thread::sleep(self.timing.wait_interval);
            self.waited += self.timing.wait_interval;

            if let Some(weight) = self.drain(link.as_mut(), &mut output)? {
                info!("Read weight {:?} from {}", weight, self.settings.port);
                return Ok(ReadOutcome::Weight(weight));
            }
        }
    }

    /// Consume buffered bytes until the marker; bytes after it stay unread.
    ///
    /// Output is checked as it arrives. Only a multi-byte character still
    /// waiting on its remaining bytes is allowed to be incomplete.
    fn drain(&self, link: &mut dyn ScaleLink, output: &mut Vec<u8>) -> Result<Option<String>> {
        while link.bytes_to_read()? > 0 {
            let byte = link.read_byte()?;
            if byte == self.protocol.end_of_weight {
                debug!("RX {:02X?}", output);
                return Ok(Some(std::str::from_utf8(output)?.to_string()));
            }
            output.push(byte);
            if let Err(e) = std::str::from_utf8(output) {
                if e.error_len().is_some() {
                    debug!("RX {:02X?}", output);
                    return Err(e.into());
                }
            }
        }
        debug!("No marker yet after {:?}", self.waited);
        Ok(None)
    }
}

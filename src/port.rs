//! Serial device access.
//!
//! [`PortBackend`] enumerates and opens devices, [`ScaleLink`] is an open
//! device. [`SystemPorts`] backs both with the `serialport` crate; tests
//! substitute scripted implementations.

use crate::constants::IO_TIMEOUT_MS;
use crate::error::{Result, ScaleError};
use crate::types::{ByteSize, Parity, PortSettings, StopBits};
use log::debug;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

/// An open connection to the scale. Dropping it closes the device.
pub trait ScaleLink {
    /// Discard anything already received
    fn clear_input(&mut self) -> Result<()>;

    /// Write raw bytes to the scale
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Number of received bytes waiting to be read
    fn bytes_to_read(&mut self) -> Result<u32>;

    /// Read a single received byte
    fn read_byte(&mut self) -> Result<u8>;
}

/// Host-level serial device access
pub trait PortBackend: Send {
    /// Identifiers of every serial device currently attached
    fn available_ports(&self) -> Result<Vec<String>>;

    /// Open `settings.port` configured with the rest of `settings`
    fn open(&self, settings: &PortSettings) -> Result<Box<dyn ScaleLink>>;
}

/// Serial devices of the running host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortBackend for SystemPorts {
    fn available_ports(&self) -> Result<Vec<String>> {
        Ok(serialport::available_ports()?
            .into_iter()
            .map(|info| info.port_name)
            .collect())
    }

    fn open(&self, settings: &PortSettings) -> Result<Box<dyn ScaleLink>> {
        debug!("Opening {} with {:?}", settings.port, settings);
        let port = serialport::new(&settings.port, settings.baud_rate)
            .parity(serial_parity(settings.parity)?)
            .stop_bits(serial_stop_bits(settings.stop_bits)?)
            .data_bits(serial_data_bits(settings.byte_size))
            .timeout(Duration::from_millis(IO_TIMEOUT_MS))
            .open()?;
        Ok(Box::new(SerialLink { port }))
    }
}

/// [`ScaleLink`] over an open `serialport` handle
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl ScaleLink for SerialLink {
    fn clear_input(&mut self) -> Result<()> {
        self.port.clear(serialport::ClearBuffer::Input)?;
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn bytes_to_read(&mut self) -> Result<u32> {
        Ok(self.port.bytes_to_read()?)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

fn serial_parity(parity: Parity) -> Result<serialport::Parity> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Mark | Parity::Space => {
            Err(ScaleError::Unsupported(format!("{} parity", parity)))
        }
    }
}

fn serial_stop_bits(stop_bits: StopBits) -> Result<serialport::StopBits> {
    match stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(ScaleError::Unsupported(format!(
            "{} stop bits",
            stop_bits
        ))),
    }
}

fn serial_data_bits(byte_size: ByteSize) -> serialport::DataBits {
    match byte_size {
        ByteSize::Five => serialport::DataBits::Five,
        ByteSize::Six => serialport::DataBits::Six,
        ByteSize::Seven => serialport::DataBits::Seven,
        ByteSize::Eight => serialport::DataBits::Eight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nci_defaults_map_onto_driver_settings() {
        let settings = PortSettings::default();
        assert_eq!(
            serial_parity(settings.parity).unwrap(),
            serialport::Parity::Even
        );
        assert_eq!(
            serial_stop_bits(settings.stop_bits).unwrap(),
            serialport::StopBits::One
        );
        assert_eq!(
            serial_data_bits(settings.byte_size),
            serialport::DataBits::Seven
        );
    }

    #[test]
    fn mark_parity_is_reported_as_unsupported() {
        let err = serial_parity(Parity::Mark).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(
            err.to_string(),
            "mark parity is not supported by this serial driver"
        );
    }

    #[test]
    fn one_and_a_half_stop_bits_are_reported_as_unsupported() {
        let err = serial_stop_bits(StopBits::OnePointFive).unwrap_err();
        assert_eq!(
            err.to_string(),
            "1.5 stop bits is not supported by this serial driver"
        );
    }
}

//! Validation and application of serial settings updates.
//!
//! Each field is validated on its own. A rejected value leaves the current
//! setting untouched and is reported in the returned [`SettingsErrors`];
//! the remaining fields of the same update are still applied.

use crate::port::PortBackend;
use crate::types::*;
use log::{info, warn};

/// Apply every provided field of `update` to `settings`.
///
/// Ports are enumerated through `backend` only when a port is requested.
pub fn apply_update(
    settings: &mut PortSettings,
    update: &SettingsUpdate,
    backend: &dyn PortBackend,
) -> SettingsErrors {
    let mut errors = SettingsErrors::new();

    if let Some(raw) = update.get(SettingField::Port) {
        let available = backend.available_ports().unwrap_or_else(|e| {
            warn!("Port enumeration failed: {}", e);
            Vec::new()
        });
        if let Some(port) = record(&mut errors, SettingField::Port, raw, validate_port(raw, &available)) {
            settings.port = port;
        }
    }

    if let Some(raw) = update.get(SettingField::BaudRate) {
        if let Some(baud_rate) = record(&mut errors, SettingField::BaudRate, raw, parse_baud_rate(raw)) {
            settings.baud_rate = baud_rate;
        }
    }

    if let Some(raw) = update.get(SettingField::Parity) {
        if let Some(parity) = record(&mut errors, SettingField::Parity, raw, parse_parity(raw)) {
            settings.parity = parity;
        }
    }

    if let Some(raw) = update.get(SettingField::StopBits) {
        if let Some(stop_bits) = record(&mut errors, SettingField::StopBits, raw, parse_stop_bits(raw)) {
            settings.stop_bits = stop_bits;
        }
    }

    if let Some(raw) = update.get(SettingField::ByteSize) {
        if let Some(byte_size) = record(&mut errors, SettingField::ByteSize, raw, parse_byte_size(raw)) {
            settings.byte_size = byte_size;
        }
    }

    errors
}

fn record<T: std::fmt::Debug>(
    errors: &mut SettingsErrors,
    field: SettingField,
    raw: &str,
    result: std::result::Result<T, String>,
) -> Option<T> {
    match result {
        Ok(value) => {
            info!("Setting {:?} to {:?}", field, value);
            Some(value)
        }
        Err(error) => {
            warn!("Rejected {:?} value {:?}: {}", field, raw, error);
            errors.insert(
                field,
                FieldError {
                    given_value: raw.to_string(),
                    error,
                },
            );
            None
        }
    }
}

/// Accept `raw` only if it names one of the `available` devices
pub fn validate_port(raw: &str, available: &[String]) -> std::result::Result<String, String> {
    if available.iter().any(|port| port == raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("Invalid port. Detected ports: {}", available.join(", ")))
    }
}

pub fn parse_baud_rate(raw: &str) -> std::result::Result<u32, String> {
    raw.trim()
        .parse()
        .map_err(|_| "Baud rate must be integer".to_string())
}

pub fn parse_parity(raw: &str) -> std::result::Result<Parity, String> {
    Parity::from_name(raw).ok_or_else(|| {
        let options: Vec<String> = Parity::ALL.iter().map(|p| format!("'{}'", p)).collect();
        format!("Parity must be one of the following: {}", options.join(", "))
    })
}

/// Parsed as a float first so that `1.5` is accepted
pub fn parse_stop_bits(raw: &str) -> std::result::Result<StopBits, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(StopBits::from_value)
        .ok_or_else(|| {
            format!(
                "Stop bits must be one of the following: {}",
                join(&StopBits::ALL)
            )
        })
}

pub fn parse_byte_size(raw: &str) -> std::result::Result<ByteSize, String> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(ByteSize::from_bits)
        .ok_or_else(|| {
            format!(
                "Byte size must be one of the following: {}",
                join(&ByteSize::ALL)
            )
        })
}

fn join<T: std::fmt::Display>(options: &[T]) -> String {
    options
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

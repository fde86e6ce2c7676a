//! Serial settings, update requests and read outcomes.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::constants::*;

/// Parity options accepted by the scale settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    pub const ALL: [Parity; 5] = [
        Parity::None,
        Parity::Odd,
        Parity::Even,
        Parity::Mark,
        Parity::Space,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parity::None => "none",
            Parity::Odd => "odd",
            Parity::Even => "even",
            Parity::Mark => "mark",
            Parity::Space => "space",
        }
    }

    /// Case-insensitive lookup by option name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stop bit options; serialized as the number of bits, whole counts as integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "f64")]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl StopBits {
    pub const ALL: [StopBits; 3] = [StopBits::One, StopBits::OnePointFive, StopBits::Two];

    pub fn value(&self) -> f64 {
        match self {
            StopBits::One => 1.0,
            StopBits::OnePointFive => 1.5,
            StopBits::Two => 2.0,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.value() == value)
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopBits::One => f.write_str("1"),
            StopBits::OnePointFive => f.write_str("1.5"),
            StopBits::Two => f.write_str("2"),
        }
    }
}

impl From<StopBits> for f64 {
    fn from(stop_bits: StopBits) -> Self {
        stop_bits.value()
    }
}

impl Serialize for StopBits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StopBits::One => serializer.serialize_u8(1),
            StopBits::OnePointFive => serializer.serialize_f64(1.5),
            StopBits::Two => serializer.serialize_u8(2),
        }
    }
}

impl TryFrom<f64> for StopBits {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("invalid stop bits: {}", value))
    }
}

/// Data bits per character; serialized as the bit count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ByteSize {
    Five,
    Six,
    Seven,
    Eight,
}

impl ByteSize {
    pub const ALL: [ByteSize; 4] = [
        ByteSize::Five,
        ByteSize::Six,
        ByteSize::Seven,
        ByteSize::Eight,
    ];

    pub fn bits(&self) -> u8 {
        match self {
            ByteSize::Five => 5,
            ByteSize::Six => 6,
            ByteSize::Seven => 7,
            ByteSize::Eight => 8,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.bits() == bits)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl From<ByteSize> for u8 {
    fn from(byte_size: ByteSize) -> Self {
        byte_size.bits()
    }
}

impl TryFrom<u8> for ByteSize {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or_else(|| format!("invalid byte size: {}", bits))
    }
}

/// Current configuration of the serial link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSettings {
    pub port: String,
    pub baud_rate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub byte_size: ByteSize,
}

impl PortSettings {
    /// NCI protocol defaults on the given device
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: BAUD_RATE,
            parity: PARITY,
            stop_bits: STOP_BITS,
            byte_size: BYTE_SIZE,
        }
    }
}

impl Default for PortSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

/// Settings field names, as they appear in requests and error maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    Port,
    BaudRate,
    Parity,
    StopBits,
    ByteSize,
}

/// A rejected settings value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub given_value: String,
    pub error: String,
}

/// Per-field errors from a settings update; empty means fully applied
pub type SettingsErrors = BTreeMap<SettingField, FieldError>;

/// Requested settings changes as raw strings.
///
/// Every field is optional and an empty string counts as not provided.
/// Unknown keys are ignored when deserializing from a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub port: Option<String>,
    pub baud_rate: Option<String>,
    pub parity: Option<String>,
    pub stop_bits: Option<String>,
    pub byte_size: Option<String>,
}

impl SettingsUpdate {
    /// Raw value for `field`, or `None` when absent or empty
    pub fn get(&self, field: SettingField) -> Option<&str> {
        let raw = match field {
            SettingField::Port => &self.port,
            SettingField::BaudRate => &self.baud_rate,
            SettingField::Parity => &self.parity,
            SettingField::StopBits => &self.stop_bits,
            SettingField::ByteSize => &self.byte_size,
        };
        raw.as_deref().filter(|value| !value.is_empty())
    }
}

/// Result of an update: errors plus the settings after applying it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsReport {
    pub errors: SettingsErrors,
    pub settings: PortSettings,
}

/// Poll timing for a read transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub wait_interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            wait_interval: Duration::from_millis(WAIT_INTERVAL_MS),
            max_wait: Duration::from_millis(MAX_WAIT_TIME_MS),
        }
    }
}

/// Command framing understood by the scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleProtocol {
    pub read_command: Vec<u8>,
    pub end_of_weight: u8,
}

impl Default for ScaleProtocol {
    fn default() -> Self {
        Self {
            read_command: READ_WEIGHT_COMMAND.to_vec(),
            end_of_weight: END_OF_WEIGHT_MARKER,
        }
    }
}

/// Terminal outcome of one read transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Text received before the end-of-weight marker
    Weight(String),
    /// No marker within the max wait time
    TimedOut,
    /// The port could not be opened or a transfer failed
    Fault(String),
}

impl fmt::Display for ReadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadOutcome::Weight(weight) => f.write_str(weight),
            ReadOutcome::TimedOut => f.write_str(TIMEOUT_MESSAGE),
            ReadOutcome::Fault(details) => write!(f, "Error: {}", details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_serialize_with_plain_values() {
        let json = serde_json::to_value(PortSettings::new("COM3")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "port": "COM3",
                "baud_rate": 9600,
                "parity": "even",
                "stop_bits": 1,
                "byte_size": 7,
            })
        );
    }

    #[test]
    fn stop_bits_serialize_like_the_option_list() {
        let values: Vec<_> = StopBits::ALL
            .iter()
            .map(|s| serde_json::to_string(s).unwrap())
            .collect();
        assert_eq!(values, vec!["1", "1.5", "2"]);

        let settings: PortSettings = serde_json::from_value(serde_json::json!({
            "port": "COM1",
            "baud_rate": 9600,
            "parity": "odd",
            "stop_bits": 2,
            "byte_size": 8,
        }))
        .unwrap();
        assert_eq!(settings.stop_bits, StopBits::Two);
    }

    #[test]
    fn empty_update_values_count_as_absent() {
        let update = SettingsUpdate {
            parity: Some(String::new()),
            byte_size: Some("8".into()),
            ..Default::default()
        };
        assert_eq!(update.get(SettingField::Parity), None);
        assert_eq!(update.get(SettingField::Port), None);
        assert_eq!(update.get(SettingField::ByteSize), Some("8"));
    }

    #[test]
    fn outcome_text() {
        assert_eq!(ReadOutcome::Weight("12.5".into()).to_string(), "12.5");
        assert_eq!(ReadOutcome::TimedOut.to_string(), TIMEOUT_MESSAGE);
        assert_eq!(
            ReadOutcome::Fault("port busy".into()).to_string(),
            "Error: port busy"
        );
    }

    #[test]
    fn stop_bits_reject_unknown_values() {
        assert_eq!(StopBits::from_value(1.5), Some(StopBits::OnePointFive));
        assert!(StopBits::try_from(3.0).is_err());
    }
}

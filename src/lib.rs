//! # Serial Scale
//!
//! A Rust library for reading a serial-port weighing scale and serving it
//! to clients that cannot open serial ports themselves, such as browsers.
//!
//! ## Features
//!
//! - Send the NCI read command and poll for the end-of-weight marker
//! - Bounded wait: a silent scale yields a timeout message, not a hang
//! - Validated serial settings updates with per-field error reporting
//! - Optional HTTP front end (`server` feature, on by default)
//!
//! ## Example
//!
//! ```no_run
//! use serial_scale::{ScaleReader, SettingsUpdate};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scale = ScaleReader::new("/dev/ttyUSB0");
//!     let report = scale.update_and_get_settings(&SettingsUpdate {
//!         baud_rate: Some("19200".into()),
//!         ..Default::default()
//!     });
//!     println!("Errors: {:?}", report.errors);
//!     println!("Weight: {}", scale.read_weight()?);
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod error;
pub mod port;
pub mod scale;
pub mod settings;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

pub use error::{Result, ScaleError};
pub use port::{PortBackend, ScaleLink, SystemPorts};
pub use scale::ScaleReader;
pub use types::*;

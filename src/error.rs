//! Error types for scale operations.

use thiserror::Error;

/// Result type alias for scale operations.
pub type Result<T> = std::result::Result<T, ScaleError>;

/// Error types for scale communication.
#[derive(Error, Debug)]
pub enum ScaleError {
    /// Serial port communication error
    #[error("{0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Setting accepted by validation but not supported by the serial driver
    #[error("{0} is not supported by this serial driver")]
    Unsupported(String),

    /// Scale output was not valid text
    #[error("Scale output is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// Shared scale state was poisoned by a panicking holder
    #[error("Scale state lock poisoned")]
    LockPoisoned,
}

impl ScaleError {
    /// Faults on the link itself, reported to callers as `"Error: ..."`.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScaleError::SerialPort(_) | ScaleError::Io(_) | ScaleError::Unsupported(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_not_a_transport_fault() {
        let err = std::str::from_utf8(&[0xff]).unwrap_err();
        assert!(!ScaleError::from(err).is_transport());
        assert!(!ScaleError::LockPoisoned.is_transport());
    }

    #[test]
    fn serial_errors_display_bare_description() {
        let err = ScaleError::from(serialport::Error::new(
            serialport::ErrorKind::NoDevice,
            "No such file or directory",
        ));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "No such file or directory");
    }
}

//! Unified error type for the ds-led-lib crate.
//!
//! [`DsLedError`] covers the configuration-time error kinds (`InvalidColour`,
//! `InvalidSetting`, `InvalidStatus`, `InvalidConfiguration`) and wraps
//! module-specific errors (`DeviceError`, I/O). `From` impls allow `?` to
//! propagate across module boundaries.

use std::fmt;

use crate::device::DeviceError;

/// Unified error type for ds-led-lib operations.
#[derive(Debug)]
pub enum DsLedError {
    /// Malformed hexadecimal colour text.
    InvalidColour(String),
    /// Brightness or player LED mask out of range.
    InvalidSetting(String),
    /// Status text outside the fixed set.
    InvalidStatus(String),
    /// Missing or malformed configuration section.
    InvalidConfiguration(String),
    /// Standard I/O error (config file read/write).
    Io(std::io::Error),
    /// Controller communication error.
    Device(DeviceError),
}

impl fmt::Display for DsLedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DsLedError::InvalidColour(e) => write!(f, "Invalid colour: {e}"),
            DsLedError::InvalidSetting(e) => write!(f, "Invalid setting: {e}"),
            DsLedError::InvalidStatus(e) => write!(f, "Invalid status: {e}"),
            DsLedError::InvalidConfiguration(e) => write!(f, "Invalid configuration: {e}"),
            DsLedError::Io(e) => write!(f, "I/O error: {e}"),
            DsLedError::Device(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DsLedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DsLedError::Io(e) => Some(e),
            DsLedError::Device(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for DsLedError {
    fn from(e: DeviceError) -> Self {
        DsLedError::Device(e)
    }
}

impl From<std::io::Error> for DsLedError {
    fn from(e: std::io::Error) -> Self {
        DsLedError::Io(e)
    }
}

/// Crate-level Result alias using [`DsLedError`].
pub type Result<T> = std::result::Result<T, DsLedError>;

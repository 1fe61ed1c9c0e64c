//! Error types for SMC and IO registry operations.
//!
//! Status codes are kept as raw `i32` kernel return values; the macOS-only
//! [`crate::io::err_str`] helper renders them as mach error strings for
//! diagnostics. Nothing here is fatal to the hosting process, every failure
//! is a recoverable return value.

use thiserror::Error;

use crate::key::SmcKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No service of the given class exists in the IO registry.
    #[error("no matching {class} service found")]
    ServiceNotFound { class: &'static str },

    /// Locating or opening the SMC connection was rejected.
    #[error("opening the SMC connection failed (status {status:#010x})")]
    ConnectFailed { status: i32 },

    /// The struct exchange with the SMC returned a non-success status.
    #[error("SMC call failed (status {status:#010x})")]
    TransportError { status: i32 },

    /// The key-info query failed, so the key cannot be read or written.
    #[error("key info for {key} is unavailable")]
    KeyInfoUnavailable { key: SmcKey },

    /// The caller-supplied value length differs from the key's declared size.
    #[error("value size mismatch ({expected} bytes declared, {actual} supplied)")]
    SizeMismatch { expected: u32, actual: u32 },

    /// The write exchange itself was rejected.
    #[error("writing key {key} failed (status {status:#010x})")]
    WriteFailed { key: SmcKey, status: i32 },

    /// The IO registry did not accept the property write.
    #[error("setting the registry property failed (status {status:#010x})")]
    PropertySetFailed { status: i32 },

    /// Every mechanism for a charging operation failed.
    #[error("all methods to {operation} failed")]
    AllMethodsFailed { operation: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

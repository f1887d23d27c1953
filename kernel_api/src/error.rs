//! Kernel status codes
//!
//! Every fallible kernel call reports one of four failure classes. The
//! numeric [`StatusType`] form mirrors the classic OSEK status codes and is
//! what the C entry points in `sim_kernel::ffi` return.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by kernel calls
///
/// Calls validate every precondition before mutating state, so an error
/// always means the call had no effect.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelError {
    /// Unknown task, alarm or counter handle
    #[error("Invalid object identifier")]
    InvalidId,

    /// The operation is not available for this object's configuration
    #[error("Operation not supported by this configuration")]
    UnsupportedOperation,

    /// A parameter is outside its legal domain
    #[error("Parameter value out of range")]
    InvalidValue,

    /// The operation is not legal in the object's current state
    #[error("Operation not allowed in current object state")]
    InvalidState,
}

impl KernelError {
    /// Returns the numeric status code for this error
    pub const fn status(self) -> StatusType {
        match self {
            KernelError::InvalidId => StatusType::InvalidId,
            KernelError::UnsupportedOperation => StatusType::UnsupportedOperation,
            KernelError::InvalidValue => StatusType::InvalidValue,
            KernelError::InvalidState => StatusType::InvalidState,
        }
    }
}

/// Numeric status code returned across the C-compatible surface
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    /// Success
    Ok = 0,
    /// See [`KernelError::InvalidId`]
    InvalidId = 1,
    /// See [`KernelError::UnsupportedOperation`]
    UnsupportedOperation = 2,
    /// See [`KernelError::InvalidValue`]
    InvalidValue = 3,
    /// See [`KernelError::InvalidState`]
    InvalidState = 4,
}

impl StatusType {
    /// Returns true for [`StatusType::Ok`]
    pub const fn is_ok(self) -> bool {
        matches!(self, StatusType::Ok)
    }

    /// Converts the status code back into a `Result`
    pub fn into_result(self) -> Result<(), KernelError> {
        match self {
            StatusType::Ok => Ok(()),
            StatusType::InvalidId => Err(KernelError::InvalidId),
            StatusType::UnsupportedOperation => Err(KernelError::UnsupportedOperation),
            StatusType::InvalidValue => Err(KernelError::InvalidValue),
            StatusType::InvalidState => Err(KernelError::InvalidState),
        }
    }
}

impl From<KernelError> for StatusType {
    fn from(err: KernelError) -> Self {
        err.status()
    }
}

impl<T> From<Result<T, KernelError>> for StatusType {
    fn from(result: Result<T, KernelError>) -> Self {
        match result {
            Ok(_) => StatusType::Ok,
            Err(err) => err.status(),
        }
    }
}

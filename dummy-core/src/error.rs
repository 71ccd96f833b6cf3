//! Status codes returned across the function table, plus the Rust-side error type.

use crate::guid::Guid;

/// Raw value of `E_NOINTERFACE`.
pub const E_NOINTERFACE: i32 = 0x8000_4002_u32 as i32;

/// Status codes for the C ABI surface.
///
/// Only `QueryInterface` returns one of these. Every other slot is infallible.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HResult {
    /// Success (`S_OK`).
    Ok = 0,
    /// The requested interface is not supported (`E_NOINTERFACE`).
    NoInterface = E_NOINTERFACE,
}

impl HResult {
    /// Decode a raw status, returning `None` for codes this module never produces.
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            E_NOINTERFACE => Some(Self::NoInterface),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        self as i32
    }
}

/// Errors surfaced to Rust callers of the object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteropError {
    #[error("interface {0} is not supported")]
    NoInterface(Guid),
    #[error("unexpected status {0:#010x}")]
    Status(i32),
    #[error("factory returned a null handle")]
    NullHandle,
}

impl InteropError {
    /// Map a failed query status onto an error for `iid`.
    pub fn from_query_status(iid: Guid, code: i32) -> Self {
        match HResult::from_raw(code) {
            Some(HResult::NoInterface) => Self::NoInterface(iid),
            _ => Self::Status(code),
        }
    }
}

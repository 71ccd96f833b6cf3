//! Diagnostic module for debugging calls across a mixed-runtime boundary.
//!
//! Exports a single C ABI factory, `CreateDummyUnknown`, returning a handle to
//! a reference-counted object with a four-slot function table
//! (`QueryInterface`, `AddRef`, `Release`, `Void`). Queries always fail, the
//! counter is unsynchronised, and objects are never freed.

pub mod bridge;
pub mod capability;
pub mod config;
pub mod core;
pub mod error;
pub mod guid;

pub use bridge::abi::{create_object, CountedObject, CreateDummyUnknown, IDummyVtbl};
pub use bridge::handle::UnknownRef;
pub use capability::{CapabilitySet, NoCapabilities};
pub use crate::core::{InitialCount, RefCounter};
pub use error::{HResult, InteropError};
pub use guid::{Guid, GuidParseError, IID_IDUMMY, IID_IUNKNOWN};

//! Capability lookup consulted by `QueryInterface`.

use std::ffi::c_void;
use std::ptr::NonNull;

use crate::guid::Guid;

/// Set of interface identifiers an object can hand out.
///
/// `this` is the handle of the object being queried. `lookup` returns the
/// interface pointer to give the caller, which must share that object's
/// count (usually `this` itself). The object acquires the extra reference on
/// success.
pub trait CapabilitySet {
    fn lookup(&self, this: NonNull<c_void>, iid: &Guid) -> Option<NonNull<c_void>>;
}

/// The empty set. Every query fails, including for the object's own IID.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapabilities;

impl CapabilitySet for NoCapabilities {
    fn lookup(&self, _this: NonNull<c_void>, _iid: &Guid) -> Option<NonNull<c_void>> {
        None
    }
}

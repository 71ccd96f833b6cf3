//! Owning smart handle for callers on the Rust side of the boundary.
//!
//! Everything goes through the function table, exactly as a foreign caller
//! would, so the handle also works against objects created by another copy
//! of the module.

use std::ffi::c_void;
use std::fmt;
use std::ptr::{self, NonNull};

use crate::bridge::abi::{create_object, IDummyVtbl};
use crate::config;
use crate::core::InitialCount;
use crate::error::{HResult, InteropError};
use crate::guid::Guid;

#[repr(C)]
struct RawUnknown {
    vtbl: *const IDummyVtbl,
}

/// Owns exactly one reference. `Clone` acquires, `Drop` releases.
///
/// Neither `Send` nor `Sync`: the counter on the other side is unsynchronised.
pub struct UnknownRef {
    ptr: NonNull<RawUnknown>,
}

impl UnknownRef {
    /// Create a new object with the process-wide initial count.
    pub fn create() -> Result<Self, InteropError> {
        Self::create_with(config::get().initial_count)
    }

    /// Create a new object starting at `initial`, owning exactly one reference either way.
    pub fn create_with(initial: InitialCount) -> Result<Self, InteropError> {
        let raw = create_object(initial);
        // SAFETY: `create_object` returns a live handle carrying `initial` references.
        match initial {
            InitialCount::One => unsafe { Self::attach(raw) },
            InitialCount::Zero => unsafe { Self::from_borrowed(raw) },
        }
    }

    /// Adopt a reference the caller already owns.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point at an object whose first field is a
    /// pointer to a valid [`IDummyVtbl`], and it must stay alive for as long
    /// as the handle does.
    pub unsafe fn attach(ptr: *mut c_void) -> Result<Self, InteropError> {
        NonNull::new(ptr.cast::<RawUnknown>())
            .map(|ptr| Self { ptr })
            .ok_or(InteropError::NullHandle)
    }

    /// Take a new reference on a borrowed pointer.
    ///
    /// # Safety
    ///
    /// Same requirements as [`UnknownRef::attach`].
    pub unsafe fn from_borrowed(ptr: *mut c_void) -> Result<Self, InteropError> {
        let handle = unsafe { Self::attach(ptr) }?;
        handle.add_ref();
        Ok(handle)
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.ptr.as_ptr().cast()
    }

    /// Give up ownership without releasing.
    pub fn into_raw(self) -> *mut c_void {
        let raw = self.as_raw();
        std::mem::forget(self);
        raw
    }

    /// The object's function table.
    pub fn slots(&self) -> &IDummyVtbl {
        unsafe { &*self.ptr.as_ref().vtbl }
    }

    /// Raw acquire. The extra reference is not tracked by this handle.
    pub fn add_ref(&self) -> u32 {
        unsafe { (self.slots().add_ref)(self.as_raw()) }
    }

    /// Raw release. Must balance an earlier [`UnknownRef::add_ref`].
    pub fn release_ref(&self) -> u32 {
        unsafe { (self.slots().release)(self.as_raw()) }
    }

    pub fn probe(&self) {
        unsafe { (self.slots().void)(self.as_raw()) }
    }

    /// Current count, observed with a balanced acquire/release pair.
    pub fn peek_count(&self) -> u32 {
        self.add_ref();
        self.release_ref()
    }

    /// Ask the object for `iid`. On success the returned pointer carries its own reference.
    pub fn query(&self, iid: &Guid) -> Result<NonNull<c_void>, InteropError> {
        let mut out: *mut c_void = ptr::null_mut();
        let code = unsafe { (self.slots().query_interface)(self.as_raw(), iid, &mut out) };
        match HResult::from_raw(code) {
            Some(HResult::Ok) => NonNull::new(out).ok_or(InteropError::NullHandle),
            _ => Err(InteropError::from_query_status(*iid, code)),
        }
    }
}

impl Clone for UnknownRef {
    fn clone(&self) -> Self {
        self.add_ref();
        Self { ptr: self.ptr }
    }
}

impl Drop for UnknownRef {
    fn drop(&mut self) {
        self.release_ref();
    }
}

impl fmt::Debug for UnknownRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnknownRef").field(&self.ptr).finish()
    }
}

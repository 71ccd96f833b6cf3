//! C ABI exports: the function table and the `CreateDummyUnknown` factory.
//!
//! A handle is a pointer to a [`CountedObject`] whose first field points at a
//! static [`IDummyVtbl`]. Foreign callers only ever dispatch through that table.
//! Slots use `extern "system"`: stdcall on 32-bit Windows, the C convention
//! everywhere else.

use std::ffi::c_void;
use std::ptr::NonNull;

use crate::capability::{CapabilitySet, NoCapabilities};
use crate::config;
use crate::core::{InitialCount, RefCounter};
use crate::error::{HResult, InteropError};
use crate::guid::Guid;

pub type QueryInterfaceFn =
    unsafe extern "system" fn(this: *mut c_void, riid: *const Guid, ppv: *mut *mut c_void) -> i32;
pub type AddRefFn = unsafe extern "system" fn(this: *mut c_void) -> u32;
pub type ReleaseFn = unsafe extern "system" fn(this: *mut c_void) -> u32;
pub type VoidFn = unsafe extern "system" fn(this: *mut c_void);

/// Function table in fixed slot order: query, acquire, release, probe.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IDummyVtbl {
    pub query_interface: QueryInterfaceFn,
    pub add_ref: AddRefFn,
    pub release: ReleaseFn,
    /// Zero-argument, zero-return slot for checking stack cleanup on x86.
    pub void: VoidFn,
}

static DUMMY_VTBL: IDummyVtbl = IDummyVtbl {
    query_interface,
    add_ref,
    release,
    void,
};

/// The object behind every handle. Never freed once handed out.
#[repr(C)]
pub struct CountedObject {
    vtbl: *const IDummyVtbl,
    count: RefCounter,
    capabilities: &'static dyn CapabilitySet,
}

impl CountedObject {
    pub fn new(initial: InitialCount, capabilities: &'static dyn CapabilitySet) -> Self {
        Self {
            vtbl: &DUMMY_VTBL,
            count: RefCounter::new(initial),
            capabilities,
        }
    }

    /// Move onto the heap and leak it as an opaque handle.
    pub fn into_raw(self) -> *mut c_void {
        Box::into_raw(Box::new(self)).cast()
    }

    /// The table foreign callers dispatch through.
    pub fn slots(&self) -> &'static IDummyVtbl {
        unsafe { &*self.vtbl }
    }

    pub fn acquire(&self) -> u32 {
        self.count.acquire()
    }

    pub fn release(&self) -> u32 {
        self.count.release()
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    pub fn probe(&self) {}

    /// Look `iid` up in the capability set, acquiring once on success.
    ///
    /// `self` must live at its handle address (see [`CountedObject::into_raw`])
    /// for a returned self-pointer to be usable.
    pub fn query(&self, iid: &Guid) -> Result<NonNull<c_void>, InteropError> {
        let this = NonNull::from(self).cast::<c_void>();
        match self.capabilities.lookup(this, iid) {
            Some(ptr) => {
                self.count.acquire();
                Ok(ptr)
            }
            None => Err(InteropError::NoInterface(*iid)),
        }
    }

    /// # Safety
    ///
    /// `this` must be a handle produced by [`CountedObject::into_raw`].
    unsafe fn from_this<'a>(this: *mut c_void) -> &'a Self {
        unsafe { &*this.cast::<Self>() }
    }
}

unsafe extern "system" fn query_interface(
    this: *mut c_void,
    riid: *const Guid,
    ppv: *mut *mut c_void,
) -> i32 {
    if riid.is_null() || ppv.is_null() {
        return HResult::NoInterface.raw();
    }
    let object = unsafe { CountedObject::from_this(this) };
    let iid = unsafe { &*riid };
    match object.query(iid) {
        Ok(ptr) => {
            unsafe { *ppv = ptr.as_ptr() };
            HResult::Ok.raw()
        }
        Err(e) => {
            tracing::debug!("QueryInterface: {e}");
            HResult::NoInterface.raw()
        }
    }
}

unsafe extern "system" fn add_ref(this: *mut c_void) -> u32 {
    unsafe { CountedObject::from_this(this) }.acquire()
}

unsafe extern "system" fn release(this: *mut c_void) -> u32 {
    unsafe { CountedObject::from_this(this) }.release()
}

unsafe extern "system" fn void(this: *mut c_void) {
    unsafe { CountedObject::from_this(this) }.probe()
}

/// Allocate an object with the given initial count and leak it as a handle.
pub fn create_object(initial: InitialCount) -> *mut c_void {
    let raw = CountedObject::new(initial, &NoCapabilities).into_raw();
    tracing::debug!("created handle {raw:p}, initial count {initial}");
    raw
}

/// Create a dummy object and return an opaque handle to it.
///
/// The handle is never null. Its initial count follows [`config::get`]
/// (1 unless `DUMMY_INITIAL_REFCOUNT=0`). The object is never freed;
/// releasing to zero leaves it valid.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "C" fn CreateDummyUnknown() -> *mut c_void {
    create_object(config::get().initial_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::{IID_IDUMMY, IID_IUNKNOWN};
    use std::mem::{offset_of, size_of};

    fn vtbl_of(raw: *mut c_void) -> IDummyVtbl {
        unsafe { **raw.cast::<*const IDummyVtbl>() }
    }

    #[test]
    fn test_table_layout() {
        assert_eq!(size_of::<IDummyVtbl>(), 4 * size_of::<usize>());
        assert_eq!(offset_of!(IDummyVtbl, query_interface), 0);
        assert_eq!(offset_of!(IDummyVtbl, add_ref), size_of::<usize>());
        assert_eq!(offset_of!(IDummyVtbl, release), 2 * size_of::<usize>());
        assert_eq!(offset_of!(IDummyVtbl, void), 3 * size_of::<usize>());
        assert_eq!(offset_of!(CountedObject, vtbl), 0);
    }

    #[test]
    fn test_objects_share_one_table() {
        let a = CountedObject::new(InitialCount::One, &NoCapabilities);
        let b = CountedObject::new(InitialCount::Zero, &NoCapabilities);
        assert!(std::ptr::eq(a.slots(), b.slots()));
        assert!(std::ptr::eq(a.slots(), &DUMMY_VTBL));
    }

    #[test]
    fn test_factory_non_null() {
        let raw = CreateDummyUnknown();
        assert!(!raw.is_null());
        let object = unsafe { CountedObject::from_this(raw) };
        assert_eq!(object.count(), config::get().initial_count.value());
    }

    #[test]
    fn test_each_call_yields_distinct_object() {
        assert_ne!(CreateDummyUnknown(), CreateDummyUnknown());
    }

    #[test]
    fn test_slots_drive_counter() {
        let raw = CountedObject::new(InitialCount::One, &NoCapabilities).into_raw();
        let vtbl = vtbl_of(raw);
        unsafe {
            assert_eq!((vtbl.add_ref)(raw), 2);
            assert_eq!((vtbl.add_ref)(raw), 3);
            assert_eq!((vtbl.release)(raw), 2);
            assert_eq!((vtbl.release)(raw), 1);
            (vtbl.void)(raw);
            assert_eq!((vtbl.add_ref)(raw), 2);
            assert_eq!((vtbl.release)(raw), 1);
        }
    }

    #[test]
    fn test_zero_variant_starts_at_zero() {
        let raw = CountedObject::new(InitialCount::Zero, &NoCapabilities).into_raw();
        let vtbl = vtbl_of(raw);
        unsafe {
            assert_eq!((vtbl.add_ref)(raw), 1);
            assert_eq!((vtbl.release)(raw), 0);
        }
    }

    #[test]
    fn test_query_always_fails_without_side_effects() {
        let raw = CountedObject::new(InitialCount::One, &NoCapabilities).into_raw();
        let vtbl = vtbl_of(raw);
        let sentinel = 0xDEAD_usize as *mut c_void;
        for iid in [IID_IUNKNOWN, IID_IDUMMY, Guid::from_u128(1)] {
            let mut out = sentinel;
            let code = unsafe { (vtbl.query_interface)(raw, &iid, &mut out) };
            assert_eq!(code, HResult::NoInterface.raw());
            assert_eq!(out, sentinel);
        }
        let object = unsafe { CountedObject::from_this(raw) };
        assert_eq!(object.count(), 1);
    }

    #[test]
    fn test_query_null_arguments() {
        let raw = CountedObject::new(InitialCount::One, &NoCapabilities).into_raw();
        let vtbl = vtbl_of(raw);
        let mut out = std::ptr::null_mut();
        let code = unsafe { (vtbl.query_interface)(raw, std::ptr::null(), &mut out) };
        assert_eq!(code, HResult::NoInterface.raw());
        let code = unsafe { (vtbl.query_interface)(raw, &IID_IUNKNOWN, std::ptr::null_mut()) };
        assert_eq!(code, HResult::NoInterface.raw());
    }

    /// Hands out the queried object itself for `IID_IDUMMY`.
    struct SelfOnly;

    impl CapabilitySet for SelfOnly {
        fn lookup(&self, this: NonNull<c_void>, iid: &Guid) -> Option<NonNull<c_void>> {
            (*iid == IID_IDUMMY).then_some(this)
        }
    }

    #[test]
    fn test_successful_lookup_acquires() {
        let raw = CountedObject::new(InitialCount::One, &SelfOnly).into_raw();
        let object = unsafe { CountedObject::from_this(raw) };
        assert!(object.query(&IID_IUNKNOWN).is_err());
        assert_eq!(object.count(), 1);
        assert_eq!(object.query(&IID_IDUMMY).unwrap().as_ptr(), raw);
        assert_eq!(object.count(), 2);
    }

    #[test]
    fn test_query_slot_success_writes_self() {
        let raw = CountedObject::new(InitialCount::One, &SelfOnly).into_raw();
        let vtbl = vtbl_of(raw);
        let mut out: *mut c_void = std::ptr::null_mut();
        let code = unsafe { (vtbl.query_interface)(raw, &IID_IDUMMY, &mut out) };
        assert_eq!(code, HResult::Ok.raw());
        assert_eq!(out, raw);

        let object = unsafe { CountedObject::from_this(raw) };
        assert_eq!(object.count(), 2);
        // The returned pointer owns the extra reference.
        assert_eq!(unsafe { (vtbl.release)(out) }, 1);
    }

    #[test]
    fn test_create_object_uses_given_count() {
        for initial in [InitialCount::Zero, InitialCount::One] {
            let raw = create_object(initial);
            let object = unsafe { CountedObject::from_this(raw) };
            assert_eq!(object.count(), initial.value());
        }
    }
}

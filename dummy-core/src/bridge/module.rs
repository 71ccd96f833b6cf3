//! Loader notifications. Process and thread attach/detach are all
//! acknowledged and ignored.

/// Handle a loader notification. Always succeeds, even for unknown reasons.
///
/// Runs under the loader lock on Windows, so it must not log, allocate or load anything.
pub fn on_notification(_reason: u32) -> bool {
    true
}

/// Windows DLL entry point.
#[cfg(windows)]
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllMain(
    _module: *mut std::ffi::c_void,
    reason: u32,
    _reserved: *mut std::ffi::c_void,
) -> i32 {
    i32::from(on_notification(reason))
}

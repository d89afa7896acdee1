//! FFI bindings for Synheart Gaze
//!
//! C-compatible functions for driving a [`GazeProcessor`] from a host UI.
//! Strings are null-terminated UTF-8. Every returned string is newly allocated
//! and must be released with `gaze_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::GazeConfig;
use crate::error::GazeError;
use crate::pipeline::GazeProcessor;
use crate::schema::LayoutFile;
use crate::types::{BoundsUpdate, RawSample, SampleOutcome};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn json_to_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&GazeError::EncodingError(e.to_string()).to_string());
            ptr::null_mut()
        }
    }
}

fn build_processor(config_json: Option<String>, layout_json: &str) -> Result<GazeProcessor, GazeError> {
    let config = match config_json {
        Some(json) => GazeConfig::from_json(&json)?,
        None => GazeConfig::default(),
    };
    let layout = LayoutFile::from_json(layout_json)?;
    let mut processor = GazeProcessor::new(config, layout.regions)?;
    processor.set_viewport(layout.viewport.width, layout.viewport.height);
    Ok(processor)
}

// ============================================================================
// Processor Lifecycle
// ============================================================================

/// Opaque handle to a GazeProcessor
pub struct GazeProcessorHandle {
    processor: GazeProcessor,
}

/// Create a processor from a config and a layout.
///
/// # Safety
/// - `config_json` may be NULL, in which case defaults are used.
/// - `layout_json` must be a valid null-terminated C string.
/// - The returned handle must be freed with `gaze_processor_free`.
/// - Returns NULL on error; call `gaze_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_new(
    config_json: *const c_char,
    layout_json: *const c_char,
) -> *mut GazeProcessorHandle {
    clear_last_error();

    let config_str = if config_json.is_null() {
        None
    } else {
        match cstr_to_string(config_json) {
            Some(s) => Some(s),
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        }
    };

    let layout_str = match cstr_to_string(layout_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid layout string pointer");
            return ptr::null_mut();
        }
    };

    match build_processor(config_str, &layout_str) {
        Ok(processor) => Box::into_raw(Box::new(GazeProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a pointer returned by `gaze_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_free(processor: *mut GazeProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Feed one provider prediction.
///
/// Returns 1 if accepted, 0 if dropped as an outlier, 2 if tracking is
/// disabled and -1 on a NULL handle.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gaze_processor_new`.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_push_sample(
    processor: *mut GazeProcessorHandle,
    x: f64,
    y: f64,
    t: f64,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;
    match handle.processor.on_sample(RawSample::new(x, y, t)) {
        SampleOutcome::Accepted(_) => 1,
        SampleOutcome::Rejected => 0,
        SampleOutcome::Ignored => 2,
    }
}

/// Replace region bounds from a JSON array of `{"id": .., "bounds": {..}}`.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gaze_processor_new`.
/// - `bounds_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error (bounds are left unchanged).
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_refresh_bounds(
    processor: *mut GazeProcessorHandle,
    bounds_json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(bounds_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid bounds string pointer");
            return -1;
        }
    };

    let result = serde_json::from_str::<Vec<BoundsUpdate>>(&json_str)
        .map_err(GazeError::from)
        .and_then(|updates| handle.processor.refresh_bounds(&updates));

    match result {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Add manually awarded points to the score.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gaze_processor_new`.
/// - Returns 0 if applied, 1 if ignored (negative or non-finite), -1 on a NULL handle.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_add_score(
    processor: *mut GazeProcessorHandle,
    points: f64,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;
    if handle.processor.add_manual_score(points) {
        0
    } else {
        1
    }
}

/// Enable (non-zero) or disable (zero) gaze tracking.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gaze_processor_new`.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_set_tracking(
    processor: *mut GazeProcessorHandle,
    enabled: i32,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;
    handle.processor.set_tracking_enabled(enabled != 0);
    0
}

// ============================================================================
// Outputs
// ============================================================================

/// Advance one tick and return the tick report as JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gaze_processor_new`.
/// - Returns a newly allocated string that must be freed with `gaze_free_string`.
/// - Returns NULL on error; call `gaze_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_tick(processor: *mut GazeProcessorHandle) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;
    let report = handle.processor.tick();
    json_to_cstr(&report)
}

/// Current attention snapshot as JSON, without advancing time.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `gaze_processor_new`.
/// - Returns a newly allocated string that must be freed with `gaze_free_string`.
/// - Returns NULL on error; call `gaze_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn gaze_processor_snapshot(
    processor: *mut GazeProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    json_to_cstr(&handle.processor.snapshot())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Gaze functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Gaze function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn gaze_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next Gaze function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn gaze_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn gaze_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

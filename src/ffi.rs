//! FFI bindings for headmotion
//!
//! This module provides C-compatible functions for driving a motion session from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `hm_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::MotionError;
use crate::orientation::quaternion_to_euler;
use crate::pipeline::{MotionSession, SessionOptions};
use crate::schema::StreamEvent;
use crate::sink::render_row;
use crate::types::{FieldValue, OutputRow, Quaternion};
use crate::units::convert;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Render a session result as a row string, recording errors
fn row_result_to_cstr(result: Result<OutputRow, MotionError>) -> *mut c_char {
    match result {
        Ok(row) => string_to_cstr(&render_row(&row)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Session API
// ============================================================================

/// Opaque handle to a MotionSession
pub struct HmSessionHandle {
    session: MotionSession,
}

/// Create a new session on the default motion stream.
///
/// # Safety
/// - Returns a pointer to a newly allocated session.
/// - Must be freed with `hm_session_free`.
/// - A non-zero `append_euler` appends roll/pitch/yaw to quaternion frames.
#[no_mangle]
pub unsafe extern "C" fn hm_session_new(append_euler: i32) -> *mut HmSessionHandle {
    clear_last_error();

    let options = SessionOptions {
        append_euler: append_euler != 0,
        ..SessionOptions::default()
    };
    let handle = Box::new(HmSessionHandle {
        session: MotionSession::with_options(options),
    });
    Box::into_raw(handle)
}

/// Free a session.
///
/// # Safety
/// - `session` must be a valid pointer returned by `hm_session_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hm_session_free(session: *mut HmSessionHandle) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Declare the stream header and return the rendered header row.
///
/// # Safety
/// - `session` must be a valid pointer returned by `hm_session_new`.
/// - `columns_json` must be a null-terminated JSON array of column names.
/// - Returns a newly allocated string that must be freed with `hm_free_string`.
/// - Returns NULL on error; call `hm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hm_session_on_header(
    session: *mut HmSessionHandle,
    columns_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &mut *session;

    let json_str = match cstr_to_string(columns_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid columns string pointer");
            return ptr::null_mut();
        }
    };

    let result = serde_json::from_str::<Vec<String>>(&json_str)
        .map_err(MotionError::from)
        .and_then(|columns| handle.session.on_header(&columns));
    row_result_to_cstr(result)
}

/// Process one frame and return the rendered output row.
///
/// # Safety
/// - `session` must be a valid pointer returned by `hm_session_new`.
/// - `values_json` must be a null-terminated JSON array of numbers/strings.
/// - Returns a newly allocated string that must be freed with `hm_free_string`.
/// - Returns NULL on error; call `hm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hm_session_on_frame(
    session: *mut HmSessionHandle,
    values_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &mut *session;

    let json_str = match cstr_to_string(values_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid values string pointer");
            return ptr::null_mut();
        }
    };

    let result = serde_json::from_str::<Vec<FieldValue>>(&json_str)
        .map_err(MotionError::from)
        .and_then(|values| handle.session.on_frame(values));
    row_result_to_cstr(result)
}

/// Process one JSON-encoded stream event and return the rendered row.
///
/// # Safety
/// - `session` must be a valid pointer returned by `hm_session_new`.
/// - `event_json` must be a null-terminated JSON stream event.
/// - Returns a newly allocated string that must be freed with `hm_free_string`.
/// - Returns NULL on error, including events for another stream.
#[no_mangle]
pub unsafe extern "C" fn hm_session_process_event(
    session: *mut HmSessionHandle,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &mut *session;

    let json_str = match cstr_to_string(event_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid event string pointer");
            return ptr::null_mut();
        }
    };

    let result = serde_json::from_str::<StreamEvent>(&json_str)
        .map_err(MotionError::from)
        .and_then(|event| handle.session.handle_event(event));
    row_result_to_cstr(result)
}

/// Get the session summary as JSON.
///
/// # Safety
/// - `session` must be a valid pointer returned by `hm_session_new`.
/// - Returns a newly allocated string that must be freed with `hm_free_string`.
/// - Returns NULL on error; call `hm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn hm_session_summary(session: *mut HmSessionHandle) -> *mut c_char {
    clear_last_error();

    if session.is_null() {
        set_last_error("Null session pointer");
        return ptr::null_mut();
    }
    let handle = &*session;

    match serde_json::to_string(&handle.session.summary()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Euler angles in radians
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HmEulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Convert a quaternion (w, x, y, z) to roll/pitch/yaw in radians.
#[no_mangle]
pub extern "C" fn hm_quaternion_to_euler(w: f64, x: f64, y: f64, z: f64) -> HmEulerAngles {
    let angles = quaternion_to_euler(&Quaternion::new(w, x, y, z));
    HmEulerAngles {
        roll: angles.roll,
        pitch: angles.pitch,
        yaw: angles.yaw,
    }
}

/// Convert a raw ADC code into a signed physical range of `max_scale`.
#[no_mangle]
pub extern "C" fn hm_convert(raw: f64, max_scale: f64) -> f64 {
    convert(raw, max_scale)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by headmotion functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a headmotion function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn hm_free_string(ptr: *mut c_char) {
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
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next headmotion call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn hm_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the headmotion library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn hm_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        hm_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_session_lifecycle() {
        unsafe {
            let session = hm_session_new(0);
            assert!(!session.is_null());

            let columns = CString::new(r#"["GYROX","GYROY","GYROZ"]"#).unwrap();
            let header = take_string(hm_session_on_header(session, columns.as_ptr()));
            assert_eq!(
                header,
                "Timestamp, GYROX, GYROY, GYROZ, Action1, Action2, Action3, Action4\n"
            );

            let values = CString::new("[2.5, 8192, 7782.4, 8683.52]").unwrap();
            let row = take_string(hm_session_on_frame(session, values.as_ptr()));
            assert_eq!(row, "2.5, 8192, 7782.4, 8683.52, 0, 1, 0, 1\n");

            let event = CString::new(
                r#"{"event":"frame","stream":"mot","values":[3.0, 8192, 8192, 8192]}"#,
            )
            .unwrap();
            let row = take_string(hm_session_process_event(session, event.as_ptr()));
            assert!(row.starts_with("3, 8192"));

            let summary = take_string(hm_session_summary(session));
            let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
            assert_eq!(json["frames_processed"], 2);
            assert_eq!(json["producer"], crate::PRODUCER_NAME);

            hm_session_free(session);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let session = hm_session_new(0);

            let values = CString::new("[1, 2, 3]").unwrap();
            let result = hm_session_on_frame(session, values.as_ptr());
            assert!(result.is_null());

            let error = hm_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("header"));

            let bad = CString::new("not json").unwrap();
            assert!(hm_session_on_header(session, bad.as_ptr()).is_null());
            assert!(!hm_last_error().is_null());

            assert!(hm_session_on_header(ptr::null_mut(), bad.as_ptr()).is_null());

            hm_session_free(session);
        }
    }

    #[test]
    fn test_ffi_quaternion_to_euler() {
        let angles = hm_quaternion_to_euler(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        assert!((angles.yaw - FRAC_PI_2).abs() < 1e-9);
        assert!(angles.roll.abs() < 1e-9);
    }

    #[test]
    fn test_ffi_convert() {
        assert_eq!(hm_convert(0.0, 500.0), -500.0);
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = hm_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}

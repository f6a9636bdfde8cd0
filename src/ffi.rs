//! FFI bindings for Riskfactor Flux
//!
//! This module provides C-compatible functions for calling the pipeline from a
//! dashboard front end written in another language. All functions use C
//! strings (null-terminated) and return allocated memory that must be freed by
//! the caller using `riskflux_free_string`.
//!
//! Pipeline failures are reported inside the returned envelope
//! (`{"success": false, "error": ...}`); NULL is only returned when an argument
//! pointer is invalid or the result cannot be represented as a C string.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::{records_json, run_json};

// Thread-local storage for the last error message
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
        Err(_) => {
            set_last_error("Result contains an interior NUL byte");
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Pipeline API
// ============================================================================

/// Run the dashboard pipeline and return the response envelope as JSON.
///
/// # Safety
/// - `table_json` must be a valid null-terminated C string holding
///   `{"headers": [...], "rows": [[...], ...]}`.
/// - `filter_json` may be NULL (no filter) or a valid null-terminated C string
///   holding a camelCase filter object.
/// - Returns a newly allocated string that must be freed with `riskflux_free_string`.
/// - Returns NULL on invalid pointers; call `riskflux_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn riskflux_run(
    table_json: *const c_char,
    filter_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let table = match cstr_to_string(table_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid table string pointer");
            return ptr::null_mut();
        }
    };

    let filter = if filter_json.is_null() {
        None
    } else {
        match cstr_to_string(filter_json) {
            Some(s) => Some(s),
            None => {
                set_last_error("Invalid filter string pointer");
                return ptr::null_mut();
            }
        }
    };

    match run_json(&table, filter.as_deref()) {
        Ok(envelope) => string_to_cstr(&envelope),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Normalize a table and return the records envelope as JSON.
///
/// # Safety
/// - `table_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `riskflux_free_string`.
/// - Returns NULL on invalid pointers; call `riskflux_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn riskflux_records(table_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let table = match cstr_to_string(table_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid table string pointer");
            return ptr::null_mut();
        }
    };

    match records_json(&table) {
        Ok(envelope) => string_to_cstr(&envelope),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Riskfactor Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Riskfactor Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn riskflux_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Riskfactor Flux call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn riskflux_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn riskflux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> CString {
        CString::new(
            r#"{
                "headers": ["Age", "STDs", "Schiller", "Smokes", "Smokes (years)"],
                "rows": [[25, 1, 1, 1, 2], [45, 0, 0, 0, "?"]]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_run_without_filter() {
        let table = sample_table();

        unsafe {
            let result = riskflux_run(table.as_ptr(), ptr::null());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["success"], true);
            assert_eq!(value["metrics"]["totalRecords"], 2);

            riskflux_free_string(result);
        }
    }

    #[test]
    fn test_ffi_run_with_filter() {
        let table = sample_table();
        let filter = CString::new(r#"{"smoking": 0}"#).unwrap();

        unsafe {
            let result = riskflux_run(table.as_ptr(), filter.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["metrics"]["totalRecords"], 1);
            assert_eq!(value["chartData"]["lineChart"].as_array().unwrap().len(), 1);

            riskflux_free_string(result);
        }
    }

    #[test]
    fn test_ffi_pipeline_error_is_in_envelope() {
        let bad = CString::new("not json").unwrap();

        unsafe {
            let result = riskflux_run(bad.as_ptr(), ptr::null());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"success\":false"));
            assert!(riskflux_last_error().is_null());

            riskflux_free_string(result);
        }
    }

    #[test]
    fn test_ffi_null_pointer() {
        unsafe {
            let result = riskflux_run(ptr::null(), ptr::null());
            assert!(result.is_null());

            let error = riskflux_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_records() {
        let table = sample_table();

        unsafe {
            let result = riskflux_records(table.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["data"].as_array().unwrap().len(), 2);

            riskflux_free_string(result);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = riskflux_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}

//! C-ABI wrapper around `habit-core`.
//!
//! # Overview
//! Exposes the habit API client through `extern "C"` functions so any
//! language with a C FFI can build and parse HTTP requests/responses without
//! linking to serde or an HTTP stack directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-intent `build_*` / `parse_*` mirrors the core API 1:1, including
//!   the records intent.
//! - A single `FfiHabitResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `habit_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use habit_core::http::HttpResponse;
use habit_core::types::CreateHabit;
use habit_core::{ApiError, HabitClient};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `HabitClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `habit_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn habit_client_new(base_url: *const c_char) -> *mut FfiHabitClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { CStr::from_ptr(base_url) }.to_str().unwrap_or("");
        let client = HabitClient::new(url);
        Box::into_raw(Box::new(FfiHabitClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `HabitClient` created by `habit_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn habit_client_free(client: *mut FfiHabitClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `build` against a non-null client, returning null otherwise.
fn build_with(
    client: *const FfiHabitClient,
    build: impl FnOnce(&HabitClient) -> Option<habit_core::HttpRequest>,
) -> *mut FfiHttpRequest {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Some(req) => FfiHttpRequest::from_core(req),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for listing all habits.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `habit_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn habit_build_list_habits(client: *const FfiHabitClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_list_habits()))
}

/// Build an HTTP request for creating a habit.
///
/// `frequency` is an `FfiFrequency` value (0 = daily, 1 = weekly).
/// Returns null if `client` or `name` is null, `name` is not UTF-8, or
/// `frequency` is out of range.
#[unsafe(no_mangle)]
pub extern "C" fn habit_build_create_habit(
    client: *const FfiHabitClient,
    name: *const c_char,
    frequency: u32,
) -> *mut FfiHttpRequest {
    if name.is_null() {
        return std::ptr::null_mut();
    }
    build_with(client, |c| {
        let name = unsafe { CStr::from_ptr(name) }.to_str().ok()?.to_string();
        let frequency = FfiFrequency::from_raw(frequency)?;
        c.build_create_habit(&CreateHabit { name, frequency }).ok()
    })
}

/// Build an HTTP request for deleting a habit by id.
#[unsafe(no_mangle)]
pub extern "C" fn habit_build_delete_habit(
    client: *const FfiHabitClient,
    habit_id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_delete_habit(habit_id)))
}

/// Build an HTTP request recording a completion for a habit.
#[unsafe(no_mangle)]
pub extern "C" fn habit_build_complete_habit(
    client: *const FfiHabitClient,
    habit_id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_complete_habit(habit_id)))
}

/// Build an HTTP request for a habit's statistics.
#[unsafe(no_mangle)]
pub extern "C" fn habit_build_get_stats(
    client: *const FfiHabitClient,
    habit_id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_get_stats(habit_id)))
}

/// Build an HTTP request for a habit's completion records.
#[unsafe(no_mangle)]
pub extern "C" fn habit_build_get_records(
    client: *const FfiHabitClient,
    habit_id: i64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_get_records(habit_id)))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_str()
            .unwrap_or("")
            .to_string()
    };
    HttpResponse::new(resp.status, body)
}

/// Null-check both arguments, convert the response, and hand it to `parse`.
fn parse_with<R>(
    op: &str,
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&HabitClient, HttpResponse) -> Result<R, ApiError>,
    wrap: impl FnOnce(R) -> *mut FfiHabitResult,
) -> *mut FfiHabitResult {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiHabitResult::null_arg("client");
        }
        if response.is_null() {
            return FfiHabitResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match parse(&client.inner, ffi_response_to_core(resp)) {
            Ok(value) => wrap(value),
            Err(e) => FfiHabitResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiHabitResult::panic(&format!("panic in {op}")))
}

/// Parse an HTTP response from a list-habits request.
///
/// Returns a result with `data_tag = HabitList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn habit_parse_list_habits(
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHabitResult {
    parse_with(
        "habit_parse_list_habits",
        client,
        response,
        HabitClient::parse_list_habits,
        FfiHabitResult::ok_habit_list,
    )
}

/// Parse an HTTP response from a create-habit request.
///
/// Returns a result with `data_tag = None` on success.
#[unsafe(no_mangle)]
pub extern "C" fn habit_parse_create_habit(
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHabitResult {
    parse_with(
        "habit_parse_create_habit",
        client,
        response,
        HabitClient::parse_create_habit,
        |()| FfiHabitResult::ok_empty(),
    )
}

/// Parse an HTTP response from a delete-habit request.
#[unsafe(no_mangle)]
pub extern "C" fn habit_parse_delete_habit(
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHabitResult {
    parse_with(
        "habit_parse_delete_habit",
        client,
        response,
        HabitClient::parse_delete_habit,
        |()| FfiHabitResult::ok_empty(),
    )
}

/// Parse an HTTP response from a complete-habit request.
#[unsafe(no_mangle)]
pub extern "C" fn habit_parse_complete_habit(
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHabitResult {
    parse_with(
        "habit_parse_complete_habit",
        client,
        response,
        HabitClient::parse_complete_habit,
        |()| FfiHabitResult::ok_empty(),
    )
}

/// Parse an HTTP response from a get-stats request.
///
/// Returns a result with `data_tag = Stats` on success.
#[unsafe(no_mangle)]
pub extern "C" fn habit_parse_get_stats(
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHabitResult {
    parse_with(
        "habit_parse_get_stats",
        client,
        response,
        HabitClient::parse_get_stats,
        FfiHabitResult::ok_stats,
    )
}

/// Parse an HTTP response from a get-records request.
///
/// Returns a result with `data_tag = RecordList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn habit_parse_get_records(
    client: *const FfiHabitClient,
    response: *const FfiHttpResponse,
) -> *mut FfiHabitResult {
    parse_with(
        "habit_parse_get_records",
        client,
        response,
        HabitClient::parse_get_records,
        FfiHabitResult::ok_record_list,
    )
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `habit_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn habit_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() {
            for h in unsafe { from_raw_slice(req.headers, req.headers_len) }.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiHabitResult` returned by any `habit_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn habit_free_result(result: *mut FfiHabitResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::HabitList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiHabitList) };
                if !list.items.is_null() {
                    for habit in unsafe { from_raw_slice(list.items, list.len) }.iter() {
                        free_c_string(habit.name);
                        free_c_string(habit.creation_date);
                    }
                }
            }
            FfiDataTag::Stats => {
                drop(unsafe { Box::from_raw(result.data as *mut FfiHabitStats) });
            }
            FfiDataTag::RecordList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiRecordList) };
                if !list.items.is_null() {
                    for record in unsafe { from_raw_slice(list.items, list.len) }.iter() {
                        free_c_string(record.completion_time);
                    }
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn habit_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

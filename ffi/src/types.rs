//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Arrays are handed out as boxed
//! slices so the matching free can rebuild them from the pointer and length
//! alone. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use habit_core::error::ApiError;
use habit_core::http::HttpMethod;
use habit_core::types::{Frequency, Habit, HabitRecord, HabitStats};
use habit_core::timestamp;

/// Opaque handle to a `HabitClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiHabitClient {
    pub(crate) inner: habit_core::HabitClient,
}

/// Allocate a C string. Interior NULs yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Hand a vector to C as pointer + length. Empty vectors become null.
pub(crate) fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a slice produced by `into_raw_slice`.
///
/// # Safety
/// `ptr` and `len` must come from one `into_raw_slice` call and not have
/// been reclaimed already.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `habit_build_*` functions. The C caller executes the request
/// and passes the response back through `habit_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: habit_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_slice(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), c_string),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request,
/// then passes a pointer to a `habit_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Habit cadence. Passed into `habit_build_create_habit` as its integer value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiFrequency {
    Daily = 0,
    Weekly = 1,
}

impl From<Frequency> for FfiFrequency {
    fn from(f: Frequency) -> Self {
        match f {
            Frequency::Daily => FfiFrequency::Daily,
            Frequency::Weekly => FfiFrequency::Weekly,
        }
    }
}

impl FfiFrequency {
    pub(crate) fn from_raw(raw: u32) -> Option<Frequency> {
        match raw {
            0 => Some(Frequency::Daily),
            1 => Some(Frequency::Weekly),
            _ => None,
        }
    }
}

#[repr(C)]
pub struct FfiHabit {
    pub habit_id: i64,
    pub name: *mut c_char,
    pub frequency: FfiFrequency,
    /// `YYYY-MM-DD HH:MM:SS`
    pub creation_date: *mut c_char,
}

impl FfiHabit {
    fn from_core(habit: Habit) -> Self {
        FfiHabit {
            habit_id: habit.habit_id,
            name: c_string(habit.name),
            frequency: habit.frequency.into(),
            creation_date: c_string(habit.creation_date.format(timestamp::FORMAT).to_string()),
        }
    }
}

#[repr(C)]
pub struct FfiHabitList {
    pub items: *mut FfiHabit,
    pub len: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiHabitStats {
    pub streak: u32,
    pub completion_rate: f64,
    pub total_completions: u32,
}

impl From<HabitStats> for FfiHabitStats {
    fn from(s: HabitStats) -> Self {
        FfiHabitStats {
            streak: s.streak,
            completion_rate: s.completion_rate,
            total_completions: s.total_completions,
        }
    }
}

#[repr(C)]
pub struct FfiHabitRecord {
    pub record_id: i64,
    pub habit_id: i64,
    /// `YYYY-MM-DD HH:MM:SS`
    pub completion_time: *mut c_char,
}

impl FfiHabitRecord {
    fn from_core(record: HabitRecord) -> Self {
        FfiHabitRecord {
            record_id: record.record_id,
            habit_id: record.habit_id,
            completion_time: c_string(record.completion_time.format(timestamp::FORMAT).to_string()),
        }
    }
}

#[repr(C)]
pub struct FfiRecordList {
    pub items: *mut FfiHabitRecord,
    pub len: u32,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiHabitResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `habit_free_result` what `FfiHabitResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    HabitList = 1,
    Stats = 2,
    RecordList = 3,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiHabitResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiHabitResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiHabitResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiHabitResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_habit_list(habits: Vec<Habit>) -> *mut Self {
        let items: Vec<FfiHabit> = habits.into_iter().map(FfiHabit::from_core).collect();
        let (items, len) = into_raw_slice(items);
        let list = Box::new(FfiHabitList { items, len });
        Self::ok(FfiDataTag::HabitList, Box::into_raw(list) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_stats(stats: HabitStats) -> *mut Self {
        let stats = Box::new(FfiHabitStats::from(stats));
        Self::ok(FfiDataTag::Stats, Box::into_raw(stats) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_record_list(records: Vec<HabitRecord>) -> *mut Self {
        let items: Vec<FfiHabitRecord> = records.into_iter().map(FfiHabitRecord::from_core).collect();
        let (items, len) = into_raw_slice(items);
        let list = Box::new(FfiRecordList { items, len });
        Self::ok(FfiDataTag::RecordList, Box::into_raw(list) as *mut std::ffi::c_void)
    }

    /// Build a success result with no data payload (create, delete, complete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404u16),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
        };
        Self::error(code, status, err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }
}

//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::collections::HashMap;
use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use animal_core::{Animal, AnimalListController, ApiError, ControllerError, HttpMethod, Ticket};

/// Opaque handle to an `AnimalListController`.
///
/// Tickets for calls the host is still executing are parked here under a
/// numeric call id, so C only ever holds a plain integer for them.
pub struct FfiAnimalController {
    pub(crate) inner: AnimalListController,
    pub(crate) pending: HashMap<u64, Ticket>,
    pub(crate) next_call_id: u64,
}

impl FfiAnimalController {
    pub(crate) fn new(inner: AnimalListController) -> Self {
        Self {
            inner,
            pending: HashMap::new(),
            next_call_id: 1,
        }
    }

    /// Park `ticket` and return the id the host passes back on completion.
    pub(crate) fn park(&mut self, ticket: Ticket) -> u64 {
        let id = self.next_call_id;
        self.next_call_id += 1;
        self.pending.insert(id, ticket);
        id
    }
}

/// Allocate a C string, dropping interior NULs rather than failing.
pub(crate) fn to_c(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default().into_raw()
        }
    }
}

/// Free a C string allocated by `to_c`. Null is ignored.
pub(crate) fn free_c(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
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
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: animal_core::HttpRequest) -> *mut Self {
        let headers_len = u32::try_from(req.headers.len()).unwrap_or(u32::MAX);
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c(k),
                    value: to_c(v),
                })
                .collect();
            Box::into_raw(ffi_headers.into_boxed_slice()).cast::<FfiHeader>()
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: to_c(req.path),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), |b| to_c(b)),
        }))
    }

    /// Release a request built by `from_core`, including the struct itself.
    pub(crate) fn free(req: *mut Self) {
        if req.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(req) };
        free_c(req.path);
        free_c(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c(h.key);
                free_c(h.value);
            }
        }
    }
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request. The
/// FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A single animal exposed to C.
#[repr(C)]
pub struct FfiAnimal {
    pub id: u64,
    pub name: *mut c_char,
    pub avatar_url: *mut c_char,
    pub date: *mut c_char,
}

impl FfiAnimal {
    pub(crate) fn from_core(animal: &Animal) -> Self {
        Self {
            id: animal.id.0,
            name: to_c(animal.name.clone()),
            avatar_url: to_c(animal.avatar_url.clone()),
            date: to_c(animal.date.clone()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            id: 0,
            name: std::ptr::null_mut(),
            avatar_url: std::ptr::null_mut(),
            date: std::ptr::null_mut(),
        }
    }

    /// Free the string fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        free_c(self.name);
        free_c(self.avatar_url);
        free_c(self.date);
    }
}

/// A list of animals exposed to C.
#[repr(C)]
pub struct FfiAnimalList {
    pub items: *mut FfiAnimal,
    pub len: u32,
}

/// A request the host must execute. Pass `call_id` back to
/// `animal_controller_resolve` or `animal_controller_fail`.
#[repr(C)]
pub struct FfiCall {
    pub call_id: u64,
    pub request: *mut FfiHttpRequest,
}

/// Which dialog is open.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiViewKind {
    Idle = 0,
    Detail = 1,
    Edit = 2,
    DeleteConfirm = 3,
    Add = 4,
}

/// Snapshot of the open dialog. `has_animal` says whether `animal` is
/// filled; the draft strings are null unless an edit or add form is open.
#[repr(C)]
pub struct FfiView {
    pub kind: FfiViewKind,
    pub has_animal: bool,
    pub animal: FfiAnimal,
    pub draft_name: *mut c_char,
    pub draft_date: *mut c_char,
    pub draft_avatar_url: *mut c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Transport = 5,
    Validation = 6,
    InvalidState = 7,
    UnknownRecord = 8,
    Busy = 9,
    UnexpectedResponse = 10,
    UnknownCall = 11,
    Panic = 12,
    NullArg = 13,
}

/// Tag that tells `animal_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Animal = 1,
    AnimalList = 2,
    Call = 3,
}

/// Result envelope for every fallible operation.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`). On failure `error_code`
/// describes the category, `error_message` is a human-readable C string
/// suitable for an alert, and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: to_c(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_empty() -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    pub(crate) fn ok_animal(animal: &Animal) -> *mut Self {
        let ffi_animal = Box::new(FfiAnimal::from_core(animal));
        Self::ok(FfiDataTag::Animal, Box::into_raw(ffi_animal).cast())
    }

    pub(crate) fn ok_animal_list(animals: &[Animal]) -> *mut Self {
        let len = u32::try_from(animals.len()).unwrap_or(u32::MAX);
        let items = if animals.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_animals: Vec<FfiAnimal> = animals.iter().map(FfiAnimal::from_core).collect();
            Box::into_raw(ffi_animals.into_boxed_slice()).cast::<FfiAnimal>()
        };
        let ffi_list = Box::new(FfiAnimalList { items, len });
        Self::ok(FfiDataTag::AnimalList, Box::into_raw(ffi_list).cast())
    }

    pub(crate) fn ok_call(call_id: u64, request: animal_core::HttpRequest) -> *mut Self {
        let call = Box::new(FfiCall {
            call_id,
            request: FfiHttpRequest::from_core(request),
        });
        Self::ok(FfiDataTag::Call, Box::into_raw(call).cast())
    }

    pub(crate) fn from_error(err: &ControllerError) -> *mut Self {
        let (code, status) = match err {
            ControllerError::Api(api) => match api {
                ApiError::NotFound => (FfiErrorCode::NotFound, 404),
                ApiError::Http { status, .. } => (FfiErrorCode::Http, *status),
                ApiError::Deserialization(_) => (FfiErrorCode::Deserialization, 0),
                ApiError::Serialization(_) => (FfiErrorCode::Serialization, 0),
                ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
            },
            ControllerError::Validation(_) => (FfiErrorCode::Validation, 0),
            ControllerError::InvalidState(_) => (FfiErrorCode::InvalidState, 0),
            ControllerError::UnknownRecord(_) => (FfiErrorCode::UnknownRecord, 0),
            ControllerError::Busy(_) => (FfiErrorCode::Busy, 0),
            ControllerError::UnexpectedResponse(_) => (FfiErrorCode::UnexpectedResponse, 0),
        };
        Self::err(code, status, err.to_string())
    }

    pub(crate) fn unknown_call(call_id: u64) -> *mut Self {
        Self::err(FfiErrorCode::UnknownCall, 0, format!("unknown call id: {call_id}"))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// Release the envelope and whatever `data_tag` says `data` points to.
    pub(crate) fn free(result: *mut Self) {
        if result.is_null() {
            return;
        }
        let result = unsafe { Box::from_raw(result) };
        free_c(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Animal => {
                let animal = unsafe { Box::from_raw(result.data.cast::<FfiAnimal>()) };
                animal.free_fields();
            }
            FfiDataTag::AnimalList => {
                let list = unsafe { Box::from_raw(result.data.cast::<FfiAnimalList>()) };
                if !list.items.is_null() && list.len > 0 {
                    let items = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
                    };
                    for item in items.iter() {
                        item.free_fields();
                    }
                }
            }
            FfiDataTag::Call => {
                let call = unsafe { Box::from_raw(result.data.cast::<FfiCall>()) };
                FfiHttpRequest::free(call.request);
            }
            FfiDataTag::None => {}
        }
    }
}

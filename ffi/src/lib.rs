//! C-ABI wrapper around the animal list controller.
//!
//! # Overview
//! A mobile host renders the list screen and executes HTTP; this library
//! keeps the screen's state. The host forwards taps and text input, runs the
//! requests it is handed, and feeds the responses back.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operations that need the server return an `FfiResult` tagged `Call`.
//!   The host executes `request` and answers with
//!   `animal_controller_resolve(call_id, response)` or
//!   `animal_controller_fail(call_id, reason)`.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `animal_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use animal_core::{
    AnimalId, AnimalListController, ControllerError, Field, HttpResponse, InFlight, Outcome, PendingCall,
    ViewState,
};

use types::*;

/// Copy a borrowed C string. Null reads as empty; invalid UTF-8 sequences
/// become U+FFFD.
fn read_str(s: *const c_char) -> String {
    if s.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned()
}

/// Run `f` against a live controller, turning null handles and panics into
/// error results.
fn with_controller(
    controller: *mut FfiAnimalController,
    name: &str,
    f: impl FnOnce(&mut FfiAnimalController) -> *mut FfiResult,
) -> *mut FfiResult {
    if controller.is_null() {
        return FfiResult::null_arg("controller");
    }
    catch_unwind(AssertUnwindSafe(|| f(unsafe { &mut *controller })))
        .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {name}")))
}

/// Park the ticket of an issued call and hand the request to the host.
fn issue(handle: &mut FfiAnimalController, call: Result<PendingCall, ControllerError>) -> *mut FfiResult {
    match call {
        Ok(PendingCall { ticket, request }) => {
            let call_id = handle.park(ticket);
            FfiResult::ok_call(call_id, request)
        }
        Err(e) => FfiResult::from_error(&e),
    }
}

fn unit(result: Result<(), ControllerError>) -> *mut FfiResult {
    match result {
        Ok(()) => FfiResult::ok_empty(),
        Err(e) => FfiResult::from_error(&e),
    }
}

fn field_from_code(code: i32) -> Option<Field> {
    match code {
        0 => Some(Field::Name),
        1 => Some(Field::Date),
        2 => Some(Field::AvatarUrl),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a controller whose API lives at `base_url`. It starts loading
/// with an empty list; call `animal_controller_begin_load` next.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `animal_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_new(base_url: *const c_char) -> *mut FfiAnimalController {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = read_str(base_url);
        let controller = FfiAnimalController::new(AnimalListController::new(&url));
        Box::into_raw(Box::new(controller))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `animal_controller_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_free(controller: *mut FfiAnimalController) {
    if !controller.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(controller) });
        });
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// True until the initial list request resolves either way.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_is_loading(controller: *const FfiAnimalController) -> bool {
    if controller.is_null() {
        return false;
    }
    catch_unwind(|| unsafe { &*controller }.inner.is_loading()).unwrap_or(false)
}

/// Whether a call is pending, so the host can disable its trigger.
///
/// `kind`: 0 = load, 1 = create, 2 = update, 3 = delete. `id` is ignored
/// for load and create.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_is_in_flight(
    controller: *const FfiAnimalController,
    kind: i32,
    id: u64,
) -> bool {
    if controller.is_null() {
        return false;
    }
    let key = match kind {
        0 => InFlight::Load,
        1 => InFlight::Create,
        2 => InFlight::Update(AnimalId(id)),
        3 => InFlight::Delete(AnimalId(id)),
        _ => return false,
    };
    catch_unwind(|| unsafe { &*controller }.inner.is_in_flight(key)).unwrap_or(false)
}

/// Snapshot of the record list, tagged `AnimalList`.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_records(controller: *mut FfiAnimalController) -> *mut FfiResult {
    with_controller(controller, "animal_controller_records", |handle| {
        FfiResult::ok_animal_list(handle.inner.records())
    })
}

/// Snapshot of the open dialog. Returns null if `controller` is null.
/// The caller must free the returned pointer with `animal_free_view`.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_view(controller: *const FfiAnimalController) -> *mut FfiView {
    if controller.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(|| {
        let view = unsafe { &*controller }.inner.view();
        let kind = match view {
            ViewState::Idle => FfiViewKind::Idle,
            ViewState::ViewingDetail(_) => FfiViewKind::Detail,
            ViewState::Editing { .. } => FfiViewKind::Edit,
            ViewState::ConfirmingDelete(_) => FfiViewKind::DeleteConfirm,
            ViewState::Adding(_) => FfiViewKind::Add,
        };
        let (has_animal, animal) = match view.selected() {
            Some(animal) => (true, FfiAnimal::from_core(animal)),
            None => (false, FfiAnimal::empty()),
        };
        let (draft_name, draft_date, draft_avatar_url) = match view.draft() {
            Some(draft) => (
                to_c(draft.name.clone()),
                to_c(draft.date.clone()),
                to_c(draft.avatar_url.clone()),
            ),
            None => (std::ptr::null_mut(), std::ptr::null_mut(), std::ptr::null_mut()),
        };
        Box::into_raw(Box::new(FfiView {
            kind,
            has_animal,
            animal,
            draft_name,
            draft_date,
            draft_avatar_url,
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

/// Show the detail dialog for record `id`.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_open_detail(controller: *mut FfiAnimalController, id: u64) -> *mut FfiResult {
    with_controller(controller, "animal_controller_open_detail", |handle| {
        unit(handle.inner.open_detail(AnimalId(id)))
    })
}

/// Show the edit form for record `id`, staged with its current values.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_open_edit(controller: *mut FfiAnimalController, id: u64) -> *mut FfiResult {
    with_controller(controller, "animal_controller_open_edit", |handle| {
        unit(handle.inner.open_edit(AnimalId(id)))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_open_delete_confirm(
    controller: *mut FfiAnimalController,
    id: u64,
) -> *mut FfiResult {
    with_controller(controller, "animal_controller_open_delete_confirm", |handle| {
        unit(handle.inner.open_delete_confirm(AnimalId(id)))
    })
}

/// Show an empty add form. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_open_add(controller: *mut FfiAnimalController) {
    if !controller.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &mut *controller }.inner.open_add()));
    }
}

/// Dismiss the open dialog, discarding staged values. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_close(controller: *mut FfiAnimalController) {
    if !controller.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| unsafe { &mut *controller }.inner.close()));
    }
}

/// Stage text typed into the open edit or add form.
///
/// `field`: 0 = name, 1 = date, 2 = avatar URL. A null `value` clears it.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_set_draft_field(
    controller: *mut FfiAnimalController,
    field: i32,
    value: *const c_char,
) -> *mut FfiResult {
    with_controller(controller, "animal_controller_set_draft_field", |handle| {
        let Some(field) = field_from_code(field) else {
            return FfiResult::from_error(&ControllerError::InvalidState("unknown form field"));
        };
        unit(handle.inner.set_draft_field(field, read_str(value)))
    })
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Request the full list. Returns a result tagged `Call`.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_begin_load(controller: *mut FfiAnimalController) -> *mut FfiResult {
    with_controller(controller, "animal_controller_begin_load", |handle| {
        let call = handle.inner.begin_load();
        issue(handle, call)
    })
}

/// Submit the edit form. Fails with `Validation` (and no call) if any
/// field is empty.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_save_edit(controller: *mut FfiAnimalController) -> *mut FfiResult {
    with_controller(controller, "animal_controller_save_edit", |handle| {
        let call = handle.inner.save_edit();
        issue(handle, call)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_confirm_delete(controller: *mut FfiAnimalController) -> *mut FfiResult {
    with_controller(controller, "animal_controller_confirm_delete", |handle| {
        let call = handle.inner.confirm_delete();
        issue(handle, call)
    })
}

/// Submit the add form. Fails with `Validation` (and no call) if any
/// field is empty.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_confirm_add(controller: *mut FfiAnimalController) -> *mut FfiResult {
    with_controller(controller, "animal_controller_confirm_add", |handle| {
        let call = handle.inner.confirm_add();
        issue(handle, call)
    })
}

/// Feed the response for `call_id` back.
///
/// On success the result carries the effect: `AnimalList` after a load,
/// `Animal` after a create or update, nothing after a delete.
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_resolve(
    controller: *mut FfiAnimalController,
    call_id: u64,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    if response.is_null() {
        return FfiResult::null_arg("response");
    }
    with_controller(controller, "animal_controller_resolve", |handle| {
        let Some(ticket) = handle.pending.remove(&call_id) else {
            return FfiResult::unknown_call(call_id);
        };
        let resp = unsafe { &*response };
        let core_resp = HttpResponse::new(resp.status, read_str(resp.body));
        match handle.inner.resolve(ticket, core_resp) {
            Ok(Outcome::Loaded(_)) => FfiResult::ok_animal_list(handle.inner.records()),
            Ok(Outcome::Created(animal) | Outcome::Updated(animal)) => FfiResult::ok_animal(&animal),
            Ok(Outcome::Deleted(_)) => FfiResult::ok_empty(),
            Err(e) => FfiResult::from_error(&e),
        }
    })
}

/// Report that the request for `call_id` never produced a response.
/// Always returns an error result (`Transport`, or `UnknownCall`).
#[unsafe(no_mangle)]
pub extern "C" fn animal_controller_fail(
    controller: *mut FfiAnimalController,
    call_id: u64,
    reason: *const c_char,
) -> *mut FfiResult {
    with_controller(controller, "animal_controller_fail", |handle| {
        let Some(ticket) = handle.pending.remove(&call_id) else {
            return FfiResult::unknown_call(call_id);
        };
        let err = handle.inner.fail(ticket, read_str(reason));
        FfiResult::from_error(&err)
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResult` returned by any `animal_controller_*` function,
/// including a `Call` payload's request. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn animal_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| FfiResult::free(result));
}

/// Free an `FfiView` returned by `animal_controller_view`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn animal_free_view(view: *mut FfiView) {
    if view.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let view = unsafe { Box::from_raw(view) };
        view.animal.free_fields();
        free_c(view.draft_name);
        free_c(view.draft_date);
        free_c(view.draft_avatar_url);
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

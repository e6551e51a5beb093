//! Play the mobile host against the live mock server through the C ABI.
//!
//! Every request the library hands out is executed with ureq and the raw
//! status and body are fed back, the way a Swift or Kotlin host would.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use animal_ffi::types::{
    FfiAnimal, FfiAnimalController, FfiAnimalList, FfiCall, FfiDataTag, FfiErrorCode, FfiHttpMethod, FfiHttpResponse, FfiResult,
};
use animal_ffi::*;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, mock_server::app()).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn c_str<'a>(p: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(p) }.to_str().unwrap()
}

/// Execute the call carried by `result`, resolve it, and return the
/// resolution. Frees `result`.
fn run_call(ctrl: *mut FfiAnimalController, result: *mut FfiResult) -> *mut FfiResult {
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok, "expected a call");
    assert_eq!(r.data_tag, FfiDataTag::Call);
    let call = unsafe { &*(r.data as *const FfiCall) };
    let req = unsafe { &*call.request };

    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();
    let path = c_str(req.path);
    let body = if req.body.is_null() { None } else { Some(c_str(req.body)) };
    let mut response = match (&req.method, body) {
        (FfiHttpMethod::Get, _) => agent.get(path).call(),
        (FfiHttpMethod::Delete, _) => agent.delete(path).call(),
        (FfiHttpMethod::Post, Some(b)) => agent.post(path).content_type("application/json").send(b.as_bytes()),
        (FfiHttpMethod::Post, None) => agent.post(path).send_empty(),
        (FfiHttpMethod::Put, Some(b)) => agent.put(path).content_type("application/json").send(b.as_bytes()),
        (FfiHttpMethod::Put, None) => agent.put(path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let text = CString::new(response.body_mut().read_to_string().unwrap_or_default()).unwrap();
    let call_id = call.call_id;
    animal_free_result(result);

    let resp = FfiHttpResponse {
        status,
        body: text.as_ptr(),
    };
    animal_controller_resolve(ctrl, call_id, &resp)
}

fn set(ctrl: *mut FfiAnimalController, field: i32, value: &str) {
    let value = CString::new(value).unwrap();
    let result = animal_controller_set_draft_field(ctrl, field, value.as_ptr());
    assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
    animal_free_result(result);
}

#[test]
fn host_drives_add_edit_delete() {
    let url = CString::new(start_server()).unwrap();
    let ctrl = animal_controller_new(url.as_ptr());

    // load an empty list
    let done = run_call(ctrl, animal_controller_begin_load(ctrl));
    let list = unsafe { &*((*done).data as *const FfiAnimalList) };
    assert_eq!(list.len, 0);
    animal_free_result(done);
    assert!(!animal_controller_is_loading(ctrl));

    // add
    animal_controller_open_add(ctrl);
    set(ctrl, 0, "Rex");
    set(ctrl, 1, "2024-01-01");
    set(ctrl, 2, "https://img.example/rex.png");
    let done = run_call(ctrl, animal_controller_confirm_add(ctrl));
    let r = unsafe { &*done };
    assert_eq!(r.data_tag, FfiDataTag::Animal);
    let id = unsafe { &*(r.data as *const FfiAnimal) }.id;
    assert_eq!(id, 1);
    animal_free_result(done);

    // edit
    animal_free_result(animal_controller_open_edit(ctrl, id));
    set(ctrl, 0, "Max");
    let done = run_call(ctrl, animal_controller_save_edit(ctrl));
    assert_eq!(unsafe { &*done }.error_code, FfiErrorCode::Ok);
    animal_free_result(done);

    let records = animal_controller_records(ctrl);
    let list = unsafe { &*((*records).data as *const FfiAnimalList) };
    let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
    assert_eq!(c_str(items[0].name), "Max");
    animal_free_result(records);

    // delete
    animal_free_result(animal_controller_open_delete_confirm(ctrl, id));
    let done = run_call(ctrl, animal_controller_confirm_delete(ctrl));
    assert_eq!(unsafe { &*done }.error_code, FfiErrorCode::Ok);
    assert_eq!(unsafe { &*done }.data_tag, FfiDataTag::None);
    animal_free_result(done);

    let records = animal_controller_records(ctrl);
    let list = unsafe { &*((*records).data as *const FfiAnimalList) };
    assert_eq!(list.len, 0);
    animal_free_result(records);

    animal_controller_free(ctrl);
}

//! Drive the list controller against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then walks the screen through
//! load, edit, add, and delete over real HTTP using ureq. The controller
//! only ever sees `HttpResponse` values, exactly as a mobile host would
//! feed them.

use animal_core::{
    Animal, AnimalId, AnimalListController, ApiError, ControllerError, Field, HttpMethod, HttpRequest,
    HttpResponse, Outcome, PendingCall, ViewState,
};

/// Execute an `HttpRequest` using ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data; only transport failures become `Err`.
fn execute(req: &HttpRequest) -> Result<HttpResponse, String> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    };

    let mut response = result.map_err(|e| e.to_string())?;
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Ok(HttpResponse::new(status, body))
}

/// Run a pending call to completion the way a host would.
fn drive(controller: &mut AnimalListController, call: PendingCall) -> Result<Outcome, ControllerError> {
    match execute(&call.request) {
        Ok(response) => controller.resolve(call.ticket, response),
        Err(reason) => Err(controller.fail(call.ticket, reason)),
    }
}

fn start_server(seed: Vec<mock_server::Animal>) -> String {
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
            mock_server::run(listener, mock_server::app_with(seed)).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn rex() -> mock_server::Animal {
    mock_server::Animal {
        id: 1,
        name: "Rex".to_string(),
        avatar: "u1".to_string(),
        date: "2024-01-01".to_string(),
    }
}

#[test]
fn list_screen_lifecycle() {
    let base_url = start_server(vec![rex()]);
    let mut controller = AnimalListController::new(&base_url);

    // Step 1: load.
    let call = controller.begin_load().unwrap();
    assert_eq!(drive(&mut controller, call).unwrap(), Outcome::Loaded(1));
    assert!(!controller.is_loading());

    // Step 2: edit Rex into Max.
    controller.open_edit(AnimalId(1)).unwrap();
    controller.set_draft_field(Field::Name, "Max").unwrap();
    let call = controller.save_edit().unwrap();
    drive(&mut controller, call).unwrap();
    assert_eq!(
        controller.records(),
        &[Animal {
            id: AnimalId(1),
            name: "Max".to_string(),
            avatar_url: "u1".to_string(),
            date: "2024-01-01".to_string(),
        }]
    );
    assert!(controller.view().is_idle());

    // Step 3: add with a missing field is rejected locally.
    controller.open_add();
    controller.set_draft_field(Field::Name, "Bella").unwrap();
    controller.set_draft_field(Field::AvatarUrl, "u2").unwrap();
    assert!(controller.confirm_add().unwrap_err().is_validation());

    // Step 4: complete the form; the server assigns the id.
    controller.set_draft_field(Field::Date, "2024-05-05").unwrap();
    let call = controller.confirm_add().unwrap();
    let Outcome::Created(created) = drive(&mut controller, call).unwrap() else {
        panic!("expected a created record");
    };
    assert_eq!(created.id, AnimalId(2));
    assert_eq!(controller.records().len(), 2);
    assert!(controller.view().is_idle());

    // Step 5: delete Max.
    controller.open_delete_confirm(AnimalId(1)).unwrap();
    let call = controller.confirm_delete().unwrap();
    assert_eq!(drive(&mut controller, call).unwrap(), Outcome::Deleted(AnimalId(1)));
    assert_eq!(controller.records(), &[created.clone()]);

    // Step 6: a fresh screen sees the same list.
    let mut fresh = AnimalListController::new(&base_url);
    let call = fresh.begin_load().unwrap();
    drive(&mut fresh, call).unwrap();
    assert_eq!(fresh.records(), controller.records());
}

#[test]
fn delete_of_record_removed_elsewhere_keeps_local_state() {
    let base_url = start_server(vec![rex()]);

    let mut stale = AnimalListController::new(&base_url);
    let call = stale.begin_load().unwrap();
    drive(&mut stale, call).unwrap();

    let mut other = AnimalListController::new(&base_url);
    let call = other.begin_load().unwrap();
    drive(&mut other, call).unwrap();
    other.open_delete_confirm(AnimalId(1)).unwrap();
    let call = other.confirm_delete().unwrap();
    drive(&mut other, call).unwrap();

    stale.open_delete_confirm(AnimalId(1)).unwrap();
    let call = stale.confirm_delete().unwrap();
    let err = drive(&mut stale, call).unwrap_err();
    assert!(matches!(err, ControllerError::Api(ApiError::NotFound)));
    assert_eq!(stale.records().len(), 1);
    assert!(matches!(stale.view(), ViewState::ConfirmingDelete(_)));
}

#[test]
fn unreachable_server_ends_loading_with_empty_list() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut controller = AnimalListController::new(&format!("http://{addr}"));

    let call = controller.begin_load().unwrap();
    let err = drive(&mut controller, call).unwrap_err();
    assert!(matches!(err, ControllerError::Api(ApiError::Transport(_))));
    assert!(!controller.is_loading());
    assert!(controller.records().is_empty());
}

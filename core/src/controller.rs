//! View-state machine for the animal list screen.
//!
//! # Design
//! The controller never performs I/O. Every action that needs the server
//! returns a `PendingCall`: a `Ticket` naming what was asked plus the
//! `HttpRequest` to execute. The host runs the request and hands the result
//! back through `resolve` (a response arrived) or `fail` (the transport gave
//! up). Local records change only inside `resolve`, after the server has
//! confirmed the call, so a failed call leaves them exactly as they were.
//!
//! Dialogs are a single `ViewState` value, so two dialogs can never be open
//! at once and the edit and add forms each keep their own draft.
//!
//! Each issued call registers an `InFlight` key. Issuing a second call with
//! the same key before the first one resolves fails with
//! `ControllerError::Busy`, which is how the host disables a button while
//! its request is pending.
//!
//! The payload of an issued call stays inside the controller. The host only
//! holds an opaque `Ticket`, so it can name a call but never change what
//! the call applies.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, warn};

use crate::client::AnimalClient;
use crate::error::{ApiError, ControllerError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Animal, AnimalId, Draft, Field, NewAnimal};

/// Which dialog is open, and what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Just the list.
    #[default]
    Idle,
    /// Read-only detail dialog for a copy of one record.
    ViewingDetail(Animal),
    /// Edit form: the record as it was when opened and the staged values.
    Editing { original: Animal, draft: Draft },
    /// Delete confirmation for a copy of one record.
    ConfirmingDelete(Animal),
    /// Add form with its own staged values.
    Adding(Draft),
}

impl ViewState {
    /// The record a dialog was opened for, if any.
    pub fn selected(&self) -> Option<&Animal> {
        match self {
            ViewState::ViewingDetail(animal)
            | ViewState::ConfirmingDelete(animal)
            | ViewState::Editing { original: animal, .. } => Some(animal),
            ViewState::Idle | ViewState::Adding(_) => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            ViewState::Editing { draft, .. } | ViewState::Adding(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ViewState::Idle)
    }
}

/// Identity of a call that may be waiting for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InFlight {
    Load,
    Create,
    Update(AnimalId),
    Delete(AnimalId),
}

/// Handle for one issued call. Handed back to `resolve` or `fail` exactly
/// once. Only the controller that issued it can make one.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    key: InFlight,
    serial: u64,
}

impl Ticket {
    pub fn key(&self) -> InFlight {
        self.key
    }
}

/// What an issued call applies once the server confirms it. This is the
/// pending marker for the call's effect on local state.
#[derive(Debug)]
enum Submitted {
    Load,
    /// The payload as submitted; the server's answer replaces it.
    Create(NewAnimal),
    /// The record that replaces the local entry once the server agrees.
    Update(Animal),
    Delete(AnimalId),
}

#[derive(Debug)]
struct Issued {
    serial: u64,
    submitted: Submitted,
}

/// A request the host must execute, paired with its ticket.
#[derive(Debug)]
pub struct PendingCall {
    pub ticket: Ticket,
    pub request: HttpRequest,
}

/// Effect of a successfully resolved call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Number of records now in the list.
    Loaded(usize),
    Created(Animal),
    Updated(Animal),
    Deleted(AnimalId),
}

/// Owns the local record list and the dialog state of the list screen.
#[derive(Debug)]
pub struct AnimalListController {
    client: AnimalClient,
    records: Vec<Animal>,
    loading: bool,
    view: ViewState,
    in_flight: HashMap<InFlight, Issued>,
    next_serial: u64,
}

impl AnimalListController {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(AnimalClient::new(base_url))
    }

    /// Starts in the loading state with an empty list.
    pub fn with_client(client: AnimalClient) -> Self {
        Self {
            client,
            records: Vec::new(),
            loading: true,
            view: ViewState::Idle,
            in_flight: HashMap::new(),
            next_serial: 1,
        }
    }

    pub fn records(&self) -> &[Animal] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn find(&self, id: AnimalId) -> Option<&Animal> {
        self.records.iter().find(|animal| animal.id == id)
    }

    pub fn is_in_flight(&self, key: InFlight) -> bool {
        self.in_flight.contains_key(&key)
    }

    // -----------------------------------------------------------------------
    // Dialogs
    // -----------------------------------------------------------------------

    pub fn open_detail(&mut self, id: AnimalId) -> Result<(), ControllerError> {
        let animal = self.lookup(id)?;
        self.view = ViewState::ViewingDetail(animal);
        Ok(())
    }

    pub fn open_edit(&mut self, id: AnimalId) -> Result<(), ControllerError> {
        let original = self.lookup(id)?;
        let draft = Draft::from_animal(&original);
        self.view = ViewState::Editing { original, draft };
        Ok(())
    }

    pub fn open_delete_confirm(&mut self, id: AnimalId) -> Result<(), ControllerError> {
        let animal = self.lookup(id)?;
        self.view = ViewState::ConfirmingDelete(animal);
        Ok(())
    }

    pub fn open_add(&mut self) {
        self.view = ViewState::Adding(Draft::default());
    }

    /// Cancel or dismiss whatever dialog is open. Staged values are dropped.
    pub fn close(&mut self) {
        self.view = ViewState::Idle;
    }

    /// The staged values of the open edit or add form.
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.view {
            ViewState::Editing { draft, .. } | ViewState::Adding(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn set_draft_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), ControllerError> {
        let draft = self
            .draft_mut()
            .ok_or(ControllerError::InvalidState("no form is open"))?;
        draft.set(field, value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------------

    /// Request the full list. Called once when the screen mounts.
    pub fn begin_load(&mut self) -> Result<PendingCall, ControllerError> {
        self.ensure_free(InFlight::Load)?;
        self.loading = true;
        let request = self.client.build_list_animals();
        Ok(self.issue(InFlight::Load, Submitted::Load, request))
    }

    pub fn save_edit(&mut self) -> Result<PendingCall, ControllerError> {
        let ViewState::Editing { original, draft } = &self.view else {
            return Err(ControllerError::InvalidState("edit form is not open"));
        };
        draft.validate()?;
        let updated = draft.to_animal(original.id);
        let request = self.client.build_update_animal(updated.id, &updated)?;
        let key = InFlight::Update(updated.id);
        self.ensure_free(key)?;
        Ok(self.issue(key, Submitted::Update(updated), request))
    }

    pub fn confirm_delete(&mut self) -> Result<PendingCall, ControllerError> {
        let ViewState::ConfirmingDelete(animal) = &self.view else {
            return Err(ControllerError::InvalidState("delete confirmation is not open"));
        };
        let id = animal.id;
        self.ensure_free(InFlight::Delete(id))?;
        let request = self.client.build_delete_animal(id);
        Ok(self.issue(InFlight::Delete(id), Submitted::Delete(id), request))
    }

    pub fn confirm_add(&mut self) -> Result<PendingCall, ControllerError> {
        let ViewState::Adding(draft) = &self.view else {
            return Err(ControllerError::InvalidState("add form is not open"));
        };
        draft.validate()?;
        let input = draft.to_new_animal();
        let request = self.client.build_create_animal(&input)?;
        self.ensure_free(InFlight::Create)?;
        Ok(self.issue(InFlight::Create, Submitted::Create(input), request))
    }

    /// Apply the server's response to the call named by `ticket`.
    ///
    /// On error the record list and the open dialog are left as they were.
    pub fn resolve(&mut self, ticket: Ticket, response: HttpResponse) -> Result<Outcome, ControllerError> {
        let key = ticket.key();
        let parsed = match self.release(ticket)? {
            Submitted::Load => self
                .client
                .parse_list_animals(response)
                .map(|animals| self.apply_load(animals)),
            Submitted::Create(input) => self
                .client
                .parse_create_animal(response)
                .map(|created| self.apply_create(&input, created)),
            Submitted::Update(animal) => self
                .client
                .parse_update_animal(response)
                .map(|()| self.apply_update(animal)),
            Submitted::Delete(id) => self
                .client
                .parse_delete_animal(response)
                .map(|()| self.apply_delete(id)),
        };
        parsed.map_err(|err| self.report(key, err))
    }

    /// The host could not complete the round-trip for `ticket`.
    pub fn fail(&mut self, ticket: Ticket, reason: impl Into<String>) -> ControllerError {
        let key = ticket.key();
        if let Err(err) = self.release(ticket) {
            return err;
        }
        self.report(key, ApiError::Transport(reason.into()))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lookup(&self, id: AnimalId) -> Result<Animal, ControllerError> {
        self.find(id).cloned().ok_or(ControllerError::UnknownRecord(id))
    }

    fn ensure_free(&self, key: InFlight) -> Result<(), ControllerError> {
        if self.in_flight.contains_key(&key) {
            return Err(ControllerError::Busy(key));
        }
        Ok(())
    }

    fn issue(&mut self, key: InFlight, submitted: Submitted, request: HttpRequest) -> PendingCall {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.in_flight.insert(key, Issued { serial, submitted });
        debug!(?key, serial, method = request.method.as_str(), path = %request.path, "issuing request");
        PendingCall {
            ticket: Ticket { key, serial },
            request,
        }
    }

    /// Take back the payload of the call `ticket` names. A ticket whose key
    /// is not in flight, or that belongs to another call with the same key,
    /// is rejected and nothing changes.
    fn release(&mut self, ticket: Ticket) -> Result<Submitted, ControllerError> {
        let Ticket { key, serial } = ticket;
        match self.in_flight.get(&key) {
            Some(issued) if issued.serial == serial => {}
            _ => {
                warn!(?key, serial, "response for a call that is not in flight");
                return Err(ControllerError::UnexpectedResponse(key));
            }
        }
        let issued = self
            .in_flight
            .remove(&key)
            .ok_or(ControllerError::UnexpectedResponse(key))?;
        if key == InFlight::Load {
            self.loading = false;
        }
        Ok(issued.submitted)
    }

    fn report(&self, key: InFlight, err: ApiError) -> ControllerError {
        error!(?key, error = %err, "request failed");
        ControllerError::Api(err)
    }

    fn apply_load(&mut self, animals: Vec<Animal>) -> Outcome {
        let mut seen = HashSet::new();
        self.records = animals
            .into_iter()
            .filter(|animal| {
                let fresh = seen.insert(animal.id);
                if !fresh {
                    warn!(id = %animal.id, "dropping duplicate id from listing");
                }
                fresh
            })
            .collect();
        if let Some(id) = self.view.selected().map(|animal| animal.id) {
            match self.find(id).cloned() {
                Some(current) => self.refresh_selected(&current),
                None => self.view = ViewState::Idle,
            }
        }
        info!(count = self.records.len(), "animals loaded");
        Outcome::Loaded(self.records.len())
    }

    fn apply_create(&mut self, input: &NewAnimal, created: Animal) -> Outcome {
        match self.records.iter().position(|animal| animal.id == created.id) {
            Some(index) => {
                warn!(id = %created.id, "created id already listed, replacing entry");
                self.records[index] = created.clone();
            }
            None => self.records.push(created.clone()),
        }
        if matches!(&self.view, ViewState::Adding(draft) if draft.to_new_animal() == *input) {
            self.view = ViewState::Idle;
        }
        info!(id = %created.id, "animal created");
        Outcome::Created(created)
    }

    fn apply_update(&mut self, updated: Animal) -> Outcome {
        match self.records.iter_mut().find(|animal| animal.id == updated.id) {
            Some(existing) => *existing = updated.clone(),
            None => warn!(id = %updated.id, "updated animal is no longer listed"),
        }
        let saved = matches!(
            &self.view,
            ViewState::Editing { original, draft }
                if original.id == updated.id && draft.to_animal(original.id) == updated
        );
        if saved {
            self.view = ViewState::Idle;
        } else {
            self.refresh_selected(&updated);
        }
        info!(id = %updated.id, "animal updated");
        Outcome::Updated(updated)
    }

    fn apply_delete(&mut self, id: AnimalId) -> Outcome {
        self.records.retain(|animal| animal.id != id);
        if self.view.selected().is_some_and(|animal| animal.id == id) {
            self.view = ViewState::Idle;
        }
        info!(%id, "animal deleted");
        Outcome::Deleted(id)
    }

    /// Keep a dialog's copy of a record in step with the list.
    fn refresh_selected(&mut self, current: &Animal) {
        match &mut self.view {
            ViewState::ViewingDetail(animal)
            | ViewState::ConfirmingDelete(animal)
            | ViewState::Editing { original: animal, .. }
                if animal.id == current.id =>
            {
                *animal = current.clone();
            }
            _ => {}
        }
    }
}

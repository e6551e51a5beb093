//! Error types for the animal API client and the list controller.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the
//! record is gone" from "the server returned an unexpected status." Other
//! non-success responses land in `Http` with the raw status and body.
//! `Transport` carries failures the host hit before any response existed.

use thiserror::Error;

use crate::controller::InFlight;
use crate::types::{AnimalId, Field};

/// Errors from building requests, parsing responses, or executing them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-success status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The host could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Form input rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill all fields (missing: {})", join(.0))]
    MissingFields(Vec<Field>),
}

fn join(fields: &[Field]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

/// Errors surfaced by `AnimalListController` operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation needs a dialog that is not open.
    #[error("{0}")]
    InvalidState(&'static str),

    /// The id is not in the local list.
    #[error("animal {0} is not in the list")]
    UnknownRecord(AnimalId),

    /// The same call is already waiting for a response.
    #[error("{0:?} is already in flight")]
    Busy(InFlight),

    /// The host resolved a ticket the controller is not waiting on.
    #[error("no request in flight for {0:?}")]
    UnexpectedResponse(InFlight),
}

impl ControllerError {
    /// Validation failures are reported to the user without touching the
    /// network; everything from `Api` came back from a call.
    pub fn is_validation(&self) -> bool {
        matches!(self, ControllerError::Validation(_))
    }
}

//! Sans-IO core for the animal list screen.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and drives the list screen's
//! view state on top of them. The host renders the screen and executes the
//! HTTP round-trips, so everything here stays deterministic and testable.
//!
//! # Design
//! - `AnimalClient` is stateless. It holds only `base_url`.
//! - Each API operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `AnimalListController` owns the local record list and a single
//!   `ViewState` value. Mutating actions hand back a `PendingCall`; the
//!   local list only changes once the host resolves that call.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod controller;
pub mod error;
pub mod http;
pub mod types;

pub use client::AnimalClient;
pub use controller::{AnimalListController, InFlight, Outcome, PendingCall, Ticket, ViewState};
pub use error::{ApiError, ControllerError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Animal, AnimalId, Draft, Field, NewAnimal};

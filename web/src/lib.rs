//! HTTP error mapping for Ticketdesk.
//!
//! Routers and request extraction live with whichever HTTP surface embeds
//! the services; this crate only fixes how service errors become responses.
//!
//! | `TicketError` | Status |
//! |---|---|
//! | `StatusTransitionNotAllowed`, `TicketStatusNotAllowed` | 405 Method Not Allowed |
//! | `NotFound` | 404 Not Found |
//! | `Validation` | 422 Unprocessable Entity |
//! | `VersionConflict` | 409 Conflict |
//! | `StoreUnavailable` | 503 Service Unavailable |
//! | anything else | 500 Internal Server Error |
//!
//! # Example
//!
//! ```ignore
//! use ticketdesk_web::AppError;
//! use axum::{Json, extract::{Path, State}};
//!
//! async fn get_ticket(
//!     State(tickets): State<AppTickets>,
//!     Path(id): Path<TicketId>,
//! ) -> Result<Json<Ticket>, AppError> {
//!     Ok(Json(tickets.get(id).await?))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

pub use error::AppError;

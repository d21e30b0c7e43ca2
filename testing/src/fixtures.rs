//! Valid requests and records for tests.

#![allow(clippy::unwrap_used)] // Fixtures are valid by construction

use ticketdesk_core::environment::Clock;
use ticketdesk_core::{
    Comment, CommentId, NewComment, NewTicket, Ticket, TicketId, TicketStatus,
};

/// Reporter address used by every fixture.
pub const REPORTER_EMAIL: &str = "reporter@example.com";

/// Actor that creates fixture records.
pub const REPORTER: &str = "reporter";

/// Actor used for fixture updates.
pub const AGENT: &str = "agent";

/// A valid ticket request titled `title`.
#[must_use]
pub fn new_ticket(title: &str) -> NewTicket {
    NewTicket::new(title, REPORTER_EMAIL, REPORTER)
}

/// A valid comment request on `ticket_id`.
#[must_use]
pub fn new_comment(ticket_id: TicketId, body: &str) -> NewComment {
    NewComment::new(ticket_id, body, REPORTER_EMAIL, REPORTER)
}

/// A fresh OPEN ticket stamped with `clock`.
#[must_use]
pub fn ticket(clock: &impl Clock) -> Ticket {
    Ticket::create(TicketId::new(), new_ticket("Printer jammed"), clock.now()).unwrap()
}

/// A fresh ticket already in `status`.
#[must_use]
pub fn ticket_in(status: TicketStatus, clock: &impl Clock) -> Ticket {
    Ticket::create(
        TicketId::new(),
        new_ticket("Printer jammed").with_status(status),
        clock.now(),
    )
    .unwrap()
}

/// A fresh comment on `ticket_id` stamped with `clock`.
#[must_use]
pub fn comment(ticket_id: TicketId, clock: &impl Clock) -> Comment {
    Comment::create(
        CommentId::new(),
        new_comment(ticket_id, "Have you tried turning it off and on again?"),
        clock.now(),
    )
    .unwrap()
}

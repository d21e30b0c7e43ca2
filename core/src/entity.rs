//! Ticket and comment records.
//!
//! Shared field groups ([`Timestamps`], [`Audit`]) are plain records embedded
//! into each entity with `#[serde(flatten)]`, so serialized entities stay flat
//! (`created_at`, `created_by`, … next to the entity's own fields).

use crate::error::{Result, TicketError};
use crate::status::TicketStatus;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a comment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(Uuid);

impl CommentId {
    /// Creates a new random `CommentId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CommentId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CommentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Entity kinds
// ============================================================================

/// Kind of persisted entity. Used for cache keys and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A [`Ticket`]
    Ticket,
    /// A [`Comment`]
    Comment,
}

impl EntityKind {
    /// Key prefix / display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record that can be addressed by kind and id.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync {
    /// Identifier type
    type Id: fmt::Display + Copy + Send + Sync;

    /// Kind tag of this entity
    const KIND: EntityKind;

    /// This record's identifier
    fn id(&self) -> Self::Id;
}

// ============================================================================
// Shared field groups
// ============================================================================

/// Creation and last-update instants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Both instants set to `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Record an update at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Actors that created and last updated a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Actor that created the record
    pub created_by: String,
    /// Actor that last updated the record
    pub updated_by: String,
}

impl Audit {
    /// New audit group where the creator is also the last updater.
    #[must_use]
    pub fn created_by(actor: impl Into<String>) -> Self {
        let actor = actor.into();
        Self {
            updated_by: actor.clone(),
            created_by: actor,
        }
    }

    /// Record an update by `actor`.
    pub fn touch(&mut self, actor: &str) {
        actor.clone_into(&mut self.updated_by);
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A support ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier
    pub id: TicketId,
    /// Short summary
    pub title: String,
    /// Optional long description
    pub description: Option<String>,
    /// Reporter email
    pub email: String,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Starts at 1, incremented on every update
    pub version: i32,
    /// Creation/update instants
    #[serde(flatten)]
    pub timestamps: Timestamps,
    /// Creation/update actors
    #[serde(flatten)]
    pub audit: Audit,
}

impl Ticket {
    /// Build a ticket from validated input.
    ///
    /// Status defaults to [`TicketStatus::Open`] unless the request names one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TicketError::Validation`] if `new` is invalid.
    pub fn create(id: TicketId, new: NewTicket, now: DateTime<Utc>) -> Result<Self> {
        new.validate()?;

        Ok(Self {
            id,
            title: new.title,
            description: new.description,
            email: new.email,
            status: new.status.unwrap_or_default(),
            version: 1,
            timestamps: Timestamps::new(now),
            audit: Audit::created_by(new.created_by),
        })
    }

    /// Copy of this ticket with `patch` applied and the version bumped.
    ///
    /// Applies the status verbatim; transition legality is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::VersionConflict`] if the version is already
    /// `i32::MAX` and cannot be bumped.
    pub fn patched(&self, patch: &TicketPatch, now: DateTime<Utc>) -> Result<Self> {
        let version = self
            .version
            .checked_add(1)
            .ok_or(TicketError::VersionConflict {
                id: self.id,
                expected: self.version,
            })?;
        let mut next = self.clone();

        if let Some(title) = &patch.title {
            next.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            next.description.clone_from(description);
        }
        if let Some(email) = &patch.email {
            next.email.clone_from(email);
        }
        if let Some(status) = patch.status {
            next.status = status;
        }

        next.version = version;
        next.timestamps.touch(now);
        next.audit.touch(&patch.updated_by);
        Ok(next)
    }
}

impl Entity for Ticket {
    type Id = TicketId;
    const KIND: EntityKind = EntityKind::Ticket;

    fn id(&self) -> TicketId {
        self.id
    }
}

/// Input for creating a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    /// Short summary (required)
    pub title: String,
    /// Optional long description
    #[serde(default)]
    pub description: Option<String>,
    /// Reporter email (required)
    pub email: String,
    /// Explicit initial status; `open` when absent
    #[serde(default)]
    pub status: Option<TicketStatus>,
    /// Creating actor (required)
    pub created_by: String,
}

impl NewTicket {
    /// Ticket request with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        email: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            email: email.into(),
            status: None,
            created_by: created_by.into(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an explicit initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check required fields and formats.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TicketError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        validation::validate_title(&self.title)?;
        validation::validate_email(&self.email)?;
        validation::validate_actor("created_by", &self.created_by)
    }
}

/// Partial update of a ticket. Only `Some` fields are applied.
///
/// `description` is three-state: absent leaves it alone, `null` clears it,
/// a string replaces it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description; `Some(None)` clears it
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    /// New reporter email
    #[serde(default)]
    pub email: Option<String>,
    /// Requested status change
    #[serde(default)]
    pub status: Option<TicketStatus>,
    /// Updating actor (required)
    pub updated_by: String,
}

impl TicketPatch {
    /// Empty patch attributed to `updated_by`.
    #[must_use]
    pub fn new(updated_by: impl Into<String>) -> Self {
        Self {
            title: None,
            description: None,
            email: None,
            status: None,
            updated_by: updated_by.into(),
        }
    }

    /// Request a status change.
    #[must_use]
    pub const fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Change the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Change the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Remove the description.
    #[must_use]
    pub fn without_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Change the reporter email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Check the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TicketError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validation::validate_title(title)?;
        }
        if let Some(email) = &self.email {
            validation::validate_email(email)?;
        }
        validation::validate_actor("updated_by", &self.updated_by)
    }
}

/// Deserialize a field that was present in the input, `null` included.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A ticket as it was before the update that produced `version + 1`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketVersion {
    /// Ticket this snapshot belongs to
    pub ticket_id: TicketId,
    /// Version of the snapshot
    pub version: i32,
    /// Full ticket state at that version
    pub snapshot: Ticket,
    /// When the snapshot was superseded
    pub archived_at: DateTime<Utc>,
}

impl TicketVersion {
    /// Archive `previous`, superseded at `archived_at`.
    #[must_use]
    pub fn archive(previous: &Ticket, archived_at: DateTime<Utc>) -> Self {
        Self {
            ticket_id: previous.id,
            version: previous.version,
            snapshot: previous.clone(),
            archived_at,
        }
    }
}

// ============================================================================
// Comment
// ============================================================================

/// A note attached to exactly one ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier
    pub id: CommentId,
    /// Owning ticket
    pub ticket_id: TicketId,
    /// Comment text
    pub body: String,
    /// Reporter email
    pub email: String,
    /// Creation/update instants
    #[serde(flatten)]
    pub timestamps: Timestamps,
    /// Creation/update actors
    #[serde(flatten)]
    pub audit: Audit,
}

impl Comment {
    /// Build a comment from validated input.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TicketError::Validation`] if `new` is invalid.
    pub fn create(id: CommentId, new: NewComment, now: DateTime<Utc>) -> Result<Self> {
        new.validate()?;

        Ok(Self {
            id,
            ticket_id: new.ticket_id,
            body: new.body,
            email: new.email,
            timestamps: Timestamps::new(now),
            audit: Audit::created_by(new.created_by),
        })
    }

    /// Copy of this comment with `patch` applied.
    #[must_use]
    pub fn patched(&self, patch: &CommentPatch, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if let Some(body) = &patch.body {
            next.body.clone_from(body);
        }
        next.timestamps.touch(now);
        next.audit.touch(&patch.updated_by);
        next
    }
}

impl Entity for Comment {
    type Id = CommentId;
    const KIND: EntityKind = EntityKind::Comment;

    fn id(&self) -> CommentId {
        self.id
    }
}

/// Input for creating a comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Ticket to comment on
    pub ticket_id: TicketId,
    /// Comment text (required)
    pub body: String,
    /// Reporter email (required)
    pub email: String,
    /// Creating actor (required)
    pub created_by: String,
}

impl NewComment {
    /// Comment request with all required fields.
    #[must_use]
    pub fn new(
        ticket_id: TicketId,
        body: impl Into<String>,
        email: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            ticket_id,
            body: body.into(),
            email: email.into(),
            created_by: created_by.into(),
        }
    }

    /// Check required fields and formats.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TicketError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        validation::validate_required("body", &self.body)?;
        validation::validate_email(&self.email)?;
        validation::validate_actor("created_by", &self.created_by)
    }
}

/// Partial update of a comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPatch {
    /// New body
    #[serde(default)]
    pub body: Option<String>,
    /// Updating actor (required)
    pub updated_by: String,
}

impl CommentPatch {
    /// Replace the body.
    #[must_use]
    pub fn body(body: impl Into<String>, updated_by: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            updated_by: updated_by.into(),
        }
    }

    /// Check the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TicketError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if let Some(body) = &self.body {
            validation::validate_required("body", body)?;
        }
        validation::validate_actor("updated_by", &self.updated_by)
    }
}

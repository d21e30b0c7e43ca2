//! [`TicketStore`] over the `tickets` and `tickets_history` tables.

use crate::{PostgresStore, db_error, decode_error, page_bounds};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use ticketdesk_core::{
    Audit, EntityKind, Page, Result, Ticket, TicketError, TicketId, TicketStatus, TicketStore,
    TicketVersion, Timestamps,
};
use uuid::Uuid;

const TICKET_COLUMNS: &str = "id, title, description, email, status, version, \
                              created_at, updated_at, created_by, updated_by";

impl TicketStore for PostgresStore {
    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("load ticket", &e))?;

        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn find_ticket_page(&self, page: Page) -> Result<Vec<Ticket>> {
        let (limit, offset) = page_bounds(page)?;
        let rows = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list tickets", &e))?;

        rows.iter().map(ticket_from_row).collect()
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO tickets
                (id, title, description, email, status, version,
                 created_at, updated_at, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {TICKET_COLUMNS}
            "
        ))
        .bind(*ticket.id.as_uuid())
        .bind(&ticket.title)
        .bind(ticket.description.as_deref())
        .bind(&ticket.email)
        .bind(ticket.status.as_str())
        .bind(ticket.version)
        .bind(ticket.timestamps.created_at)
        .bind(ticket.timestamps.updated_at)
        .bind(&ticket.audit.created_by)
        .bind(&ticket.audit.updated_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("insert ticket", &e))?;

        tracing::debug!(ticket_id = %ticket.id, "Inserted ticket row");
        ticket_from_row(&row)
    }

    async fn update_ticket(&self, previous: &Ticket, updated: &Ticket) -> Result<Ticket> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", &e))?;

        // The stored row is returned so callers see timestamps at column precision.
        let row = sqlx::query(&format!(
            r"
            UPDATE tickets
            SET title = $3,
                description = $4,
                email = $5,
                status = $6,
                version = $7,
                updated_at = $8,
                updated_by = $9
            WHERE id = $1 AND version = $2
            RETURNING {TICKET_COLUMNS}
            "
        ))
        .bind(*previous.id.as_uuid())
        .bind(previous.version)
        .bind(&updated.title)
        .bind(updated.description.as_deref())
        .bind(&updated.email)
        .bind(updated.status.as_str())
        .bind(updated.version)
        .bind(updated.timestamps.updated_at)
        .bind(&updated.audit.updated_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("update ticket", &e))?;

        let Some(row) = row else {
            let exists: Option<(i32,)> =
                sqlx::query_as("SELECT version FROM tickets WHERE id = $1")
                    .bind(*previous.id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| db_error("check ticket version", &e))?;

            // Dropping `tx` rolls back.
            return Err(match exists {
                None => TicketError::not_found(EntityKind::Ticket, previous.id),
                Some((current,)) => {
                    tracing::warn!(
                        ticket_id = %previous.id,
                        expected = previous.version,
                        current,
                        "Ticket version conflict"
                    );
                    TicketError::VersionConflict {
                        id: previous.id,
                        expected: previous.version,
                    }
                }
            });
        };
        let stored = ticket_from_row(&row)?;

        let archived = TicketVersion::archive(previous, updated.timestamps.updated_at);
        sqlx::query(
            r"
            INSERT INTO tickets_history (ticket_id, version, snapshot, archived_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(*archived.ticket_id.as_uuid())
        .bind(archived.version)
        .bind(Json(&archived.snapshot))
        .bind(archived.archived_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("archive ticket version", &e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit ticket update", &e))?;

        Ok(stored)
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!(
            "DELETE FROM tickets WHERE id = $1 RETURNING {TICKET_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("delete ticket", &e))?;

        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn ticket_history(&self, id: TicketId) -> Result<Vec<TicketVersion>> {
        let rows = sqlx::query(
            r"
            SELECT ticket_id, version, snapshot, archived_at
            FROM tickets_history
            WHERE ticket_id = $1
            ORDER BY version ASC
            ",
        )
        .bind(*id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load ticket history", &e))?;

        rows.iter().map(version_from_row).collect()
    }
}

fn ticket_from_row(row: &PgRow) -> Result<Ticket> {
    let status: String = row.try_get("status").map_err(|e| decode_error("status", &e))?;
    let status: TicketStatus = status
        .parse()
        .map_err(|e: TicketError| TicketError::Serialization(e.to_string()))?;

    Ok(Ticket {
        id: TicketId::from_uuid(column::<Uuid>(row, "id")?),
        title: column(row, "title")?,
        description: column(row, "description")?,
        email: column(row, "email")?,
        status,
        version: column(row, "version")?,
        timestamps: Timestamps {
            created_at: column::<DateTime<Utc>>(row, "created_at")?,
            updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
        },
        audit: Audit {
            created_by: column(row, "created_by")?,
            updated_by: column(row, "updated_by")?,
        },
    })
}

fn version_from_row(row: &PgRow) -> Result<TicketVersion> {
    let Json(snapshot): Json<Ticket> = column(row, "snapshot")?;
    Ok(TicketVersion {
        ticket_id: TicketId::from_uuid(column::<Uuid>(row, "ticket_id")?),
        version: column(row, "version")?,
        snapshot,
        archived_at: column(row, "archived_at")?,
    })
}

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| decode_error(name, &e))
}

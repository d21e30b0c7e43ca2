//! [`CommentStore`] over the `comments` table.

use crate::tickets::column;
use crate::{PostgresStore, db_error, page_bounds};
use sqlx::postgres::PgRow;
use ticketdesk_core::{
    Audit, Comment, CommentId, CommentStore, EntityKind, Page, Result, TicketError, TicketId,
    Timestamps,
};
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, ticket_id, body, email, \
                               created_at, updated_at, created_by, updated_by";

impl CommentStore for PostgresStore {
    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("load comment", &e))?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn find_comment_page(&self, page: Page) -> Result<Vec<Comment>> {
        let (limit, offset) = page_bounds(page)?;
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list comments", &e))?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn find_comments_for_ticket(
        &self,
        ticket_id: TicketId,
        page: Page,
    ) -> Result<Vec<Comment>> {
        let (limit, offset) = page_bounds(page)?;
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE ticket_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(*ticket_id.as_uuid())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list ticket comments", &e))?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<Comment> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO comments
                (id, ticket_id, body, email, created_at, updated_at, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COMMENT_COLUMNS}
            "
        ))
        .bind(*comment.id.as_uuid())
        .bind(*comment.ticket_id.as_uuid())
        .bind(&comment.body)
        .bind(&comment.email)
        .bind(comment.timestamps.created_at)
        .bind(comment.timestamps.updated_at)
        .bind(&comment.audit.created_by)
        .bind(&comment.audit.updated_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Parent ticket deleted between the status check and the insert
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return TicketError::not_found(EntityKind::Ticket, comment.ticket_id);
                }
            }
            db_error("insert comment", &e)
        })?;

        tracing::debug!(
            comment_id = %comment.id,
            ticket_id = %comment.ticket_id,
            "Inserted comment row"
        );
        comment_from_row(&row)
    }

    async fn update_comment(&self, comment: &Comment) -> Result<Comment> {
        let row = sqlx::query(&format!(
            r"
            UPDATE comments
            SET body = $2,
                updated_at = $3,
                updated_by = $4
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "
        ))
        .bind(*comment.id.as_uuid())
        .bind(&comment.body)
        .bind(comment.timestamps.updated_at)
        .bind(&comment.audit.updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("update comment", &e))?;

        match row {
            Some(row) => comment_from_row(&row),
            None => Err(TicketError::not_found(EntityKind::Comment, comment.id)),
        }
    }

    async fn delete_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("delete comment", &e))?;

        row.as_ref().map(comment_from_row).transpose()
    }
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    Ok(Comment {
        id: CommentId::from_uuid(column::<Uuid>(row, "id")?),
        ticket_id: TicketId::from_uuid(column::<Uuid>(row, "ticket_id")?),
        body: column(row, "body")?,
        email: column(row, "email")?,
        timestamps: Timestamps {
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        },
        audit: Audit {
            created_by: column(row, "created_by")?,
            updated_by: column(row, "updated_by")?,
        },
    })
}

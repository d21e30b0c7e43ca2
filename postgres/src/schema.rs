//! Bootstrap DDL.

/// Statements applied by [`crate::PostgresStore::initialize_schema`], in order.
pub const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS tickets (
        id UUID PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        email TEXT NOT NULL,
        status TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        created_by TEXT NOT NULL,
        updated_by TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_tickets_created ON tickets(created_at, id)",
    r"
    CREATE TABLE IF NOT EXISTS comments (
        id UUID PRIMARY KEY,
        ticket_id UUID NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
        body TEXT NOT NULL,
        email TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        created_by TEXT NOT NULL,
        updated_by TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_comments_ticket ON comments(ticket_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_created ON comments(created_at, id)",
    r"
    CREATE TABLE IF NOT EXISTS tickets_history (
        ticket_id UUID NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
        version INTEGER NOT NULL,
        snapshot JSONB NOT NULL,
        archived_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (ticket_id, version)
    )
    ",
];

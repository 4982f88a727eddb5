//! Schema bootstrap for the conversation store
//!
//! The tables are created at startup if they do not exist yet, mirroring the
//! way the product is deployed (a single Postgres database owned by this
//! service).

use deadpool_postgres::Pool;

use crate::store::error::Result;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id                UUID PRIMARY KEY,
    title             TEXT,
    conversation_type TEXT NOT NULL DEFAULT 'FREE_CHAT',
    role_character    TEXT,
    message_count     INTEGER NOT NULL DEFAULT 0,
    status            TEXT NOT NULL DEFAULT 'ACTIVE',
    created_at        TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS messages (
    id              UUID PRIMARY KEY,
    conversation_id UUID NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    role            TEXT NOT NULL,
    content         TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS messages_conversation_created_idx
    ON messages (conversation_id, created_at);

CREATE TABLE IF NOT EXISTS grammar_feedback (
    id             UUID PRIMARY KEY,
    message_id     UUID NOT NULL UNIQUE REFERENCES messages(id) ON DELETE CASCADE,
    original_text  TEXT NOT NULL,
    corrected_text TEXT NOT NULL,
    has_errors     BOOLEAN NOT NULL DEFAULT FALSE,
    errors         JSONB NOT NULL DEFAULT '[]',
    created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
);
"#;

/// Create the store tables if they are missing
pub async fn ensure_schema(pool: &Pool) -> Result<()> {
    let conn = pool.get().await?;
    conn.batch_execute(SCHEMA_SQL).await?;
    Ok(())
}

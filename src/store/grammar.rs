//! Grammar feedback persistence

use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::grammar::types::{GrammarFeedback, GrammarIssue};
use crate::store::error::{Error, Result};

fn row_to_feedback(row: &Row) -> Result<GrammarFeedback> {
    let errors: serde_json::Value = row.get("errors");
    let errors: Vec<GrammarIssue> = serde_json::from_value(errors)?;

    Ok(GrammarFeedback {
        id: row.get("id"),
        message_id: row.get("message_id"),
        original_text: row.get("original_text"),
        corrected_text: row.get("corrected_text"),
        has_errors: row.get("has_errors"),
        errors,
        created_at: row.get("created_at"),
    })
}

/// Insert a grammar feedback row
///
/// Feedback is unique per message; inserting twice for the same message is a
/// database error surfaced to the caller.
pub async fn insert_feedback(pool: &Pool, feedback: &GrammarFeedback) -> Result<()> {
    let conn = pool.get().await?;
    let errors = serde_json::to_value(&feedback.errors)?;
    conn.execute(
        "INSERT INTO grammar_feedback \
         (id, message_id, original_text, corrected_text, has_errors, errors, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
        &[
            &feedback.id,
            &feedback.message_id,
            &feedback.original_text,
            &feedback.corrected_text,
            &feedback.has_errors,
            &errors,
            &feedback.created_at,
        ],
    )
    .await?;
    Ok(())
}

/// Find the feedback stored for a message
pub async fn find_by_message_id(pool: &Pool, message_id: Uuid) -> Result<GrammarFeedback> {
    find_by_message_id_opt(pool, message_id).await?.ok_or_else(|| {
        Error::NotFoundError(format!(
            "Grammar feedback for message {} not found",
            message_id
        ))
    })
}

/// Find the feedback stored for a message, if any
pub async fn find_by_message_id_opt(
    pool: &Pool,
    message_id: Uuid,
) -> Result<Option<GrammarFeedback>> {
    let conn = pool.get().await?;
    let row = conn
        .query_opt(
            "SELECT id, message_id, original_text, corrected_text, has_errors, errors, created_at \
             FROM grammar_feedback WHERE message_id = $1",
            &[&message_id],
        )
        .await?;
    row.as_ref().map(row_to_feedback).transpose()
}

/// Feedback counts over an optional trailing window of days
///
/// Returns `(total, with_errors)`.
pub async fn stats(pool: &Pool, days: Option<i64>) -> Result<(i64, i64)> {
    let conn = pool.get().await?;
    let row = match days {
        Some(days) => {
            conn.query_one(
                "SELECT COUNT(*) AS total, \
                        COUNT(*) FILTER (WHERE has_errors) AS with_errors \
                 FROM grammar_feedback \
                 WHERE created_at >= now() - ($1::BIGINT * interval '1 day')",
                &[&days],
            )
            .await?
        }
        None => {
            conn.query_one(
                "SELECT COUNT(*) AS total, \
                        COUNT(*) FILTER (WHERE has_errors) AS with_errors \
                 FROM grammar_feedback",
                &[],
            )
            .await?
        }
    };
    Ok((row.get("total"), row.get("with_errors")))
}

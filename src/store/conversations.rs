//! Conversation and message persistence

use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::grammar::types::{GrammarFeedback, GrammarIssue};
use crate::store::error::{Error, Result};
use crate::store::types::{
    Conversation, ConversationStatus, ConversationType, MessageRole, StoredMessage,
};

fn row_to_conversation(row: &Row) -> Result<Conversation> {
    let conversation_type: String = row.get("conversation_type");
    let status: String = row.get("status");

    Ok(Conversation {
        id: row.get("id"),
        title: row.get("title"),
        conversation_type: ConversationType::parse(&conversation_type)?,
        role_character: row.get("role_character"),
        message_count: row.get("message_count"),
        status: ConversationStatus::parse(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn row_to_message(row: &Row) -> Result<StoredMessage> {
    let role: String = row.get("role");

    Ok(StoredMessage {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        role: MessageRole::parse(&role)?,
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}

/// Insert a new conversation
pub async fn insert_conversation(pool: &Pool, conversation: &Conversation) -> Result<()> {
    let conn = pool.get().await?;
    conn.execute(
        "INSERT INTO conversations \
         (id, title, conversation_type, role_character, message_count, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        &[
            &conversation.id,
            &conversation.title,
            &conversation.conversation_type.as_str(),
            &conversation.role_character,
            &conversation.message_count,
            &conversation.status.as_str(),
            &conversation.created_at,
            &conversation.updated_at,
        ],
    )
    .await?;
    Ok(())
}

/// Find a conversation by id
pub async fn find_conversation(pool: &Pool, conversation_id: Uuid) -> Result<Conversation> {
    let conn = pool.get().await?;
    let row = conn
        .query_opt(
            "SELECT id, title, conversation_type, role_character, message_count, status, \
             created_at, updated_at FROM conversations WHERE id = $1",
            &[&conversation_id],
        )
        .await?
        .ok_or_else(|| {
            Error::NotFoundError(format!("Conversation {} not found", conversation_id))
        })?;
    row_to_conversation(&row)
}

/// List conversations, most recent first
pub async fn list_conversations(pool: &Pool, limit: i64, offset: i64) -> Result<Vec<Conversation>> {
    let conn = pool.get().await?;
    let rows = conn
        .query(
            "SELECT id, title, conversation_type, role_character, message_count, status, \
             created_at, updated_at FROM conversations \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            &[&limit, &offset],
        )
        .await?;
    rows.iter().map(row_to_conversation).collect()
}

/// Update the status of a conversation
pub async fn update_status(
    pool: &Pool,
    conversation_id: Uuid,
    status: ConversationStatus,
) -> Result<()> {
    let conn = pool.get().await?;
    let updated = conn
        .execute(
            "UPDATE conversations SET status = $2, updated_at = now() WHERE id = $1",
            &[&conversation_id, &status.as_str()],
        )
        .await?;
    if updated == 0 {
        return Err(Error::NotFoundError(format!(
            "Conversation {} not found",
            conversation_id
        )));
    }
    Ok(())
}

/// Update the message count of a conversation
pub async fn update_message_count(pool: &Pool, conversation_id: Uuid, count: i32) -> Result<()> {
    let conn = pool.get().await?;
    let updated = conn
        .execute(
            "UPDATE conversations SET message_count = $2, updated_at = now() WHERE id = $1",
            &[&conversation_id, &count],
        )
        .await?;
    if updated == 0 {
        return Err(Error::NotFoundError(format!(
            "Conversation {} not found",
            conversation_id
        )));
    }
    Ok(())
}

/// Delete a conversation; messages and feedback cascade
pub async fn delete_conversation(pool: &Pool, conversation_id: Uuid) -> Result<()> {
    let conn = pool.get().await?;
    let deleted = conn
        .execute(
            "DELETE FROM conversations WHERE id = $1",
            &[&conversation_id],
        )
        .await?;
    if deleted == 0 {
        return Err(Error::NotFoundError(format!(
            "Conversation {} not found",
            conversation_id
        )));
    }
    Ok(())
}

/// Insert a message
pub async fn insert_message(pool: &Pool, message: &StoredMessage) -> Result<()> {
    let conn = pool.get().await?;
    conn.execute(
        "INSERT INTO messages (id, conversation_id, role, content, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
        &[
            &message.id,
            &message.conversation_id,
            &message.role.as_str(),
            &message.content,
            &message.created_at,
        ],
    )
    .await?;
    Ok(())
}

/// Find a message by id
pub async fn find_message(pool: &Pool, message_id: Uuid) -> Result<StoredMessage> {
    let conn = pool.get().await?;
    let row = conn
        .query_opt(
            "SELECT id, conversation_id, role, content, created_at \
             FROM messages WHERE id = $1",
            &[&message_id],
        )
        .await?
        .ok_or_else(|| Error::NotFoundError(format!("Message {} not found", message_id)))?;
    row_to_message(&row)
}

/// List messages of a conversation in chronological order, each with its
/// grammar feedback when one has been stored
pub async fn list_messages(
    pool: &Pool,
    conversation_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<(StoredMessage, Option<GrammarFeedback>)>> {
    let conn = pool.get().await?;
    let rows = conn
        .query(
            "SELECT m.id, m.conversation_id, m.role, m.content, m.created_at, \
                    f.id AS feedback_id, f.original_text, f.corrected_text, \
                    f.has_errors, f.errors, f.created_at AS feedback_created_at \
             FROM messages m \
             LEFT JOIN grammar_feedback f ON f.message_id = m.id \
             WHERE m.conversation_id = $1 \
             ORDER BY m.created_at, m.id LIMIT $2 OFFSET $3",
            &[&conversation_id, &limit, &offset],
        )
        .await?;

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        let message = row_to_message(row)?;
        let feedback = match row.get::<_, Option<Uuid>>("feedback_id") {
            Some(feedback_id) => {
                let errors: serde_json::Value = row.get("errors");
                let errors: Vec<GrammarIssue> = serde_json::from_value(errors)?;
                Some(GrammarFeedback {
                    id: feedback_id,
                    message_id: message.id,
                    original_text: row.get("original_text"),
                    corrected_text: row.get("corrected_text"),
                    has_errors: row.get("has_errors"),
                    errors,
                    created_at: row.get("feedback_created_at"),
                })
            }
            None => None,
        };
        result.push((message, feedback));
    }
    Ok(result)
}

/// The last `turns` turns of a conversation in chronological order
///
/// A turn is a user message plus the assistant reply, so this fetches up to
/// `turns * 2` messages.
pub async fn recent_messages(
    pool: &Pool,
    conversation_id: Uuid,
    turns: usize,
) -> Result<Vec<StoredMessage>> {
    let conn = pool.get().await?;
    let limit = (turns * 2) as i64;
    let rows = conn
        .query(
            "SELECT id, conversation_id, role, content, created_at \
             FROM messages WHERE conversation_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
            &[&conversation_id, &limit],
        )
        .await?;

    let mut messages: Vec<StoredMessage> =
        rows.iter().map(row_to_message).collect::<Result<_>>()?;
    messages.reverse();
    Ok(messages)
}

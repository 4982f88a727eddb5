// Conversation endpoints

use tracing::info;
use uuid::Uuid;

use crate::conversation::ConversationService;
use crate::models::{Envelope, PageParams, SendMessageRequest, StartConversationRequest};
use crate::state::AppState;

pub async fn start_conversation_handler(
    state: AppState,
    request: StartConversationRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!("POST /api/conversations/start");

    let service = ConversationService::new(&state);
    let response = service.start(request).await.map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::with_message(
        response,
        "conversation started",
    )))
}

pub async fn send_message_handler(
    conversation_id: Uuid,
    state: AppState,
    request: SendMessageRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%conversation_id, "POST /api/conversations/{}/message", conversation_id);

    let service = ConversationService::new(&state);
    let response = service
        .continue_conversation(conversation_id, request)
        .await
        .map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::new(response)))
}

pub async fn list_conversations_handler(
    state: AppState,
    page: PageParams,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!("GET /api/conversations");

    let service = ConversationService::new(&state);
    let conversations = service
        .list(page.limit(), page.offset())
        .await
        .map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::new(conversations)))
}

pub async fn get_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%conversation_id, "GET /api/conversations/{}", conversation_id);

    let service = ConversationService::new(&state);
    let conversation = service.get(conversation_id).await.map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::new(conversation)))
}

pub async fn get_messages_handler(
    conversation_id: Uuid,
    state: AppState,
    page: PageParams,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%conversation_id, "GET /api/conversations/{}/messages", conversation_id);

    let service = ConversationService::new(&state);
    let messages = service
        .messages(conversation_id, page.limit(), page.offset())
        .await
        .map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::new(messages)))
}

pub async fn end_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%conversation_id, "PUT /api/conversations/{}/end", conversation_id);

    let service = ConversationService::new(&state);
    service.end(conversation_id).await.map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::with_message(
        serde_json::json!({}),
        "conversation ended",
    )))
}

pub async fn delete_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%conversation_id, "DELETE /api/conversations/{}", conversation_id);

    let service = ConversationService::new(&state);
    service
        .delete(conversation_id)
        .await
        .map_err(|e| e.reject())?;

    Ok(warp::reply::json(&Envelope::with_message(
        serde_json::json!({}),
        "conversation deleted",
    )))
}

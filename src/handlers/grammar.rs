// Grammar endpoints, including the one-shot feedback stream

use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::grammar::service::parse_time_range;
use crate::grammar::GrammarService;
use crate::models::{CheckGrammarRequest, Envelope, StatsParams};
use crate::sse;
use crate::state::AppState;

fn grammar_service(state: &AppState) -> GrammarService {
    GrammarService::new(
        state.store.clone(),
        state.provider.clone(),
        state.settings.clone(),
    )
}

pub async fn check_grammar_handler(
    state: AppState,
    request: CheckGrammarRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!("POST /api/grammar/check");

    let text = request.text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Invalid("text must not be empty".to_string()).reject());
    }

    let service = grammar_service(&state);
    let analysis = service
        .check(&text, None)
        .await
        .map_err(|e| AppError::from(e).reject())?;

    Ok(warp::reply::json(&Envelope::new(analysis)))
}

pub async fn get_feedback_handler(
    message_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%message_id, "GET /api/grammar/message/{}", message_id);

    let service = grammar_service(&state);
    let feedback = service
        .feedback_for_message(message_id)
        .await
        .map_err(|e| AppError::from(e).reject())?;

    Ok(warp::reply::json(&Envelope::new(feedback)))
}

pub async fn stats_handler(
    state: AppState,
    params: StatsParams,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!("GET /api/grammar/stats");

    let days = parse_time_range(params.time_range.as_deref())
        .map_err(|reason| AppError::Invalid(reason).reject())?;

    let service = grammar_service(&state);
    let stats = service
        .stats(days)
        .await
        .map_err(|e| AppError::from(e).reject())?;

    Ok(warp::reply::json(&Envelope::new(stats)))
}

/// One-shot SSE stream delivering the grammar feedback for a user message
///
/// Emits a `grammar_feedback` event once the analysis is available, then a
/// `done` event, and ends the stream.
pub async fn stream_feedback_handler(
    message_id: Uuid,
    state: AppState,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!(%message_id, "GET /api/grammar/stream/{}", message_id);

    // Subscribe before the lookup; the grammar task persists the row before
    // publishing, so whichever side wins the race the feedback is observed.
    let mut rx = state.hub.subscribe(message_id);
    let stored = state
        .store
        .find_feedback_opt(message_id)
        .await
        .map_err(|e| AppError::from(e).reject())?;

    let hub = state.hub.clone();
    let stream = async_stream::stream! {
        let feedback = match stored {
            Some(feedback) => {
                // The subscription turned out to be unnecessary
                drop(rx);
                hub.prune(message_id);
                Some(feedback)
            }
            None => {
                let changed = rx.changed().await;
                match changed {
                    Ok(()) => rx.borrow().clone(),
                    Err(_) => None,
                }
            }
        };

        if let Some(feedback) = &feedback {
            yield sse::grammar_feedback_event(feedback);
        }
        yield sse::done_event();
    };

    Ok(warp::sse::reply(warp::sse::keep_alive().stream(stream)))
}

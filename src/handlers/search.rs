// Search endpoint

use tracing::info;

use crate::error::AppError;
use crate::models::{Envelope, SearchRequest};
use crate::state::AppState;

pub async fn search_handler(
    state: AppState,
    request: SearchRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    info!("POST /api/search");

    let client = state.search.as_ref().ok_or_else(|| {
        AppError::Upstream("web search is not configured (TAVILY_API_KEY is missing)".to_string())
            .reject()
    })?;

    let result = client
        .search(&request.query)
        .await
        .map_err(|e| AppError::from(e).reject())?;

    Ok(warp::reply::json(&Envelope::new(result)))
}

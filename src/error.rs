//! Application error taxonomy and warp rejection handling

use std::convert::Infallible;

use thiserror::Error;
use tracing::error;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::llm::LlmError;
use crate::models::ErrorBody;
use crate::search::SearchError;
use crate::store;

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request was understood but is invalid
    #[error("{0}")]
    Invalid(String),

    /// An upstream vendor rate limit was hit
    #[error("{0}")]
    RateLimited(String),

    /// An upstream vendor call failed
    #[error("{0}")]
    Upstream(String),

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Invalid(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap into a warp rejection
    pub fn reject(self) -> Rejection {
        warp::reject::custom(self)
    }
}

impl warp::reject::Reject for AppError {}

impl From<store::Error> for AppError {
    fn from(err: store::Error) -> Self {
        match err {
            store::Error::NotFoundError(msg) => AppError::NotFound(msg),
            store::Error::ValidationError(msg) => AppError::Invalid(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimitExceeded { .. } => AppError::RateLimited(
                "The model's usage limit was reached. Please try again in a minute or two."
                    .to_string(),
            ),
            LlmError::AuthenticationError(msg) => AppError::Upstream(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// Map rejections to the JSON error envelope
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorBody::new("route not found"))
    } else if let Some(app_err) = err.find::<AppError>() {
        if app_err.status() == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {}", app_err);
        }
        (app_err.status(), ErrorBody::new(app_err.to_string()))
    } else if let Some(deser) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, ErrorBody::new(deser.to_string()))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("invalid query parameters"),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody::new("method not allowed"),
        )
    } else {
        error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("internal server error"),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

// Health check endpoints

use std::convert::Infallible;

pub async fn root_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "ok",
        "message": "English conversation learning API",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

pub async fn health_handler() -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "database": "connected",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

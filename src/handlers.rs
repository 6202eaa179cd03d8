use super::error::Error;
use super::models::State;
use super::tasks;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;

pub async fn booking(body: Bytes, state: State) -> Result<impl warp::Reply, Infallible> {
    log::debug!(
        "incoming booking web hook: {}",
        String::from_utf8_lossy(&body)
    );

    let status = match handle_booking(&body, state).await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            log::error!("failed to handle booking web hook: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    Ok(warp::reply::with_status(warp::reply::json(&reply_body(status)), status))
}

async fn handle_booking(body: &[u8], state: State) -> Result<(), Error> {
    let payload = serde_json::from_slice(body)?;
    tasks::notify(state, payload).await
}

fn reply_body(status: StatusCode) -> serde_json::Value {
    if status.is_success() {
        serde_json::json!({ "status": "ok" })
    } else {
        serde_json::json!({ "status": "error", "message": "internal server error" })
    }
}

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("push API responded with {status}: {body}")]
    Api { status: StatusCode, body: String },
}

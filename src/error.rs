use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Invalid secret")]
    InvalidSecret,

    #[error("Validation error on field '{field}': {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Job queue is full")]
    QueueFull,

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type DeployResult<T> = Result<T, DeployError>;

impl IntoResponse for DeployError {
    fn into_response(self) -> Response {
        let status = match &self {
            DeployError::InvalidSecret => StatusCode::FORBIDDEN,
            DeployError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            DeployError::QueueFull => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Why an attachment's data URI could not be turned into text.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("data URI has no ',' separator")]
    MissingSeparator,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("LLM returned no HTML content")]
    EmptyContent,
}

/// Failure talking to the repository host. `operation` names the call that failed.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("could not resolve authenticated account: {0}")]
    Owner(#[source] HostError),

    #[error("could not create or reuse repository '{name}': {source}")]
    EnsureRepository {
        name: String,
        #[source]
        source: HostError,
    },

    #[error("could not write '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: HostError,
    },

    #[error("could not read tip of branch '{branch}': {source}")]
    CommitLookup {
        branch: String,
        #[source]
        source: HostError,
    },
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

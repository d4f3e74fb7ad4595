use crate::app_state::AppState;
use crate::config::is_http_url;
use crate::error::{DeployError, DeployResult};
use crate::jobs::Job;
use crate::models::TaskRequest;
use crate::webhook::verification::verify_shared_secret;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Accepts a job, checks it synchronously and queues it for the worker.
///
/// Returns immediately; the outcome only reaches the caller through the
/// evaluation URL.
pub async fn handle_task_request(
    State(state): State<AppState>,
    Json(request): Json<TaskRequest>,
) -> Response {
    match enqueue(&state, request) {
        Ok(job_id) => (
            StatusCode::OK,
            Json(json!({
                "status": "accepted",
                "message": "Request received. Processing in background.",
                "job_id": job_id,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

fn enqueue(state: &AppState, request: TaskRequest) -> DeployResult<Uuid> {
    if let Err(e) = verify_shared_secret(&state.config.project_secret, &request.secret) {
        warn!("Rejected request for task {}: invalid secret", request.task);
        return Err(e);
    }

    validate_request(&request)?;

    let job_id = Uuid::new_v4();
    info!(
        "Received valid request for task: {} (Round: {}), job {}",
        request.task, request.round, job_id
    );

    match state.job_sender.try_send(Job::DeploySite { job_id, request }) {
        Ok(()) => Ok(job_id),
        Err(TrySendError::Full(_)) => {
            warn!("Job queue full, rejecting job {}", job_id);
            Err(DeployError::QueueFull)
        }
        Err(TrySendError::Closed(_)) => {
            error!("Job worker is not running, dropping job {}", job_id);
            Err(DeployError::InternalError("job worker unavailable".to_string()))
        }
    }
}

fn validate_request(request: &TaskRequest) -> DeployResult<()> {
    if request.task.trim().is_empty() {
        return Err(DeployError::ValidationError {
            field: "task".to_string(),
            reason: "cannot be empty".to_string(),
        });
    }
    if !is_http_url(&request.evaluation_url) {
        return Err(DeployError::ValidationError {
            field: "evaluation_url".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }
    Ok(())
}

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

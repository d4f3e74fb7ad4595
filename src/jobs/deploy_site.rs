use crate::models::{NotificationOutcome, NotificationPayload, PublishResult, TaskRequest};
use crate::services::generator::ContentGenerator;
use crate::services::notifier::GraderNotifier;
use crate::services::publisher::RepositoryPublisher;
use crate::services::site_files;
use chrono::Datelike;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Collaborators shared by every deploy job.
#[derive(Clone)]
pub struct DeployContext {
    pub generator: ContentGenerator,
    pub publisher: RepositoryPublisher,
    pub notifier: GraderNotifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed(PublishResult),
    GenerationFailed(String),
    DeploymentFailed(String),
}

/// Runs one job to completion: generate, publish, notify.
///
/// Every path ends in exactly one notification attempt. Delivery failures are
/// logged by the notifier and not reflected in the returned outcome.
pub async fn execute(ctx: &DeployContext, job_id: Uuid, request: TaskRequest) -> DeployOutcome {
    info!(
        "--- Starting background job {} for task: {} (round {}) ---",
        job_id, request.task, request.round
    );

    let attachment_names: Vec<&str> = request.attachments.iter().map(|a| a.name.as_str()).collect();

    let html = match ctx.generator.generate(&request.brief, &attachment_names).await {
        Ok(html) => html,
        Err(e) => {
            error!("Job {}: LLM code generation failed: {}", job_id, e);
            let message = format!("LLM generation failed: {}", e);
            notify(ctx, &request, NotificationOutcome::Failed { error: message.clone() }).await;
            return DeployOutcome::GenerationFailed(message);
        }
    };

    let files = site_files::build_file_set(&request, html, chrono::Utc::now().year());
    let commit_message = site_files::commit_message(&request);

    info!("Job {}: pushing {} files to repo: {}", job_id, files.len(), request.task);

    let outcome = match ctx
        .publisher
        .publish(&request.task, &files, &commit_message)
        .await
    {
        Ok(result) => {
            info!(
                "Job {}: deployed. Repo: {}, Pages: {}",
                job_id, result.repo_url, result.pages_url
            );
            notify(ctx, &request, result.clone().into()).await;
            DeployOutcome::Deployed(result)
        }
        Err(e) => {
            error!("Job {}: GitHub deployment failed: {}", job_id, e);
            let message = format!("Deployment failed: {}", e);
            notify(ctx, &request, NotificationOutcome::Failed { error: message.clone() }).await;
            DeployOutcome::DeploymentFailed(message)
        }
    };

    info!("--- Finished background job {} for task: {} ---", job_id, request.task);
    outcome
}

async fn notify(ctx: &DeployContext, request: &TaskRequest, outcome: NotificationOutcome) {
    let payload = NotificationPayload::for_request(request, outcome);
    if let Err(e) = ctx.notifier.notify(&request.evaluation_url, &payload).await {
        // Nothing else to escalate to; the logs are the only record
        warn!(
            "Outcome for task {} (round {}) was not delivered: {}",
            request.task, request.round, e
        );
    }
}

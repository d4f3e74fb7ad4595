use crate::jobs::deploy_site::{self, DeployContext, DeployOutcome};
use crate::jobs::Job;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

/// Pulls jobs off the bounded queue and runs at most `max_concurrent` at once.
pub struct JobWorker {
    receiver: mpsc::Receiver<Job>,
    context: Arc<DeployContext>,
    slots: Arc<Semaphore>,
}

impl JobWorker {
    pub fn new(receiver: mpsc::Receiver<Job>, context: DeployContext, max_concurrent: usize) -> Self {
        Self {
            receiver,
            context: Arc::new(context),
            slots: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn start(mut self) {
        info!("Job worker started");

        while let Some(job) = self.receiver.recv().await {
            // Waiting here stops draining the queue, so a full pool pushes back on the handler
            let permit = match self.slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Job worker semaphore closed: {}", e);
                    break;
                }
            };

            // Spawn each job in a separate task to isolate panics and prevent worker death
            let context = self.context.clone();
            tokio::spawn(async move {
                Self::process_job(&context, job).await;
                drop(permit);
            });
        }

        info!("Job worker stopped");
    }

    async fn process_job(context: &DeployContext, job: Job) {
        match job {
            Job::DeploySite { job_id, request } => {
                match deploy_site::execute(context, job_id, request).await {
                    DeployOutcome::Deployed(result) => {
                        info!("Job {} completed: {}", job_id, result.pages_url);
                    }
                    DeployOutcome::GenerationFailed(message)
                    | DeployOutcome::DeploymentFailed(message) => {
                        warn!("Job {} failed: {}", job_id, message);
                    }
                }
            }
        }
    }
}

use crate::config::AppConfig;
use crate::jobs::Job;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub job_sender: mpsc::Sender<Job>,
}

impl AppState {
    pub fn new(config: AppConfig, job_sender: mpsc::Sender<Job>) -> Self {
        Self {
            config: Arc::new(config),
            job_sender,
        }
    }
}

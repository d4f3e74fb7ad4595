pub mod deploy_site;
pub mod worker;

use crate::models::TaskRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Job {
    DeploySite { job_id: Uuid, request: TaskRequest },
}

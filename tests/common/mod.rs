#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pages_deployer::adapters::{
    FileChange, PagesStatus, RemoteFile, RepoRef, Repository, RepositoryHost,
};
use pages_deployer::error::HostError;
use pages_deployer::models::{Attachment, TaskRequest};
use pages_deployer::AppConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const OWNER: &str = "octo";

// =============================================================================
// In-memory repository host
// =============================================================================

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub content: String,
    pub sha: String,
    pub message: String,
}

#[derive(Default)]
struct HostState {
    repos: HashMap<String, Repository>,
    files: HashMap<(String, String), StoredFile>,
    commits: usize,
    pages_enabled: HashMap<String, bool>,
    create_repo_calls: usize,
    create_file_calls: usize,
    update_file_calls: usize,
    fail_write_on: Option<String>,
}

/// Repository host that keeps everything in memory and counts calls.
#[derive(Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `path` fail with a 500.
    pub fn failing_on(path: &str) -> Self {
        let host = Self::new();
        host.state.lock().unwrap().fail_write_on = Some(path.to_string());
        host
    }

    pub fn repo_count(&self) -> usize {
        self.state.lock().unwrap().repos.len()
    }

    pub fn create_repo_calls(&self) -> usize {
        self.state.lock().unwrap().create_repo_calls
    }

    pub fn create_file_calls(&self) -> usize {
        self.state.lock().unwrap().create_file_calls
    }

    pub fn update_file_calls(&self) -> usize {
        self.state.lock().unwrap().update_file_calls
    }

    pub fn file(&self, repo: &str, path: &str) -> Option<StoredFile> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(repo.to_string(), path.to_string()))
            .cloned()
    }

    pub fn paths(&self, repo: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state
            .lock()
            .unwrap()
            .files
            .keys()
            .filter(|(r, _)| r == repo)
            .map(|(_, p)| p.clone())
            .collect();
        paths.sort();
        paths
    }

    pub fn pages_enabled(&self, repo: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .pages_enabled
            .get(repo)
            .copied()
            .unwrap_or(false)
    }

    fn commit(state: &mut HostState) -> String {
        state.commits += 1;
        format!("sha-{:04}", state.commits)
    }

    fn write(
        &self,
        repo: &RepoRef,
        change: FileChange<'_>,
        expected_sha: Option<&str>,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();

        if state.fail_write_on.as_deref() == Some(change.path) {
            return Err(HostError::Api {
                operation: "write file",
                status: 500,
                message: "simulated failure".to_string(),
            });
        }

        let key = (repo.name.clone(), change.path.to_string());
        match (state.files.get(&key), expected_sha) {
            (Some(_), None) => {
                return Err(HostError::Api {
                    operation: "create file",
                    status: 422,
                    message: "sha wasn't supplied".to_string(),
                })
            }
            (Some(existing), Some(sha)) if existing.sha != sha => {
                return Err(HostError::Api {
                    operation: "update file",
                    status: 409,
                    message: "sha does not match".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(HostError::Api {
                    operation: "update file",
                    status: 404,
                    message: "Not Found".to_string(),
                })
            }
            _ => {}
        }

        let sha = Self::commit(&mut state);
        state.files.insert(
            key,
            StoredFile {
                content: change.content.to_string(),
                sha,
                message: change.message.to_string(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl RepositoryHost for InMemoryHost {
    async fn authenticated_owner(&self) -> Result<String, HostError> {
        Ok(OWNER.to_string())
    }

    async fn get_repository(&self, repo: &RepoRef) -> Result<Option<Repository>, HostError> {
        Ok(self.state.lock().unwrap().repos.get(&repo.name).cloned())
    }

    async fn create_repository(&self, name: &str) -> Result<Repository, HostError> {
        let mut state = self.state.lock().unwrap();
        state.create_repo_calls += 1;

        if state.repos.contains_key(name) {
            return Err(HostError::Api {
                operation: "create repository",
                status: 422,
                message: "name already exists on this account".to_string(),
            });
        }

        let repo = Repository {
            owner: OWNER.to_string(),
            name: name.to_string(),
            html_url: format!("https://github.com/{}/{}", OWNER, name),
        };
        state.repos.insert(name.to_string(), repo.clone());
        Self::commit(&mut state);
        Ok(repo)
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        _branch: &str,
    ) -> Result<Option<RemoteFile>, HostError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .files
            .get(&(repo.name.clone(), path.to_string()))
            .map(|f| RemoteFile {
                path: path.to_string(),
                sha: f.sha.clone(),
            }))
    }

    async fn create_file(&self, repo: &RepoRef, change: FileChange<'_>) -> Result<(), HostError> {
        self.state.lock().unwrap().create_file_calls += 1;
        self.write(repo, change, None)
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        change: FileChange<'_>,
        sha: &str,
    ) -> Result<(), HostError> {
        self.state.lock().unwrap().update_file_calls += 1;
        self.write(repo, change, Some(sha))
    }

    async fn branch_tip(&self, _repo: &RepoRef, _branch: &str) -> Result<String, HostError> {
        let state = self.state.lock().unwrap();
        Ok(format!("sha-{:04}", state.commits))
    }

    async fn enable_pages(
        &self,
        repo: &RepoRef,
        _branch: &str,
        _path: &str,
    ) -> Result<PagesStatus, HostError> {
        let mut state = self.state.lock().unwrap();
        let already = state.pages_enabled.insert(repo.name.clone(), true).is_some();
        Ok(if already {
            PagesStatus::AlreadyEnabled
        } else {
            PagesStatus::Enabled
        })
    }
}

// =============================================================================
// Callback capture server
// =============================================================================

#[derive(Clone)]
struct CallbackState {
    hits: Arc<AtomicUsize>,
    failures_before_success: usize,
    received: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

/// Local HTTP endpoint standing in for the grader's evaluation URL.
pub struct CallbackServer {
    pub url: String,
    state: CallbackState,
}

impl CallbackServer {
    /// Responds 500 to the first `failures_before_success` requests, then 200.
    pub async fn start(failures_before_success: usize) -> Self {
        let state = CallbackState {
            hits: Arc::new(AtomicUsize::new(0)),
            failures_before_success,
            received: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/notify", post(record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind callback server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("callback server");
        });

        Self {
            url: format!("http://{}/notify", addr),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Payloads that were answered with 200.
    pub fn delivered(&self) -> Vec<Value> {
        self.state
            .received
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn idempotency_keys(&self) -> Vec<Option<String>> {
        self.state
            .received
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

async fn record(
    State(state): State<CallbackState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let attempt = state.hits.fetch_add(1, Ordering::SeqCst);
    if attempt < state.failures_before_success {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    state.received.lock().unwrap().push((key, body));
    StatusCode::OK
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn test_config() -> AppConfig {
    AppConfig {
        project_secret: "correct-horse".to_string(),
        github_token: "ghp_test".to_string(),
        llm_api_token: "llm-token".to_string(),
        llm_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        llm_model: "gpt-test".to_string(),
        llm_timeout_secs: 5,
        github_api_url: "http://127.0.0.1:9".to_string(),
        github_timeout_secs: 5,
        default_branch: "main".to_string(),
        repo_init_delay_ms: 0,
        host: "127.0.0.1".to_string(),
        port: 0,
        max_concurrent_jobs: 2,
        job_queue_capacity: 1,
        notify_max_attempts: 4,
        notify_initial_backoff_ms: 10,
        notify_timeout_secs: 2,
    }
}

pub fn task_request(task: &str, brief: &str, evaluation_url: &str) -> TaskRequest {
    TaskRequest {
        email: "student@example.com".to_string(),
        secret: "correct-horse".to_string(),
        task: task.to_string(),
        round: 1,
        nonce: "nonce-1".to_string(),
        brief: brief.to_string(),
        checks: vec![serde_json::json!("Page has a title")],
        evaluation_url: evaluation_url.to_string(),
        attachments: Vec::<Attachment>::new(),
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound job as posted to the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub email: String,
    pub secret: String,
    /// Doubles as the repository name.
    pub task: String,
    pub round: i64,
    pub nonce: String,
    pub brief: String,
    #[serde(default)]
    pub checks: Vec<Value>,
    pub evaluation_url: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// A named file submitted inline; `url` holds a `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishFile {
    pub path: String,
    pub content: String,
}

/// Files to commit, kept in insertion order with unique paths.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<PublishFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, replacing the content of an existing entry with the same path.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.content = content,
            None => self.files.push(PublishFile { path, content }),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub repo_url: String,
    pub pages_url: String,
    pub commit_sha: String,
}

/// Body POSTed to the evaluation URL. Exactly one outcome is attached.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub email: String,
    pub task: String,
    pub round: i64,
    pub nonce: String,
    #[serde(flatten)]
    pub outcome: NotificationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NotificationOutcome {
    Deployed {
        repo_url: String,
        commit_sha: String,
        pages_url: String,
    },
    Failed {
        error: String,
    },
}

impl NotificationPayload {
    pub fn for_request(request: &TaskRequest, outcome: NotificationOutcome) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            outcome,
        }
    }

    /// Key the callback receiver can use to drop duplicate deliveries.
    pub fn idempotency_key(&self) -> String {
        format!("{}:{}:{}", self.task, self.round, self.nonce)
    }
}

impl From<PublishResult> for NotificationOutcome {
    fn from(result: PublishResult) -> Self {
        NotificationOutcome::Deployed {
            repo_url: result.repo_url,
            commit_sha: result.commit_sha,
            pages_url: result.pages_url,
        }
    }
}

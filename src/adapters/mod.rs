pub mod github;
pub mod llm;

use crate::error::{GenerationError, HostError};
use async_trait::async_trait;

// =============================================================================
// Text generation
// =============================================================================

#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends a chat prompt and returns the first choice's raw text.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, GenerationError>;
}

// =============================================================================
// Repository hosting
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub html_url: String,
}

impl Repository {
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
        }
    }
}

/// A file that already exists on a branch; `sha` is the version token for updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
}

#[derive(Debug, Clone, Copy)]
pub struct FileChange<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
    pub branch: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagesStatus {
    Enabled,
    AlreadyEnabled,
}

/// Operations the publisher needs from a source-hosting provider.
///
/// Lookups return `Ok(None)` when the target does not exist so callers can
/// tell "absent" apart from a failed request.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    async fn authenticated_owner(&self) -> Result<String, HostError>;

    async fn get_repository(&self, repo: &RepoRef) -> Result<Option<Repository>, HostError>;

    /// Creates a public repository with an initial commit.
    async fn create_repository(&self, name: &str) -> Result<Repository, HostError>;

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteFile>, HostError>;

    async fn create_file(&self, repo: &RepoRef, change: FileChange<'_>) -> Result<(), HostError>;

    async fn update_file(
        &self,
        repo: &RepoRef,
        change: FileChange<'_>,
        sha: &str,
    ) -> Result<(), HostError>;

    async fn branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<String, HostError>;

    async fn enable_pages(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> Result<PagesStatus, HostError>;
}

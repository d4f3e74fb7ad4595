use crate::adapters::{FileChange, PagesStatus, RepoRef, Repository, RepositoryHost};
use crate::error::PublishError;
use crate::models::{FileSet, PublishResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Creates or reuses a repository, writes files into it and turns on Pages.
#[derive(Clone)]
pub struct RepositoryPublisher {
    host: Arc<dyn RepositoryHost>,
    branch: String,
    init_delay: Duration,
}

impl RepositoryPublisher {
    pub fn new(host: Arc<dyn RepositoryHost>, branch: String, init_delay: Duration) -> Self {
        Self {
            host,
            branch,
            init_delay,
        }
    }

    /// Files are written one commit at a time; if a write fails, earlier
    /// files stay committed and the whole publish is reported as failed.
    pub async fn publish(
        &self,
        repo_name: &str,
        files: &FileSet,
        commit_message: &str,
    ) -> Result<PublishResult, PublishError> {
        let owner = self
            .host
            .authenticated_owner()
            .await
            .map_err(PublishError::Owner)?;

        let repository = self.ensure_repository(&owner, repo_name).await?;
        let repo = repository.repo_ref();

        for file in files.iter() {
            let change = FileChange {
                path: &file.path,
                content: &file.content,
                message: commit_message,
                branch: &self.branch,
            };
            self.write_file(&repo, change).await?;
        }

        self.enable_pages(&repo).await;

        let commit_sha = self
            .host
            .branch_tip(&repo, &self.branch)
            .await
            .map_err(|source| PublishError::CommitLookup {
                branch: self.branch.clone(),
                source,
            })?;

        let result = PublishResult {
            repo_url: repository.html_url,
            pages_url: pages_url(&repo.owner, &repo.name),
            commit_sha,
        };

        info!(
            "Published {} files to {} (commit {})",
            files.len(),
            result.repo_url,
            result.commit_sha
        );

        Ok(result)
    }

    async fn ensure_repository(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Repository, PublishError> {
        let repo = RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        };
        let wrap = |source| PublishError::EnsureRepository {
            name: name.to_string(),
            source,
        };

        if let Some(existing) = self.host.get_repository(&repo).await.map_err(wrap)? {
            info!("Repo '{}' already exists. Updating files.", name);
            return Ok(existing);
        }

        info!("Creating new public repo: '{}'", name);
        let created = self.host.create_repository(name).await.map_err(wrap)?;

        // Default branch from auto_init appears asynchronously
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }

        Ok(created)
    }

    async fn write_file(&self, repo: &RepoRef, change: FileChange<'_>) -> Result<(), PublishError> {
        let wrap = |source| PublishError::WriteFile {
            path: change.path.to_string(),
            source,
        };

        match self
            .host
            .get_file(repo, change.path, change.branch)
            .await
            .map_err(wrap)?
        {
            Some(existing) => {
                self.host
                    .update_file(repo, change, &existing.sha)
                    .await
                    .map_err(wrap)?;
                info!("Updated file: {}", change.path);
            }
            None => {
                self.host.create_file(repo, change).await.map_err(wrap)?;
                info!("Created new file: {}", change.path);
            }
        }

        Ok(())
    }

    async fn enable_pages(&self, repo: &RepoRef) {
        match self.host.enable_pages(repo, &self.branch, "/").await {
            Ok(PagesStatus::Enabled) => {
                info!("GitHub Pages enabled at: {}", pages_url(&repo.owner, &repo.name));
            }
            Ok(PagesStatus::AlreadyEnabled) => {
                info!("GitHub Pages already enabled for {}/{}", repo.owner, repo.name);
            }
            Err(e) => {
                warn!(
                    "Could not enable GitHub Pages for {}/{} (continuing): {}",
                    repo.owner, repo.name, e
                );
            }
        }
    }
}

pub fn pages_url(owner: &str, repo: &str) -> String {
    format!("https://{}.github.io/{}/", owner, repo)
}

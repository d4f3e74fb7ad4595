use crate::adapters::{FileChange, PagesStatus, RemoteFile, RepoRef, Repository, RepositoryHost};
use crate::error::{DeployResult, HostError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const USER_AGENT: &str = concat!("pages-deployer/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client holding the account token for the process lifetime.
#[derive(Clone)]
pub struct GithubClient {
    http_client: Client,
    api_base: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    name: String,
    html_url: String,
    owner: Account,
}

impl From<RepositoryResponse> for Repository {
    fn from(repo: RepositoryResponse) -> Self {
        Repository {
            owner: repo.owner.login,
            name: repo.name,
            html_url: repo.html_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    path: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PagesRequest<'a> {
    source: PagesSource<'a>,
}

#[derive(Debug, Serialize)]
struct PagesSource<'a> {
    branch: &'a str,
    path: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl GithubClient {
    pub fn new(api_base: String, token: String, timeout: Duration) -> DeployResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            api_base,
            token,
        })
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, HostError> {
        let mut url =
            Url::parse(&self.api_base).map_err(|e| HostError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| HostError::InvalidUrl(self.api_base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, HostError> {
        debug!("GitHub API call: {}", operation);

        self.authorized(request)
            .send()
            .await
            .map_err(|source| HostError::Request { operation, source })
    }

    async fn parse<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, HostError> {
        response
            .json::<T>()
            .await
            .map_err(|source| HostError::Request { operation, source })
    }

    async fn api_error(operation: &'static str, response: Response) -> HostError {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.message)
            .unwrap_or(text);

        error!("GitHub API error during {} ({}): {}", operation, status, message);

        HostError::Api {
            operation,
            status: status.as_u16(),
            message,
        }
    }

    async fn put_content(
        &self,
        operation: &'static str,
        repo: &RepoRef,
        change: FileChange<'_>,
        sha: Option<&str>,
    ) -> Result<(), HostError> {
        let url = self.endpoint(
            ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"]
                .into_iter()
                .chain(change.path.split('/')),
        )?;

        let body = PutContentRequest {
            message: change.message,
            content: STANDARD.encode(change.content.as_bytes()),
            branch: change.branch,
            sha,
        };

        let response = self
            .send(operation, self.http_client.put(url).json(&body))
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(operation, response).await);
        }

        Ok(())
    }
}

#[async_trait]
impl RepositoryHost for GithubClient {
    async fn authenticated_owner(&self) -> Result<String, HostError> {
        const OP: &str = "get authenticated user";

        let url = self.endpoint(["user"])?;
        let response = self.send(OP, self.http_client.get(url)).await?;

        if !response.status().is_success() {
            return Err(Self::api_error(OP, response).await);
        }

        let account: Account = Self::parse(OP, response).await?;
        Ok(account.login)
    }

    async fn get_repository(&self, repo: &RepoRef) -> Result<Option<Repository>, HostError> {
        const OP: &str = "get repository";

        let url = self.endpoint(["repos", repo.owner.as_str(), repo.name.as_str()])?;
        let response = self.send(OP, self.http_client.get(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let repo: RepositoryResponse = Self::parse(OP, response).await?;
                Ok(Some(repo.into()))
            }
            _ => Err(Self::api_error(OP, response).await),
        }
    }

    async fn create_repository(&self, name: &str) -> Result<Repository, HostError> {
        const OP: &str = "create repository";

        let url = self.endpoint(["user", "repos"])?;
        let body = CreateRepositoryRequest {
            name,
            private: false,
            auto_init: true,
        };
        let response = self.send(OP, self.http_client.post(url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(Self::api_error(OP, response).await);
        }

        let repo: RepositoryResponse = Self::parse(OP, response).await?;
        Ok(repo.into())
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteFile>, HostError> {
        const OP: &str = "get file";

        let url = self.endpoint(
            ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"]
                .into_iter()
                .chain(path.split('/')),
        )?;
        let response = self
            .send(OP, self.http_client.get(url).query(&[("ref", branch)]))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let content: ContentResponse = Self::parse(OP, response).await?;
                Ok(Some(RemoteFile {
                    path: content.path,
                    sha: content.sha,
                }))
            }
            _ => Err(Self::api_error(OP, response).await),
        }
    }

    async fn create_file(&self, repo: &RepoRef, change: FileChange<'_>) -> Result<(), HostError> {
        self.put_content("create file", repo, change, None).await
    }

    async fn update_file(
        &self,
        repo: &RepoRef,
        change: FileChange<'_>,
        sha: &str,
    ) -> Result<(), HostError> {
        self.put_content("update file", repo, change, Some(sha)).await
    }

    async fn branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<String, HostError> {
        const OP: &str = "get branch";

        let url = self.endpoint([
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "branches",
            branch,
        ])?;
        let response = self.send(OP, self.http_client.get(url)).await?;

        if !response.status().is_success() {
            return Err(Self::api_error(OP, response).await);
        }

        let branch: BranchResponse = Self::parse(OP, response).await?;
        Ok(branch.commit.sha)
    }

    async fn enable_pages(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> Result<PagesStatus, HostError> {
        const OP: &str = "enable pages";

        let url = self.endpoint(["repos", repo.owner.as_str(), repo.name.as_str(), "pages"])?;
        let body = PagesRequest {
            source: PagesSource { branch, path },
        };
        let response = self.send(OP, self.http_client.post(url).json(&body)).await?;

        match response.status() {
            StatusCode::CREATED => Ok(PagesStatus::Enabled),
            // GitHub answers 409 when Pages is already configured for the repository
            StatusCode::CONFLICT => Ok(PagesStatus::AlreadyEnabled),
            _ => Err(Self::api_error(OP, response).await),
        }
    }
}

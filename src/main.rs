use pages_deployer::adapters::github::GithubClient;
use pages_deployer::adapters::llm::LlmClient;
use pages_deployer::jobs::deploy_site::DeployContext;
use pages_deployer::jobs::worker::JobWorker;
use pages_deployer::services::generator::ContentGenerator;
use pages_deployer::services::notifier::GraderNotifier;
use pages_deployer::services::publisher::RepositoryPublisher;
use pages_deployer::{webhook, AppConfig, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pages_deployer=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting pages deployer");

    // Load configuration
    let config = AppConfig::from_env()?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    info!("Configuration loaded");

    // Clients live for the whole process and are shared by every job
    let github_client = GithubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
        config.github_timeout(),
    )?;
    let llm_client = LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_api_token.clone(),
        config.llm_model.clone(),
        config.llm_timeout(),
    )?;

    let context = DeployContext {
        generator: ContentGenerator::new(Arc::new(llm_client)),
        publisher: RepositoryPublisher::new(
            Arc::new(github_client),
            config.default_branch.clone(),
            config.repo_init_delay(),
        ),
        notifier: GraderNotifier::new(
            config.notify_max_attempts,
            config.notify_initial_backoff(),
            config.notify_timeout(),
        )?,
    };

    // Create job queue
    let (job_sender, job_receiver) = mpsc::channel(config.job_queue_capacity);

    // Start job worker
    let worker = JobWorker::new(job_receiver, context, config.max_concurrent_jobs);
    tokio::spawn(async move {
        worker.start().await;
    });

    info!(
        "Job worker running with {} slots, queue capacity {}",
        config.max_concurrent_jobs, config.job_queue_capacity
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Create app state
    let state = AppState::new(config, job_sender);
    let app = webhook::router(state);

    // Start server
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

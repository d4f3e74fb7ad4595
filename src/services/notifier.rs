use crate::error::{DeployResult, NotificationError};
use crate::models::NotificationPayload;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{error, info, warn};

/// Delivers job outcomes to the caller's evaluation URL.
///
/// Only an HTTP 200 counts as delivered. Anything else (other statuses,
/// connection errors, timeouts) is retried with doubling backoff until
/// `max_attempts` is reached.
#[derive(Clone)]
pub struct GraderNotifier {
    http_client: Client,
    max_attempts: u32,
    initial_backoff: Duration,
}

impl GraderNotifier {
    pub fn new(max_attempts: u32, initial_backoff: Duration, timeout: Duration) -> DeployResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            max_attempts: max_attempts.max(1),
            initial_backoff,
        })
    }

    /// Returns the number of attempts used on success.
    pub async fn notify(
        &self,
        url: &str,
        payload: &NotificationPayload,
    ) -> Result<u32, NotificationError> {
        let idempotency_key = payload.idempotency_key();
        let mut delay = self.initial_backoff;
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            let result = self
                .http_client
                .post(url)
                .header("Idempotency-Key", &idempotency_key)
                .json(payload)
                .send()
                .await;

            match result {
                Ok(response) if response.status() == StatusCode::OK => {
                    info!("Successfully notified grader at {}", url);
                    return Ok(attempt);
                }
                Ok(response) => {
                    last_error = format!("HTTP {}", response.status());
                    warn!(
                        "Grader notification failed (Attempt {}). Status: {}",
                        attempt,
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("Grader notification failed (Attempt {}). Error: {}", attempt, e);
                    last_error = e.to_string();
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(delay).await;
                delay = next_backoff(delay);
            }
        }

        error!("Failed to notify grader at {} after all attempts.", url);
        Err(NotificationError::Exhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}

/// Doubles the wait, saturating at `Duration::MAX` for large attempt counts.
fn next_backoff(delay: Duration) -> Duration {
    delay.saturating_mul(2)
}

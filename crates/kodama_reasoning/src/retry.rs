//! Retry with exponential backoff for provider HTTP calls.
//!
//! Retries 408, 429 and 5xx responses plus network errors. Other client
//! errors (bad key, bad request) fail on the first attempt.

use anyhow::Result;
use rand::Rng;
use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Upper bound of the random delay added to each wait.
    pub max_jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // The session's reply timeout bounds the whole loop.
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            backoff_factor: 2.0,
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryConfig {
    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.backoff_factor).min(self.max_delay.as_secs_f64()),
        )
    }

    fn jitter(&self) -> Duration {
        let max = self.max_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Run `operation` until it yields a success response, hits a
/// non-retryable status, or `max_attempts` is used up.
pub async fn with_retry<F, Fut>(
    config: &RetryConfig,
    provider_name: &str,
    operation: F,
) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    let mut delay = config.initial_delay;
    let mut last_error = None;

    for attempt in 1..=config.max_attempts {
        match operation().await {
            Ok(response) if response.status().is_success() => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", provider_name, attempt);
                }
                return Ok(response);
            }
            Ok(response) => {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                if !is_retryable_status(status) {
                    anyhow::bail!("{} API Error ({}): {}", provider_name, status, error_text);
                }
                tracing::warn!(
                    "{} returned {} on attempt {}/{}: {}",
                    provider_name,
                    status,
                    attempt,
                    config.max_attempts,
                    error_text.chars().take(200).collect::<String>()
                );
                last_error = Some(format!("{} ({})", status, error_text));
            }
            Err(e) => {
                tracing::warn!(
                    "{} network error on attempt {}/{}: {}",
                    provider_name,
                    attempt,
                    config.max_attempts,
                    e
                );
                last_error = Some(e.to_string());
            }
        }

        if attempt < config.max_attempts {
            let wait = delay + config.jitter();
            tracing::debug!("{} retrying in {:.2}s", provider_name, wait.as_secs_f64());
            tokio::time::sleep(wait).await;
            delay = config.next_delay(delay);
        }
    }

    anyhow::bail!(
        "{}: all {} attempts failed, last error: {}",
        provider_name,
        config.max_attempts,
        last_error.unwrap_or_else(|| "unknown".to_string())
    )
}

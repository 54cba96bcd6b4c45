use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use talkdex_core::embedding::{EmbeddingError, EmbeddingResult};

/// Retry behaviour for rate-limited and transient failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Delay before the first retry; doubles per attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Builder-style: change the base delay
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before retry number `attempt` (1-based), capped at 32x the base
    pub fn backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.saturating_sub(1).min(5) as u32;
        self.base_delay * (1u32 << capped)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

pub(crate) fn build_client(timeout: Duration, bearer: Option<&str>) -> EmbeddingResult<Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(key) = bearer {
        let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", key.trim()))
            .map_err(|_| EmbeddingError::ConfigError("API key contains invalid characters".into()))?;
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| EmbeddingError::ConfigError(format!("failed to build HTTP client: {}", e)))
}

/// POST a JSON body and decode a JSON response, retrying 429/5xx and transport errors
pub(crate) async fn post_json<Req, Resp>(
    client: &Client,
    url: &str,
    body: &Req,
    policy: RetryPolicy,
) -> EmbeddingResult<Resp>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let mut attempt = 0usize;
    loop {
        let err = match client.post(url).json(body).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return resp
                        .json::<Resp>()
                        .await
                        .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()));
                }
                let body = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "<body unavailable>".to_string());
                EmbeddingError::Http {
                    status: status.as_u16(),
                    body,
                }
            }
            Err(e) => EmbeddingError::Request(e.to_string()),
        };

        if err.is_retryable() && attempt < policy.max_retries {
            attempt += 1;
            let delay = policy.backoff(attempt);
            warn!(url, attempt, delay_ms = delay.as_millis() as u64, error = %err, "Retrying embedding request");
            tokio::time::sleep(delay).await;
            continue;
        }
        return Err(err);
    }
}

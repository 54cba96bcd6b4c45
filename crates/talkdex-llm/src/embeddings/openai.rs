use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::http::{build_client, post_json, RetryPolicy};
use talkdex_config::EmbeddingConfig;
use talkdex_core::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};

/// OpenAI-compatible `/embeddings` provider
pub struct OpenAIProvider {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: usize,
}

impl OpenAIProvider {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
        max_retries: usize,
    ) -> EmbeddingResult<Self> {
        let client = build_client(timeout, Some(api_key))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.into(),
            dimensions,
            retry: RetryPolicy::new(max_retries),
        })
    }

    /// Build from configuration; a missing API key is a configuration error
    pub fn from_config(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            EmbeddingError::ConfigError(
                "OpenAI embedding provider requires an API key (set TALKDEX_EMBEDDING_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            )
        })?;
        let base_url = config
            .endpoint()
            .ok_or_else(|| EmbeddingError::ConfigError("no endpoint configured".to_string()))?;
        Self::new(
            &api_key,
            base_url,
            config.model_name(),
            config.dimensions,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )
    }

    /// Builder-style: replace the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, texts: &[String]) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
            dimensions: Some(self.dimensions),
        };
        let response: EmbeddingsResponse =
            post_json(&self.client, &self.endpoint, &body, self.retry).await?;

        if response.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        let model = response.model.unwrap_or_else(|| self.model.clone());
        let tokens = response.usage.map(|u| u.total_tokens);
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        debug!(count = data.len(), model = %model, "Received embeddings");

        Ok(data
            .into_iter()
            .map(|d| {
                let response = EmbeddingResponse::new(d.embedding, model.clone());
                match tokens {
                    Some(t) if texts.len() == 1 => response.with_tokens(t),
                    _ => response,
                }
            })
            .collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        let mut responses = self.request(&[text.to_string()]).await?;
        responses
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

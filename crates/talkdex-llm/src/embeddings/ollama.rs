use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::http::{build_client, post_json, RetryPolicy};
use talkdex_config::EmbeddingConfig;
use talkdex_core::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};

/// Ollama `/api/embed` provider
pub struct OllamaProvider {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: impl Into<String>, dimensions: usize, timeout: Duration) -> EmbeddingResult<Self> {
        Ok(Self {
            client: build_client(timeout, None)?,
            endpoint: format!("{}/api/embed", base_url.trim_end_matches('/')),
            model: model.into(),
            dimensions,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let base_url = config
            .endpoint()
            .ok_or_else(|| EmbeddingError::ConfigError("no Ollama endpoint configured".to_string()))?;
        Ok(Self::new(
            base_url,
            config.model_name(),
            config.dimensions,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_retry_policy(RetryPolicy::new(config.max_retries)))
    }

    /// Builder-style: replace the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        let mut responses = self.embed_batch(&[text.to_string()]).await?;
        responses
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let response: EmbedResponse = post_json(&self.client, &self.endpoint, &body, self.retry).await?;

        if response.embeddings.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        let single = texts.len() == 1;
        let tokens = response.prompt_eval_count;
        Ok(response
            .embeddings
            .into_iter()
            .map(|embedding| {
                let r = EmbeddingResponse::new(embedding, self.model.clone());
                match tokens {
                    Some(t) if single => r.with_tokens(t),
                    _ => r,
                }
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

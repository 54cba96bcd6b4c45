use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use talkdex_core::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};

/// Deterministic offline provider
///
/// The same text always maps to the same unit vector. Failures can be
/// injected by marker substring so tests can exercise partial-failure paths.
pub struct MockEmbeddingProvider {
    dimensions: usize,
    model: String,
    fail_markers: Vec<String>,
    nan_markers: Vec<String>,
    fail_all: bool,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            model: "mock-embed".to_string(),
            fail_markers: Vec::new(),
            nan_markers: Vec::new(),
            fail_all: false,
            calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Fail any request containing a text that includes `marker`
    ///
    /// A batch request fails as a whole, the way a remote API rejects a
    /// request with one bad input.
    #[must_use]
    pub fn fail_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_markers.push(marker.into());
        self
    }

    /// Return a vector containing NaN for texts that include `marker`
    #[must_use]
    pub fn nan_on(mut self, marker: impl Into<String>) -> Self {
        self.nan_markers.push(marker.into());
        self
    }

    /// Fail every request
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Number of single-text requests served or refused
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of batch requests served or refused
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn check(&self, text: &str) -> EmbeddingResult<()> {
        if self.fail_all {
            return Err(EmbeddingError::Http {
                status: 503,
                body: "mock provider unavailable".to_string(),
            });
        }
        if let Some(marker) = self.fail_markers.iter().find(|m| text.contains(m.as_str())) {
            return Err(EmbeddingError::ProcessingFailure(format!(
                "mock failure triggered by '{}'",
                marker
            )));
        }
        Ok(())
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish() | 1;

        let mut components: Vec<f32> = (0..self.dimensions)
            .map(|_| {
                // xorshift64
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect();

        let norm = components.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            components.iter_mut().for_each(|x| *x /= norm);
        } else if let Some(first) = components.first_mut() {
            *first = 1.0;
        }

        if self.nan_markers.iter().any(|m| text.contains(m.as_str())) {
            if let Some(first) = components.first_mut() {
                *first = f32::NAN;
            }
        }
        components
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<EmbeddingResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check(text)?;
        Ok(EmbeddingResponse::new(self.vector_for(text), self.model.clone())
            .with_tokens(text.split_whitespace().count()))
    }

    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        for text in texts {
            self.check(text)?;
        }
        Ok(texts
            .iter()
            .map(|text| EmbeddingResponse::new(self.vector_for(text), self.model.clone()))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

//! Embedding generation with validation and per-item failure isolation
//!
//! [`EmbeddingGenerator::generate`] is strict: blank input is `InvalidInput`,
//! and anything the provider gets wrong is `ProcessingFailure`.
//! [`EmbeddingGenerator::generate_batch`] never fails: every input position
//! gets a vector, with the zero vector standing in for items that could not be
//! embedded.

use std::sync::Arc;
use tracing::{debug, warn};

use talkdex_core::embedding::{EmbeddingError, EmbeddingProvider, EmbeddingResult, EmbeddingVector};

/// Default texts per provider batch request
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Default input cap in characters
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8192;

/// Output of [`EmbeddingGenerator::generate_batch`]
///
/// `vectors` has exactly one entry per input, in input order. `degraded`
/// lists the positions that hold the zero fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchEmbeddings {
    pub vectors: Vec<EmbeddingVector>,
    pub degraded: Vec<usize>,
}

impl BatchEmbeddings {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn is_degraded(&self, index: usize) -> bool {
        self.degraded.binary_search(&index).is_ok()
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }
}

/// Turns text into fixed-dimension vectors through an [`EmbeddingProvider`]
pub struct EmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
    max_input_chars: usize,
    batch_size: usize,
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimensions: usize) -> Self {
        Self {
            provider,
            dimensions,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars.max(1);
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The fixed dimension D
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed one text
    pub async fn generate(&self, text: &str) -> EmbeddingResult<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "cannot embed empty or whitespace-only text".to_string(),
            ));
        }
        let input = truncate_chars(text, self.max_input_chars);
        let response = self.provider.embed(input).await.map_err(into_processing)?;
        self.accept(response.embedding)
    }

    /// Embed many texts; one output per input, zero vector on failure
    pub async fn generate_batch(&self, texts: &[String]) -> BatchEmbeddings {
        let mut slots: Vec<Option<EmbeddingVector>> = vec![None; texts.len()];

        let pending: Vec<(usize, &str)> = texts
            .iter()
            .enumerate()
            .filter_map(|(i, t)| {
                if t.trim().is_empty() {
                    debug!(index = i, "Blank text, using zero-vector fallback");
                    None
                } else {
                    Some((i, t.as_str()))
                }
            })
            .collect();

        for chunk in pending.chunks(self.batch_size) {
            let inputs: Vec<String> = chunk
                .iter()
                .map(|(_, t)| truncate_chars(t, self.max_input_chars).to_string())
                .collect();

            let mut retry: Vec<(usize, &str)> = Vec::new();
            match self.provider.embed_batch(&inputs).await {
                Ok(responses) if responses.len() == inputs.len() => {
                    for (&(index, text), response) in chunk.iter().zip(responses) {
                        match self.accept(response.embedding) {
                            Ok(vector) => slots[index] = Some(vector),
                            Err(e) => {
                                debug!(index, error = %e, "Unusable vector in batch response");
                                retry.push((index, text));
                            }
                        }
                    }
                }
                Ok(responses) => {
                    warn!(
                        expected = inputs.len(),
                        actual = responses.len(),
                        "Batch response count mismatch, retrying items individually"
                    );
                    retry.extend_from_slice(chunk);
                }
                Err(e) => {
                    warn!(size = inputs.len(), error = %e, "Batch embedding request failed");
                    retry.extend_from_slice(chunk);
                }
            }

            // A lone item already had its own request
            if chunk.len() == 1 {
                continue;
            }
            for (index, text) in retry {
                match self.generate(text).await {
                    Ok(vector) => slots[index] = Some(vector),
                    Err(e) => warn!(index, error = %e, "Embedding failed, using zero-vector fallback"),
                }
            }
        }

        let mut degraded = Vec::new();
        let vectors = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    degraded.push(i);
                    EmbeddingVector::zeros(self.dimensions)
                })
            })
            .collect();

        BatchEmbeddings { vectors, degraded }
    }

    /// Whether `vector` is a usable embedding of this generator's dimension
    ///
    /// The all-zero fallback is reported invalid.
    pub fn validate(&self, vector: &[f32]) -> bool {
        vector.len() == self.dimensions
            && vector.iter().all(|v| v.is_finite())
            && vector.iter().any(|v| *v != 0.0)
    }

    pub fn cosine_similarity(&self, a: &EmbeddingVector, b: &EmbeddingVector) -> EmbeddingResult<f32> {
        cosine_similarity(a.as_slice(), b.as_slice())
    }

    fn accept(&self, components: Vec<f32>) -> EmbeddingResult<EmbeddingVector> {
        if components.len() != self.dimensions {
            return Err(EmbeddingError::ProcessingFailure(format!(
                "provider returned {} dimensions, expected {}",
                components.len(),
                self.dimensions
            )));
        }
        if !self.validate(&components) {
            return Err(EmbeddingError::ProcessingFailure(
                "provider returned a non-finite or all-zero vector".to_string(),
            ));
        }
        Ok(EmbeddingVector::new(components))
    }
}

fn into_processing(err: EmbeddingError) -> EmbeddingError {
    match err {
        EmbeddingError::ProcessingFailure(_) => err,
        other => EmbeddingError::ProcessingFailure(other.to_string()),
    }
}

/// Cosine similarity in [-1, 1]
///
/// Vectors of different lengths are a `DimensionMismatch`; a zero-norm vector
/// is similar to nothing (0.0).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> EmbeddingResult<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32)
}

/// First `max_chars` characters of `text`, cut on a `char` boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

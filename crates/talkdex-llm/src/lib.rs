//! # talkdex LLM
//!
//! Embedding providers (OpenAI-compatible, Ollama, deterministic mock) and the
//! [`EmbeddingGenerator`](embeddings::EmbeddingGenerator) that turns transcript
//! text into fixed-dimension vectors with per-item failure isolation.

pub mod embeddings;

pub use embeddings::{
    cosine_similarity, create_generator, create_provider, BatchEmbeddings, EmbeddingGenerator, MockEmbeddingProvider,
    OllamaProvider, OpenAIProvider,
};

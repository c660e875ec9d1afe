//! Text embedding backend
//!
//! The pipeline depends on the [`TextEmbedder`] capability, not on a
//! concrete provider; the same embedder instance must serve index build
//! and query time so dimensions and preprocessing match.

pub mod client;

pub use client::EmbeddingClient;

use crate::errors::Result;
use async_trait::async_trait;

/// Capability of turning text into a fixed-dimension dense vector
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch, order-preserving: output position i corresponds
    /// to input position i
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

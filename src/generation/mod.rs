//! Answer generation backend
//!
//! The pipeline talks to a [`TextGenerator`] capability: one prompt,
//! one system instruction, fixed sampling parameters, one string back.
//! Streamed backends concatenate fragments in emission order before
//! returning.

pub mod client;
pub mod parser;

pub use client::GenerationClient;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters for answer generation. Knobs, not constants:
/// they trade determinism for fluency and live in the config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_new_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_new_tokens: 300,
        }
    }
}

/// Capability of completing a prompt under a system instruction
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Cheap credential/configuration check, called by the pipeline
    /// before any retrieval work so misconfiguration fails first
    fn ensure_configured(&self) -> Result<()>;

    /// Generate a completion. Fails with a generation error when the
    /// backend call fails or produces no output.
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        params: &GenerationParams,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(params.max_new_tokens, 300);
    }
}

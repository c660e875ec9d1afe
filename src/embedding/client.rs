//! HTTP embedding clients
//!
//! Speaks the Ollama `/api/embeddings` endpoint or an OpenAI-compatible
//! `/embeddings` endpoint behind the [`TextEmbedder`] trait.

use crate::config::Provider;
use crate::embedding::TextEmbedder;
use crate::errors::{AssistantError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Request timeout for embedding calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client for a configured provider
pub struct EmbeddingClient {
    provider: Provider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client.
    ///
    /// # Errors
    /// - The provider requires an API key and none is given (checked
    ///   here so a misconfiguration fails at startup, not mid-request)
    /// - The HTTP client cannot be built
    pub fn new(
        provider: Provider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        if provider.requires_api_key() && api_key.is_none() {
            return Err(AssistantError::ConfigError(format!(
                "provider \"{}\" requires an API key for embeddings",
                provider.as_str()
            )));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AssistantError::HttpError)?;

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate an embedding via the Ollama API
    async fn embed_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::EmbeddingError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::EmbeddingError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::EmbeddingError(format!("failed to parse response: {e}")))?;

        Ok(result.embedding)
    }

    /// Generate embeddings via an OpenAI-compatible API; accepts one or
    /// more inputs per request
    async fn embed_openai(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a [&'a str],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AssistantError::ConfigError("OpenAI API key not provided".to_string())
        })?;

        let url = format!("{}/embeddings", self.endpoint);
        debug!("calling OpenAI embeddings API: {} ({} items)", url, texts.len());

        let request = OpenAIRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::EmbeddingError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::EmbeddingError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::EmbeddingError(format!("failed to parse response: {e}")))?;

        if result.data.len() != texts.len() {
            return Err(AssistantError::EmbeddingError(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl TextEmbedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            Provider::Ollama => self.embed_ollama(text).await,
            Provider::OpenAI => {
                let mut embeddings = self.embed_openai(&[text]).await?;
                embeddings.pop().ok_or_else(|| {
                    AssistantError::EmbeddingError("no embedding in response".to_string())
                })
            }
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match self.provider {
            // Ollama has no batch endpoint
            Provider::Ollama => {
                let mut embeddings = Vec::with_capacity(texts.len());
                for text in texts {
                    embeddings.push(self.embed_ollama(text).await?);
                }
                Ok(embeddings)
            }
            Provider::OpenAI => {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                self.embed_openai(&refs).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_without_key_fails_at_construction() {
        let result = EmbeddingClient::new(
            Provider::OpenAI,
            "text-embedding-3-small".to_string(),
            "https://api.openai.com/v1".to_string(),
            None,
        );

        let err = result.err().expect("expected a configuration error");
        assert!(matches!(err, AssistantError::ConfigError(_)));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let client = EmbeddingClient::new(
            Provider::Ollama,
            "all-minilm".to_string(),
            "http://127.0.0.1:11434".to_string(),
            None,
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().model(), "all-minilm");
    }

    #[tokio::test]
    #[ignore] // Integration test - requires a running Ollama server
    async fn test_ollama_embedding_roundtrip() {
        let client = EmbeddingClient::new(
            Provider::Ollama,
            "all-minilm".to_string(),
            "http://127.0.0.1:11434".to_string(),
            None,
        )
        .unwrap();

        let embedding = client.embed("2 bedroom house in Kumasi").await.unwrap();
        assert!(!embedding.is_empty());
    }
}

//! HTTP generation clients
//!
//! The Ollama arm streams `/api/generate` NDJSON and concatenates the
//! fragments in emission order; the OpenAI arm does a single-shot chat
//! completion. Every backend failure surfaces as a generation error so
//! the pipeline can substitute its fallback answer.

use crate::config::Provider;
use crate::errors::{AssistantError, Result};
use crate::generation::parser::StreamParser;
use crate::generation::{GenerationParams, TextGenerator};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Request timeout for generation calls; answer generation dominates
/// request latency, so this is deliberately generous
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Generation client for a configured provider
pub struct GenerationClient {
    provider: Provider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl GenerationClient {
    /// Create a new generation client.
    ///
    /// # Errors
    /// - The provider requires an API key and none is given
    /// - The HTTP client cannot be built
    pub fn new(
        provider: Provider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        if provider.requires_api_key() && api_key.is_none() {
            return Err(AssistantError::ConfigError(format!(
                "provider \"{}\" requires an API key for generation",
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

    /// Stream a completion from Ollama and concatenate the fragments
    async fn complete_ollama(
        &self,
        prompt: &str,
        system: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            top_p: f32,
            num_predict: u32,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            system: &'a str,
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaChunk {
            #[serde(default)]
            response: String,
            #[serde(default)]
            done: bool,
            error: Option<String>,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("calling Ollama generate API: {} (model {})", url, self.model);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            system,
            stream: true,
            options: OllamaOptions {
                temperature: params.temperature,
                top_p: params.top_p,
                num_predict: params.max_new_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::GenerationError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::GenerationError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let mut stream = response.bytes_stream();
        let mut parser = StreamParser::new();
        let mut answer = String::new();
        let mut done = false;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk
                .map_err(|e| AssistantError::GenerationError(format!("stream error: {e}")))?;

            for object in parser.push(&bytes)? {
                let chunk: OllamaChunk = serde_json::from_str(&object).map_err(|e| {
                    AssistantError::GenerationError(format!("malformed stream chunk: {e}"))
                })?;

                if let Some(error) = chunk.error {
                    return Err(AssistantError::GenerationError(error));
                }

                answer.push_str(&chunk.response);
                if chunk.done {
                    done = true;
                    break;
                }
            }

            if done {
                break;
            }
        }

        if answer.trim().is_empty() {
            return Err(AssistantError::GenerationError(
                "backend returned no output".to_string(),
            ));
        }

        Ok(answer)
    }

    /// Single-shot chat completion against an OpenAI-compatible API
    async fn complete_openai(
        &self,
        prompt: &str,
        system: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
            top_p: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: Option<String>,
        }

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AssistantError::ConfigError("OpenAI API key not provided".to_string())
        })?;

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("calling chat completions API: {} (model {})", url, self.model);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: prompt },
            ],
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_new_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::GenerationError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::GenerationError(format!(
                "chat API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::GenerationError(format!("failed to parse response: {e}")))?;

        let answer = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(AssistantError::GenerationError(
                "backend returned no output".to_string(),
            ));
        }

        Ok(answer)
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    fn ensure_configured(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(AssistantError::ConfigError(
                "generation endpoint is empty".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(AssistantError::ConfigError(
                "generation model is not configured".to_string(),
            ));
        }
        if self.provider.requires_api_key() && self.api_key.is_none() {
            return Err(AssistantError::ConfigError(format!(
                "provider \"{}\" requires an API key for generation",
                self.provider.as_str()
            )));
        }

        Ok(())
    }

    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        match self.provider {
            Provider::Ollama => self.complete_ollama(prompt, system, params).await,
            Provider::OpenAI => self.complete_openai(prompt, system, params).await,
        }
    }
}

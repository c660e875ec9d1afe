//! End-to-end RAG pipeline
//!
//! Owns the normalized corpus, the similarity index, and the injected
//! backend handles. Built once at startup; `answer` runs the full
//! encode -> retrieve -> assemble -> generate sequence per request and
//! shares no mutable state between requests.

use crate::config::Config;
use crate::embedding::TextEmbedder;
use crate::errors::{AssistantError, Result};
use crate::generation::{GenerationParams, TextGenerator};
use crate::index::FlatIndex;
use crate::listings::{normalize, ListingRecord};
use crate::rag::context::{ContextBuilder, ContextConfig, FALLBACK_ANSWER, SYSTEM_INSTRUCTION};
use crate::rag::retrieval::{RetrievedListing, Retriever, SearchParams};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pipeline configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub search: SearchParams,
    pub context: ContextConfig,
    pub generation: GenerationParams,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            search: config.retrieval,
            context: config.context,
            generation: config.generation,
        }
    }
}

/// End-to-end retrieval-augmented answering over the listing corpus
pub struct RagPipeline {
    retriever: Retriever,
    context_builder: ContextBuilder,
    generator: Arc<dyn TextGenerator>,
    config: PipelineConfig,
}

impl RagPipeline {
    /// Normalize the corpus, encode it, and build the index.
    ///
    /// Fatal at startup: configuration problems, an empty corpus, or a
    /// corpus encoding failure all refuse to produce a pipeline rather
    /// than serving a degenerate index.
    ///
    /// # Errors
    /// - Generator misconfiguration (missing credentials)
    /// - Empty corpus or corpus encoding failure
    pub async fn build(
        records: Vec<ListingRecord>,
        embedder: Arc<dyn TextEmbedder>,
        generator: Arc<dyn TextGenerator>,
        config: PipelineConfig,
    ) -> Result<Self> {
        generator.ensure_configured()?;

        if records.is_empty() {
            return Err(AssistantError::InitError(
                "listing corpus is empty".to_string(),
            ));
        }

        let descriptions: Vec<String> = records.iter().map(normalize).collect();

        info!("encoding {} listing descriptions", descriptions.len());
        let vectors = embedder.embed_batch(&descriptions).await.map_err(|e| {
            AssistantError::InitError(format!("corpus encoding failed: {e}"))
        })?;

        let index = FlatIndex::build(vectors)?;
        info!(
            "similarity index ready: {} listings, dimension {}",
            index.len(),
            index.dimension()
        );

        Ok(Self {
            retriever: Retriever::new(embedder, index, descriptions, records),
            context_builder: ContextBuilder::with_config(config.context),
            generator,
            config,
        })
    }

    /// Retrieve the nearest listings without generating an answer.
    /// `top_k` of `None` uses the configured default.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<RetrievedListing>> {
        let top_k = top_k.unwrap_or(self.config.search.top_k);
        self.retriever.search(query, top_k).await
    }

    /// Answer a query grounded in the nearest listings.
    ///
    /// The generator configuration is checked before any retrieval
    /// work. A generation failure yields the fixed fallback answer;
    /// configuration and retrieval errors propagate.
    pub async fn answer(&self, query: &str) -> Result<String> {
        self.generator.ensure_configured()?;

        let results = self.search(query, None).await?;
        let context = self.context_builder.build_context(&results);
        let prompt = self.context_builder.build_prompt(query, &context);

        debug!("assembled prompt: {} chars, {} listings", prompt.len(), results.len());

        match self
            .generator
            .complete(&prompt, SYSTEM_INSTRUCTION, &self.config.generation)
            .await
        {
            Ok(answer) => Ok(answer),
            Err(AssistantError::GenerationError(e)) => {
                warn!("generation failed, returning fallback answer: {e}");
                Ok(FALLBACK_ANSWER.to_string())
            }
            Err(other) => Err(other),
        }
    }

    /// Number of listings in the corpus
    pub fn corpus_len(&self) -> usize {
        self.retriever.corpus_len()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct HashEmbedder;

    #[async_trait]
    impl TextEmbedder for HashEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // Deterministic 2-dim stand-in for a real model
            let sum: u32 = text.bytes().map(u32::from).sum();
            Ok(vec![(sum % 97) as f32, text.len() as f32])
        }
    }

    struct CannedGenerator {
        answer: &'static str,
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        fn ensure_configured(&self) -> Result<()> {
            Ok(())
        }

        async fn complete(
            &self,
            _prompt: &str,
            _system: &str,
            _params: &GenerationParams,
        ) -> Result<String> {
            Ok(self.answer.to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        fn ensure_configured(&self) -> Result<()> {
            Ok(())
        }

        async fn complete(
            &self,
            _prompt: &str,
            _system: &str,
            _params: &GenerationParams,
        ) -> Result<String> {
            Err(AssistantError::GenerationError("model exploded".to_string()))
        }
    }

    fn corpus() -> Vec<ListingRecord> {
        let listing = json!({
            "Home Name": "Sunrise Villas",
            "Bed rooms": 2,
            "Price": 90000,
            "Currency": "GHS",
        });
        match listing {
            serde_json::Value::Object(record) => vec![record],
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_answer_happy_path() {
        let pipeline = RagPipeline::build(
            corpus(),
            Arc::new(HashEmbedder),
            Arc::new(CannedGenerator { answer: "Sunrise Villas fits." }),
            PipelineConfig::default(),
        )
        .await
        .unwrap();

        let answer = pipeline.answer("2 bedroom house under 100000").await.unwrap();
        assert_eq!(answer, "Sunrise Villas fits.");
        assert_eq!(pipeline.corpus_len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_fallback_verbatim() {
        let pipeline = RagPipeline::build(
            corpus(),
            Arc::new(HashEmbedder),
            Arc::new(FailingGenerator),
            PipelineConfig::default(),
        )
        .await
        .unwrap();

        let answer = pipeline.answer("anything").await.unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_empty_corpus_fails_build() {
        let result = RagPipeline::build(
            Vec::new(),
            Arc::new(HashEmbedder),
            Arc::new(CannedGenerator { answer: "" }),
            PipelineConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(AssistantError::InitError(_))));
    }

    #[tokio::test]
    async fn test_rebuild_yields_same_ordering() {
        let build = || async {
            RagPipeline::build(
                corpus(),
                Arc::new(HashEmbedder),
                Arc::new(CannedGenerator { answer: "" }),
                PipelineConfig::default(),
            )
            .await
            .unwrap()
        };

        let first = build().await;
        let second = build().await;

        let a = first.search("2 bedroom house", Some(1)).await.unwrap();
        let b = second.search("2 bedroom house", Some(1)).await.unwrap();
        assert_eq!(a[0].description, b[0].description);
        assert_eq!(a[0].distance, b[0].distance);
    }
}

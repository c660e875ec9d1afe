//! Nearest-listing retrieval
//!
//! Encodes a query with the corpus embedder and maps index hits back to
//! descriptions and their originating records.

use crate::embedding::TextEmbedder;
use crate::errors::Result;
use crate::index::FlatIndex;
use crate::listings::ListingRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Search parameters for retrieval
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Maximum number of listings to retrieve
    pub top_k: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { top_k: 2 }
    }
}

/// One retrieved listing with its distance to the query
#[derive(Debug, Clone)]
pub struct RetrievedListing {
    /// Canonical description the index was built over
    pub description: String,
    /// Euclidean distance to the query (smaller is closer)
    pub distance: f32,
    /// The originating raw record
    pub record: ListingRecord,
}

/// Retrieval engine over the built index and corpus
pub struct Retriever {
    embedder: Arc<dyn TextEmbedder>,
    index: FlatIndex,
    descriptions: Vec<String>,
    records: Vec<ListingRecord>,
}

impl Retriever {
    /// Assemble a retriever from already-encoded corpus parts.
    /// Descriptions, records and index entries correspond by position.
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        index: FlatIndex,
        descriptions: Vec<String>,
        records: Vec<ListingRecord>,
    ) -> Self {
        debug_assert_eq!(descriptions.len(), index.len());
        debug_assert_eq!(records.len(), index.len());

        Self {
            embedder,
            index,
            descriptions,
            records,
        }
    }

    /// Retrieve the `top_k` nearest listings for a query.
    ///
    /// Returns `min(top_k, corpus size)` results ordered by ascending
    /// distance, ties resolved to the earliest corpus position.
    ///
    /// # Errors
    /// - Query embedding failure (request-scoped; no partial results)
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedListing>> {
        let query_vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&query_vector, top_k);

        debug!(
            "retrieved {} of {} listings for query ({} requested)",
            hits.len(),
            self.index.len(),
            top_k
        );

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedListing {
                description: self.descriptions[hit.position].clone(),
                distance: hit.distance,
                record: self.records[hit.position].clone(),
            })
            .collect())
    }

    /// Number of listings in the corpus
    pub fn corpus_len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AssistantError;
    use async_trait::async_trait;

    /// Embeds text as keyword-occurrence counts so similarity is
    /// predictable in tests
    struct KeywordEmbedder {
        keywords: Vec<&'static str>,
    }

    #[async_trait]
    impl TextEmbedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(self
                .keywords
                .iter()
                .map(|k| lower.matches(k).count() as f32)
                .collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl TextEmbedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AssistantError::EmbeddingError("backend down".to_string()))
        }
    }

    fn retriever(descriptions: &[&str]) -> Retriever {
        let embedder = Arc::new(KeywordEmbedder {
            keywords: vec!["bedroom", "office"],
        });

        let vectors = descriptions
            .iter()
            .map(|d| {
                tokio_test::block_on(embedder.embed(d)).unwrap()
            })
            .collect();

        Retriever::new(
            embedder,
            FlatIndex::build(vectors).unwrap(),
            descriptions.iter().map(|d| (*d).to_string()).collect(),
            descriptions.iter().map(|_| ListingRecord::new()).collect(),
        )
    }

    #[test]
    fn test_search_returns_nearest_first() {
        let r = retriever(&["office space downtown", "2 bedroom house"]);

        let results = tokio_test::block_on(r.search("bedroom home", 2)).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].description.contains("bedroom"));
        assert!(results[0].distance <= results[1].distance);
    }

    #[test]
    fn test_top_k_larger_than_corpus_returns_all() {
        let r = retriever(&["office space", "bedroom flat"]);

        let results = tokio_test::block_on(r.search("anything", 10)).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_embedding_failure_is_request_scoped() {
        let r = Retriever::new(
            Arc::new(FailingEmbedder),
            FlatIndex::build(vec![vec![0.0]]).unwrap(),
            vec!["desc".to_string()],
            vec![ListingRecord::new()],
        );

        let result = tokio_test::block_on(r.search("query", 1));
        assert!(matches!(result, Err(AssistantError::EmbeddingError(_))));
    }
}

//! In-memory similarity index
//!
//! Exact nearest-neighbor search under Euclidean (L2) distance over the
//! full corpus. Vectors are stored in corpus insertion order and the
//! position doubles as the listing identifier; the index is built once
//! at startup and never mutated, so concurrent reads need no locking.

use crate::errors::{AssistantError, Result};
use tracing::debug;

/// Flat (exhaustive) L2 index over fixed-dimension vectors
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// One search hit: original corpus position and Euclidean distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

impl FlatIndex {
    /// Build the index from corpus vectors in insertion order.
    ///
    /// # Errors
    /// - The vector list is empty (an index needs at least one entry)
    /// - Vector dimensions are inconsistent
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = match vectors.first() {
            Some(first) => first.len(),
            None => {
                return Err(AssistantError::InitError(
                    "cannot build an index over an empty corpus".to_string(),
                ))
            }
        };

        if let Some(pos) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(AssistantError::InitError(format!(
                "vector {pos} has dimension {}, expected {dimension}",
                vectors[pos].len()
            )));
        }

        debug!(
            "built flat index: {} vectors, dimension {}",
            vectors.len(),
            dimension
        );

        Ok(Self { dimension, vectors })
    }

    /// Exact k-nearest-neighbor search.
    ///
    /// Returns `min(top_k, len)` hits ordered by ascending distance;
    /// equal distances resolve to the lowest original position, so
    /// duplicate descriptions retrieve in build order. The query must
    /// have the index dimension — a mismatch is a caller bug, not a
    /// runtime condition.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<Neighbor> {
        assert_eq!(
            query.len(),
            self.dimension,
            "query dimension does not match index dimension"
        );

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: l2_distance(query, vector),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(top_k);
        hits
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Euclidean distance between two equal-length vectors
fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

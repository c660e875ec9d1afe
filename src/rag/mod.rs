//! RAG (Retrieval-Augmented Generation) pipeline
//!
//! Retrieval, context assembly, and answer generation over the listing
//! corpus.
//!
//! Components:
//! - Retriever: nearest-listing search over the flat index
//! - Context Builder: bounded context + prompt assembly
//! - Pipeline: end-to-end `answer(query)` orchestration

pub mod context;
pub mod pipeline;
pub mod retrieval;

// Re-export key types
pub use context::ContextBuilder;
pub use pipeline::RagPipeline;
pub use retrieval::Retriever;

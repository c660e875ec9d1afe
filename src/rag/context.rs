//! Context assembly and prompt construction
//!
//! Joins retrieved descriptions in ranked order, enforces a hard
//! word-count bound on the context, and renders the fixed prompt
//! template. The system instruction travels separately to the
//! generator. Everything here is deterministic.

use crate::rag::retrieval::RetrievedListing;
use serde::{Deserialize, Serialize};

/// Behavioral instruction given to the generative model: persona,
/// real-estate-only scope, and the fallback phrasings for unanswerable
/// or out-of-scope questions.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful real estate assistant named 'EstateBuddy'. \
Provide concise, accurate answers based on the given information. \
Be professional, helpful, and stick to real estate-related queries. \
If a question is outside the scope of the provided data, do a quick and deep search in the data. \
If you can't find the answer, respond with 'I am sorry, I do not have that information'. \
If the question is not related to real estate, respond with 'I am a real estate assistant, \
I can only help with real estate related questions.'";

/// Answer returned verbatim when generation fails
pub const FALLBACK_ANSWER: &str = "I am sorry, I do not have that information";

/// Context assembly configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Hard bound on the context, in whitespace-delimited words
    pub max_words: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { max_words: 1500 }
    }
}

/// Builds the bounded context and the final prompt
pub struct ContextBuilder {
    config: ContextConfig,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            config: ContextConfig::default(),
        }
    }

    pub fn with_config(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Concatenate retrieved descriptions in ranked order, blank-line
    /// separated, truncated to the configured word budget
    pub fn build_context(&self, results: &[RetrievedListing]) -> String {
        let context = results
            .iter()
            .map(|r| r.description.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        truncate_words(&context, self.config.max_words)
    }

    /// Embed the query and context into the fixed prompt template
    pub fn build_prompt(&self, query: &str, context: &str) -> String {
        format!(
            "A user asked: \"{query}\"\n\n\
             Here are some matching listings:\n{context}\n\n\
             Based on the provided information, please provide a helpful and accurate response."
        )
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut text to its first `max_words` whitespace-delimited words.
/// Description boundaries are ignored; text under the limit passes
/// through untouched.
fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        text.to_string()
    } else {
        words[..max_words].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn retrieved(description: &str) -> RetrievedListing {
        RetrievedListing {
            description: description.to_string(),
            distance: 0.0,
            record: crate::listings::ListingRecord::new(),
        }
    }

    #[test]
    fn test_context_joins_with_blank_line() {
        let builder = ContextBuilder::new();
        let context =
            builder.build_context(&[retrieved("First listing"), retrieved("Second listing")]);
        assert_eq!(context, "First listing\n\nSecond listing");
    }

    #[test]
    fn test_context_of_no_results_is_empty() {
        let builder = ContextBuilder::new();
        assert_eq!(builder.build_context(&[]), "");
    }

    #[test]
    fn test_truncation_ignores_description_boundaries() {
        // 10 whitespace-delimited words across 4 lines, budget of 5
        let builder = ContextBuilder::with_config(ContextConfig { max_words: 5 });
        let context = builder.build_context(&[retrieved(
            "Real Estate: A\nCommunity: B\nHome Name: C\nStatus: D",
        )]);

        assert_eq!(context, "Real Estate: A Community: B");
        assert_eq!(context.split_whitespace().count(), 5);
    }

    #[test]
    fn test_under_limit_passes_through_untouched() {
        let builder = ContextBuilder::with_config(ContextConfig { max_words: 100 });
        let text = "Home Name: Sunrise Villas\nBedrooms: 2";
        assert_eq!(builder.build_context(&[retrieved(text)]), text);
    }

    #[test]
    fn test_prompt_embeds_query_and_context() {
        let builder = ContextBuilder::new();
        let prompt = builder.build_prompt("2 bedroom house", "Bedrooms: 2");

        assert!(prompt.contains("A user asked: \"2 bedroom house\""));
        assert!(prompt.contains("Here are some matching listings:\nBedrooms: 2"));
        assert!(prompt.ends_with("helpful and accurate response."));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let builder = ContextBuilder::new();
        let results = [retrieved("A listing"), retrieved("Another listing")];
        assert_eq!(
            builder.build_context(&results),
            builder.build_context(&results)
        );
    }

    #[test]
    fn test_system_instruction_carries_fallback_phrasings() {
        assert!(SYSTEM_INSTRUCTION.contains(FALLBACK_ANSWER));
        assert!(SYSTEM_INSTRUCTION.contains("I am a real estate assistant"));
    }

    #[quickcheck]
    fn prop_truncated_word_count_is_min(text: String, max: u8) -> bool {
        let max_words = usize::from(max) + 1;
        let truncated = truncate_words(&text, max_words);
        let total = text.split_whitespace().count();
        truncated.split_whitespace().count() == total.min(max_words)
    }
}

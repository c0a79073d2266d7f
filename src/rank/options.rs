//! Ranking options and configuration.

use std::time::Duration;

/// Relative weights of the relevance signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceWeights {
    /// Cosine similarity between context and section embeddings
    pub embedding: f32,
    /// Fraction of salient context terms present in the section
    pub keyword: f32,
    /// Bonus when the section's content type matches the task
    pub content_type: f32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        // 40/10/10 priority, normalized
        Self {
            embedding: 0.667,
            keyword: 0.167,
            content_type: 0.167,
        }
    }
}

/// Options for the relevance ranker.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Signal weights
    pub weights: RelevanceWeights,
    /// Number of sections to select
    pub top_k: usize,
    /// Maximum selected sections per document (0 = unlimited)
    pub per_document_cap: usize,
    /// Body characters embedded per section
    pub section_char_budget: usize,
    /// Sentences kept in each refined excerpt
    pub refined_sentences: usize,
    /// Maximum refined excerpt length in characters
    pub refined_char_budget: usize,
    /// Shortest sentence considered for an excerpt
    pub min_sentence_chars: usize,
    /// Longest sentence considered for an excerpt
    pub max_sentence_chars: usize,
    /// Key points reported per selected section
    pub key_points: usize,
    /// Time allowed for one embedding batch
    pub embedding_timeout: Duration,
    /// Skip embeddings and rank on keyword and content-type signals
    pub use_embeddings: bool,
    /// Whether to use parallel processing
    pub parallel: bool,
}

impl RankOptions {
    /// Create new rank options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set signal weights.
    pub fn with_weights(mut self, weights: RelevanceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the number of selected sections.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the per-document cap (0 disables it).
    pub fn with_per_document_cap(mut self, cap: usize) -> Self {
        self.per_document_cap = cap;
        self
    }

    /// Set the section embedding budget.
    pub fn with_section_char_budget(mut self, chars: usize) -> Self {
        self.section_char_budget = chars;
        self
    }

    /// Set the number of refined sentences.
    pub fn with_refined_sentences(mut self, n: usize) -> Self {
        self.refined_sentences = n.max(1);
        self
    }

    /// Set the number of key points per selected section.
    pub fn with_key_points(mut self, n: usize) -> Self {
        self.key_points = n;
        self
    }

    /// Set the embedding timeout.
    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = timeout;
        self
    }

    /// Disable embeddings entirely.
    pub fn without_embeddings(mut self) -> Self {
        self.use_embeddings = false;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            weights: RelevanceWeights::default(),
            top_k: 5,
            per_document_cap: 2,
            section_char_budget: 500,
            refined_sentences: 3,
            refined_char_budget: 600,
            min_sentence_chars: 20,
            max_sentence_chars: 400,
            key_points: 3,
            embedding_timeout: Duration::from_secs(10),
            use_embeddings: true,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_options_builder() {
        let options = RankOptions::new()
            .with_top_k(10)
            .with_per_document_cap(0)
            .with_refined_sentences(0)
            .with_key_points(1)
            .with_embedding_timeout(Duration::from_millis(250))
            .without_embeddings()
            .sequential();

        assert_eq!(options.top_k, 10);
        assert_eq!(options.per_document_cap, 0);
        assert_eq!(options.refined_sentences, 1);
        assert_eq!(options.key_points, 1);
        assert_eq!(options.embedding_timeout, Duration::from_millis(250));
        assert!(!options.use_embeddings);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_weights_priority() {
        let w = RelevanceWeights::default();
        assert!(w.embedding > w.keyword);
        assert!((w.embedding / w.keyword - 4.0).abs() < 0.01);
        assert!((w.keyword - w.content_type).abs() < f32::EPSILON);
    }
}

//! Structural analysis options and configuration.

/// Options for the run merger.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Maximum vertical gap, as a multiple of the smaller font size
    pub gap_factor: f32,
    /// Maximum font size difference (points) within one typographic class
    pub size_tolerance: f32,
    /// Candidates longer than this (characters) are never headings
    pub max_heading_chars: usize,
}

impl MergeOptions {
    /// Create new merge options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap factor.
    pub fn with_gap_factor(mut self, factor: f32) -> Self {
        self.gap_factor = factor;
        self
    }

    /// Set the font size tolerance.
    pub fn with_size_tolerance(mut self, tolerance: f32) -> Self {
        self.size_tolerance = tolerance;
        self
    }

    /// Set the maximum heading length.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            gap_factor: 1.0,
            size_tolerance: 0.5,
            max_heading_chars: 200,
        }
    }
}

/// Relative weights of the heading signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeights {
    pub typography: f32,
    pub pattern: f32,
    pub position: f32,
    pub length: f32,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            typography: 0.40,
            pattern: 0.35,
            position: 0.15,
            length: 0.10,
        }
    }
}

/// Options for the heading candidate scorer.
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    /// Signal weights
    pub weights: SignalWeights,
    /// Confidence needed to accept a candidate
    pub accept_threshold: f32,
    /// Pattern score that accepts a candidate on its own
    pub strong_pattern_threshold: f32,
    /// Candidates up to this many characters are not penalized
    pub short_heading_chars: usize,
    /// Candidates shorter than this are never headings
    pub min_heading_chars: usize,
}

impl ScoringOptions {
    /// Create new scoring options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set signal weights.
    pub fn with_weights(mut self, weights: SignalWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the acceptance threshold.
    pub fn with_accept_threshold(mut self, threshold: f32) -> Self {
        self.accept_threshold = threshold;
        self
    }

    /// Set the strong-pattern threshold.
    pub fn with_strong_pattern_threshold(mut self, threshold: f32) -> Self {
        self.strong_pattern_threshold = threshold;
        self
    }
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            weights: SignalWeights::default(),
            accept_threshold: 0.45,
            strong_pattern_threshold: 0.75,
            short_heading_chars: 80,
            min_heading_chars: 3,
        }
    }
}

/// Options for the complete structural pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Run merger options
    pub merge: MergeOptions,
    /// Scorer options
    pub scoring: ScoringOptions,
    /// Font sizes within this many points share a size rank
    pub rank_tolerance: f32,
    /// Maximum number of distinct size ranks
    pub max_ranks: usize,
    /// Use the document information title when present
    pub prefer_metadata_title: bool,
}

impl AnalysisOptions {
    /// Create new analysis options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set merge options.
    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    /// Set scoring options.
    pub fn with_scoring(mut self, scoring: ScoringOptions) -> Self {
        self.scoring = scoring;
        self
    }

    /// Set the maximum number of size ranks.
    pub fn with_max_ranks(mut self, ranks: usize) -> Self {
        self.max_ranks = ranks.max(1);
        self
    }

    /// Prefer the document information title over page text.
    pub fn prefer_metadata_title(mut self, prefer: bool) -> Self {
        self.prefer_metadata_title = prefer;
        self
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            merge: MergeOptions::default(),
            scoring: ScoringOptions::default(),
            rank_tolerance: 0.5,
            max_ranks: 6,
            prefer_metadata_title: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_options_builder() {
        let options = AnalysisOptions::new()
            .with_merge(MergeOptions::new().with_max_heading_chars(120))
            .with_scoring(ScoringOptions::new().with_accept_threshold(0.6))
            .with_max_ranks(0)
            .prefer_metadata_title(true);

        assert_eq!(options.merge.max_heading_chars, 120);
        assert!((options.scoring.accept_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(options.max_ranks, 1);
        assert!(options.prefer_metadata_title);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = SignalWeights::default();
        let sum = w.typography + w.pattern + w.position + w.length;
        assert!((sum - 1.0).abs() < 1e-6);
    }
}

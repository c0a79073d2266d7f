//! Structural analysis: heading detection, hierarchy and sections.

mod font_profile;
mod hierarchy;
mod merger;
mod options;
mod patterns;
mod pipeline;
mod scorer;
mod segmenter;

pub use font_profile::{size_key, FontProfile, DEFAULT_BODY_SIZE};
pub use hierarchy::HierarchyResolver;
pub use merger::{assign_position_scores, RunMerger};
pub use options::{AnalysisOptions, MergeOptions, ScoringOptions, SignalWeights};
pub use patterns::{PatternLibrary, PatternMatch, Script, StructuralPattern};
pub use pipeline::{DocumentAnalysis, DocumentAnalyzer, Inspection};
pub use scorer::{length_penalty, pattern_score, typography_score, HeadingScorer, ScoredCandidate, SignalScores};
pub use segmenter::{page_section_title, SectionSegmenter};

//! Structural pipeline: runs → candidates → outline → sections.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{DocumentOutline, RunStream, Section};

use super::font_profile::FontProfile;
use super::hierarchy::HierarchyResolver;
use super::merger::RunMerger;
use super::options::AnalysisOptions;
use super::patterns::PatternLibrary;
use super::scorer::{HeadingScorer, ScoredCandidate};
use super::segmenter::SectionSegmenter;

/// Structural result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    /// Document identifier (usually its file name)
    pub document_id: String,
    /// Title and headings
    pub outline: DocumentOutline,
    /// Flat sections for ranking
    pub sections: Vec<Section>,
    /// Number of pages
    pub page_count: u32,
}

/// Diagnostic view of the intermediate stages.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    /// Font statistics
    pub profile: FontProfile,
    /// Every candidate with its signals
    pub candidates: Vec<ScoredCandidate>,
    /// Resulting outline
    pub outline: DocumentOutline,
}

/// Runs the structural engine over a document's text runs.
///
/// The analyzer holds no per-document state; one instance can serve any
/// number of documents, including from several threads.
#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    options: AnalysisOptions,
    patterns: Arc<PatternLibrary>,
}

impl DocumentAnalyzer {
    /// Create an analyzer with the built-in pattern library.
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            patterns: Arc::new(PatternLibrary::builtin().clone()),
        }
    }

    /// Use a custom pattern library.
    pub fn with_patterns(mut self, patterns: PatternLibrary) -> Self {
        self.patterns = Arc::new(patterns);
        self
    }

    /// Analysis options in use.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Extract the outline of a document.
    pub fn outline(&self, stream: &RunStream) -> DocumentOutline {
        self.inspect(stream).outline
    }

    /// Extract outline and sections of a document.
    pub fn analyze(&self, stream: &RunStream, document_id: &str, document_index: usize) -> DocumentAnalysis {
        let inspection = self.inspect(stream);
        let sections = SectionSegmenter::new(document_id, document_index).segment(&inspection.outline, stream);

        log::debug!(
            "{}: title {:?}, {} headings, {} sections",
            document_id,
            inspection.outline.title,
            inspection.outline.headings.len(),
            sections.len()
        );

        DocumentAnalysis {
            document_id: document_id.to_string(),
            outline: inspection.outline,
            sections,
            page_count: stream.page_count,
        }
    }

    /// Run every stage and keep the intermediate results.
    pub fn inspect(&self, stream: &RunStream) -> Inspection {
        let mut runs = stream.runs.clone();
        runs.sort_by_key(|r| (r.page, r.reading_order));

        let profile = FontProfile::build(&runs, self.options.rank_tolerance, self.options.max_ranks);

        let candidates = RunMerger::new(&self.options.merge, &self.patterns).merge(&runs);

        let scorer = HeadingScorer::new(
            &profile,
            &self.patterns,
            &self.options.scoring,
            self.options.merge.size_tolerance,
        );
        let candidates = scorer.score_all(candidates);

        let outline = HierarchyResolver::new(&profile)
            .prefer_metadata_title(self.options.prefer_metadata_title)
            .resolve(&candidates, stream.metadata_title.as_deref());

        Inspection {
            profile,
            candidates,
            outline,
        }
    }
}

impl Default for DocumentAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

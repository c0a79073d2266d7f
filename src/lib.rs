//! # docmap
//!
//! Document structure extraction and persona-driven section ranking.
//!
//! docmap reads the positioned text runs of a PDF, finds the title and a
//! three-level (H1–H3) outline, splits the document into sections, and
//! ranks sections across a collection of documents against a persona and
//! the job they need done.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmap::{extract_outline, render};
//!
//! fn main() -> docmap::Result<()> {
//!     let outline = extract_outline("report.pdf")?;
//!     let result = render::OutlineResult::from_outline(&outline);
//!     println!("{}", render::to_json(&result, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Weighted-signal heading detection**: typography, structural patterns,
//!   position and length combined by one formula
//! - **Multi-script patterns**: Latin, Japanese, Chinese, Korean, Devanagari
//! - **Explicit numbering wins**: `1.1.1` is H3 even when every heading
//!   shares one font size
//! - **Pluggable collaborators**: any [`parser::PdfBackend`] and any
//!   [`rank::Embedder`]
//! - **Parallel processing**: Uses Rayon across documents of a collection

pub mod analysis;
pub mod collection;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod rank;
pub mod render;
pub mod text;

// Re-export commonly used types
pub use analysis::{AnalysisOptions, DocumentAnalysis, DocumentAnalyzer, Inspection};
pub use collection::{Collection, CollectionConfig, CollectionProcessor, CollectionRun, DocumentReport};
pub use detect::{detect_format_from_bytes, detect_input_from_bytes, detect_input_from_path, InputKind, PdfFormat};
pub use error::{Error, Result};
pub use model::{
    BBox, ClassifiedHeading, DocumentOutline, HeadingLevel, MergedHeadingCandidate, PatternTag,
    RunStream, Section, TextRun,
};
pub use parser::{AutoRunSource, ErrorMode, PageSelection, ParseOptions, RunSource};
pub use rank::{Embedder, EmbeddingRanker, HashingEmbedder, PersonaContext, RankOptions};
pub use render::{JsonFormat, OutlineResult, RankingResult};

use std::path::Path;
use std::sync::Arc;

/// Read the text runs of a PDF file or JSON run dump.
///
/// # Example
///
/// ```no_run
/// use docmap::read_runs;
///
/// let stream = read_runs("document.pdf").unwrap();
/// println!("{} runs on {} pages", stream.runs.len(), stream.page_count);
/// ```
pub fn read_runs<P: AsRef<Path>>(path: P) -> Result<RunStream> {
    AutoRunSource::default().read_path(path.as_ref())
}

/// Read the text runs of a PDF or JSON run dump held in memory.
pub fn read_runs_bytes(data: &[u8]) -> Result<RunStream> {
    AutoRunSource::default().read_bytes(data)
}

/// Extract the title and outline of a document.
///
/// # Example
///
/// ```no_run
/// use docmap::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// for heading in &outline.headings {
///     println!("{} {} (page {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<DocumentOutline> {
    Docmap::new().open(path).map(|doc| doc.outline())
}

/// Extract the outline of a document and render it as JSON.
///
/// # Example
///
/// ```no_run
/// use docmap::{outline_to_json, JsonFormat};
///
/// let json = outline_to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn outline_to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    Docmap::new().open(path)?.to_json(format)
}

/// Rank the sections of a collection directory with default options.
///
/// Uses the built-in [`HashingEmbedder`].
///
/// # Example
///
/// ```no_run
/// use docmap::rank_collection;
///
/// let result = rank_collection("collections/travel").unwrap();
/// for section in &result.extracted_sections {
///     println!("{}. {} ({})", section.importance_rank, section.section_title, section.document);
/// }
/// ```
pub fn rank_collection<P: AsRef<Path>>(dir: P) -> Result<RankingResult> {
    let collection = Collection::open(dir)?;
    let processor = CollectionProcessor::new(Arc::new(AutoRunSource::default()), DocumentAnalyzer::default());
    let ranker = EmbeddingRanker::new(Arc::new(HashingEmbedder::default()), RankOptions::default());
    Ok(processor.run(&collection, &ranker)?.result)
}

/// Builder for reading and analyzing single documents.
///
/// # Example
///
/// ```no_run
/// use docmap::Docmap;
///
/// let json = Docmap::new()
///     .lenient()
///     .with_metadata_title()
///     .open("document.pdf")?
///     .to_json(docmap::JsonFormat::Compact)?;
/// # Ok::<(), docmap::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Docmap {
    parse_options: ParseOptions,
    analysis_options: AnalysisOptions,
}

impl Docmap {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip unreadable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Use the document information title when present.
    pub fn with_metadata_title(mut self) -> Self {
        self.analysis_options = self.analysis_options.prefer_metadata_title(true);
        self
    }

    /// Set analysis options.
    pub fn with_analysis(mut self, options: AnalysisOptions) -> Self {
        self.analysis_options = options;
        self
    }

    /// Read a document from a file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<DocmapResult> {
        let stream = AutoRunSource::new(self.parse_options.clone()).read_path(path.as_ref())?;
        Ok(self.wrap(stream))
    }

    /// Read a document from bytes.
    pub fn open_bytes(self, data: &[u8]) -> Result<DocmapResult> {
        let stream = AutoRunSource::new(self.parse_options.clone()).read_bytes(data)?;
        Ok(self.wrap(stream))
    }

    /// Analyze an already extracted run stream.
    pub fn with_stream(self, stream: RunStream) -> DocmapResult {
        self.wrap(stream)
    }

    fn wrap(self, stream: RunStream) -> DocmapResult {
        DocmapResult {
            stream,
            analyzer: DocumentAnalyzer::new(self.analysis_options),
        }
    }
}

/// A loaded document ready for analysis.
#[derive(Debug, Clone)]
pub struct DocmapResult {
    stream: RunStream,
    analyzer: DocumentAnalyzer,
}

impl DocmapResult {
    /// The document's text runs.
    pub fn runs(&self) -> &RunStream {
        &self.stream
    }

    /// Title and outline.
    pub fn outline(&self) -> DocumentOutline {
        self.analyzer.outline(&self.stream)
    }

    /// Outline plus sections.
    pub fn analyze(&self, document_id: &str) -> DocumentAnalysis {
        self.analyzer.analyze(&self.stream, document_id, 0)
    }

    /// Every intermediate stage, for diagnostics.
    pub fn inspect(&self) -> Inspection {
        self.analyzer.inspect(&self.stream)
    }

    /// Structural output record.
    pub fn outline_result(&self) -> OutlineResult {
        OutlineResult::from_outline(&self.outline())
    }

    /// Structural output record as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.outline_result(), format)
    }
}

//! Document collections: config loading, per-document analysis, ranking.
//!
//! A collection directory holds a JSON config (`challenge1b_input.json`)
//! naming its documents, the persona and the job to be done. Documents are
//! analyzed independently; one that fails is reported and left out of the
//! ranking without stopping the rest.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{DocumentAnalysis, DocumentAnalyzer};
use crate::error::{Error, Result};
use crate::parser::RunSource;
use crate::rank::{EmbeddingRanker, PersonaContext, Ranking};
use crate::render::{OutlineResult, RankingMetadata, RankingResult};

/// Default config file name inside a collection directory.
pub const INPUT_FILE: &str = "challenge1b_input.json";

/// Default output file name inside a collection directory.
pub const OUTPUT_FILE: &str = "challenge1b_output.json";

/// Sub-directory searched first for documents.
pub const DOCUMENT_DIR: &str = "PDFs";

/// Free-form identification of the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeInfo {
    #[serde(default)]
    pub challenge_id: Option<String>,
    #[serde(default)]
    pub test_case_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A document listed in the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Persona fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

/// The job the persona wants done.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub objectives: Vec<String>,
}

/// Collection config as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_info: Option<ChallengeInfo>,
    pub documents: Vec<DocumentEntry>,
    pub persona: PersonaConfig,
    pub job_to_be_done: JobConfig,
}

impl CollectionConfig {
    /// Parse a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid collection config: {}", e)))
    }

    /// Read a config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Build the persona context; fails when role and task are both empty.
    pub fn persona_context(&self) -> Result<PersonaContext> {
        let mut builder = PersonaContext::builder(&self.persona.role, &self.job_to_be_done.task)
            .with_objectives(self.job_to_be_done.objectives.iter().cloned());
        if let Some(expertise) = &self.persona.expertise {
            builder = builder.with_expertise(expertise.clone());
        }
        if let Some(background) = &self.persona.background {
            builder = builder.with_background(background.clone());
        }
        builder.build()
    }

    /// File names in config order.
    pub fn document_names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

/// A collection directory with its config.
#[derive(Debug, Clone)]
pub struct Collection {
    root: PathBuf,
    config: CollectionConfig,
}

impl Collection {
    /// Open a collection directory, reading its default config file.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let config = CollectionConfig::from_path(root.join(INPUT_FILE))?;
        Ok(Self { root, config })
    }

    /// Use an explicit config for a collection directory.
    pub fn new<P: AsRef<Path>>(root: P, config: CollectionConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Collection root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collection config.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Location of a listed document: `<root>/PDFs/<name>` if present, else `<root>/<name>`.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        let nested = self.root.join(DOCUMENT_DIR).join(filename);
        if nested.exists() {
            nested
        } else {
            self.root.join(filename)
        }
    }

    /// `(id, path)` of every listed document in config order.
    pub fn document_paths(&self) -> Vec<(String, PathBuf)> {
        self.config
            .documents
            .iter()
            .map(|d| (d.filename.clone(), self.resolve(&d.filename)))
            .collect()
    }
}

/// Outcome of analyzing one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Document identifier
    pub id: String,
    /// Analysis, or the reason it failed
    pub outcome: std::result::Result<DocumentAnalysis, String>,
}

impl DocumentReport {
    /// Check whether the document was analyzed.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Structural output record; an error artifact for failed documents.
    pub fn outline_result(&self) -> OutlineResult {
        match &self.outcome {
            Ok(analysis) => OutlineResult::from_outline(&analysis.outline),
            Err(message) => OutlineResult::failed(message.clone()),
        }
    }
}

/// Result of a full collection run.
#[derive(Debug, Clone)]
pub struct CollectionRun {
    /// One report per listed document, in config order
    pub reports: Vec<DocumentReport>,
    /// Section scores and selection
    pub ranking: Ranking,
    /// Output record
    pub result: RankingResult,
}

impl CollectionRun {
    /// Number of documents that failed.
    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_ok()).count()
    }
}

/// Analyzes documents with isolated failures and ranks their sections.
#[derive(Clone)]
pub struct CollectionProcessor {
    source: Arc<dyn RunSource>,
    analyzer: DocumentAnalyzer,
    parallel: bool,
}

impl std::fmt::Debug for CollectionProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionProcessor")
            .field("analyzer", &self.analyzer)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl CollectionProcessor {
    /// Create a processor reading documents through `source`.
    pub fn new(source: Arc<dyn RunSource>, analyzer: DocumentAnalyzer) -> Self {
        Self {
            source,
            analyzer,
            parallel: true,
        }
    }

    /// Enable or disable parallel document processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process documents one at a time.
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }

    /// Analyze one document.
    pub fn analyze_one(&self, id: &str, index: usize, path: &Path) -> DocumentReport {
        let outcome = self
            .source
            .read_path(path)
            .map(|stream| self.analyzer.analyze(&stream, id, index))
            .map_err(|e| {
                log::warn!("{}: {}", id, e);
                e.to_string()
            });
        DocumentReport {
            id: id.to_string(),
            outcome,
        }
    }

    /// Analyze documents; reports keep input order.
    pub fn analyze_paths(&self, documents: &[(String, PathBuf)]) -> Vec<DocumentReport> {
        let analyze = |(index, (id, path)): (usize, &(String, PathBuf))| self.analyze_one(id, index, path);
        let reports: Vec<DocumentReport> = if self.parallel {
            documents.par_iter().enumerate().map(analyze).collect()
        } else {
            documents.iter().enumerate().map(analyze).collect()
        };

        let failed = reports.iter().filter(|r| !r.is_ok()).count();
        log::info!(
            "Analyzed {} documents ({} failed)",
            reports.len(),
            failed
        );
        reports
    }

    /// Analyze every document of a collection.
    pub fn analyze(&self, collection: &Collection) -> Vec<DocumentReport> {
        self.analyze_paths(&collection.document_paths())
    }

    /// Analyze and rank a collection, stamping the result with the current time.
    pub fn run(&self, collection: &Collection, ranker: &EmbeddingRanker) -> Result<CollectionRun> {
        self.run_at(collection, ranker, Utc::now())
    }

    /// Analyze and rank a collection.
    ///
    /// Fails only on a persona without role and task; document failures are
    /// kept in the reports.
    pub fn run_at(
        &self,
        collection: &Collection,
        ranker: &EmbeddingRanker,
        at: DateTime<Utc>,
    ) -> Result<CollectionRun> {
        let started = Instant::now();
        let context = collection.config().persona_context()?;
        let reports = self.analyze(collection);
        let mut run = rank_reports(collection.config(), &context, reports, ranker, at);
        run.result.metadata = run.result.metadata.with_processing_time(started.elapsed());
        Ok(run)
    }
}

/// Rank the sections of successfully analyzed documents.
pub fn rank_reports(
    config: &CollectionConfig,
    context: &PersonaContext,
    reports: Vec<DocumentReport>,
    ranker: &EmbeddingRanker,
    at: DateTime<Utc>,
) -> CollectionRun {
    let sections: Vec<_> = reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .flat_map(|a| a.sections.iter().cloned())
        .collect();

    log::debug!(
        "Ranking {} sections from {} documents",
        sections.len(),
        reports.iter().filter(|r| r.is_ok()).count()
    );
    let ranking = ranker.rank(context, &sections);

    let metadata = RankingMetadata::new(config.document_names(), context, at);
    let result = RankingResult::from_ranking(metadata, &ranking);
    CollectionRun {
        reports,
        ranking,
        result,
    }
}

//! Output records with the field spelling downstream consumers expect.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{DocumentOutline, HeadingLevel};
use crate::rank::{PersonaContext, Ranking};

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// Structural result for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlineResult {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
    /// Set when the document could not be processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutlineResult {
    /// Build from a resolved outline.
    pub fn from_outline(outline: &DocumentOutline) -> Self {
        Self {
            title: outline.title.clone(),
            outline: outline
                .headings
                .iter()
                .map(|h| OutlineEntry {
                    level: h.level,
                    text: h.text.clone(),
                    page: h.page,
                })
                .collect(),
            error: None,
        }
    }

    /// Error artifact with empty structural content.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Check whether this is an error artifact.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Ranking run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingMetadata {
    /// Every configured document, including failed ones
    pub input_documents: Vec<String>,
    /// Persona role
    pub persona: String,
    /// Task text
    pub job_to_be_done: String,
    /// RFC 3339 UTC timestamp
    pub processing_timestamp: String,
    /// Wall-clock seconds spent analyzing and ranking
    #[serde(default)]
    pub total_processing_time: f64,
}

impl RankingMetadata {
    /// Create metadata stamped with the given time.
    pub fn new(input_documents: Vec<String>, context: &PersonaContext, at: DateTime<Utc>) -> Self {
        Self {
            input_documents,
            persona: context.role.clone(),
            job_to_be_done: context.task.clone(),
            processing_timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            total_processing_time: 0.0,
        }
    }

    /// Record the time the run took.
    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.total_processing_time = elapsed.as_secs_f64();
        self
    }
}

/// One selected section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

/// Refined excerpt of one selected section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
    /// Heading of the section the excerpt comes from
    #[serde(default)]
    pub parent_section: Option<String>,
    #[serde(default)]
    pub relevance_score: f32,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Ranking result for a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub metadata: RankingMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl RankingResult {
    /// Build from a ranking; both lists follow importance order.
    pub fn from_ranking(metadata: RankingMetadata, ranking: &Ranking) -> Self {
        let extracted_sections = ranking
            .selected
            .iter()
            .map(|r| ExtractedSection {
                document: r.section.document_id.clone(),
                section_title: r.section.title.clone(),
                importance_rank: r.importance_rank,
                page_number: r.section.page,
            })
            .collect();
        let subsection_analysis = ranking
            .selected
            .iter()
            .map(|r| SubsectionAnalysis {
                document: r.section.document_id.clone(),
                refined_text: r.refined_text.clone(),
                page_number: r.section.page,
                parent_section: Some(r.section.title.clone()),
                relevance_score: r.relevance_score,
                key_points: r.key_points.clone(),
            })
            .collect();

        Self {
            metadata,
            extracted_sections,
            subsection_analysis,
        }
    }
}

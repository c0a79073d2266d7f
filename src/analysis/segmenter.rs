//! Section segmenter.
//!
//! A section opens at a heading and runs up to the next heading of equal or
//! higher level. Nested headings stay inside their parent's body, so the
//! section list is flat while each section keeps its opening level.

use crate::model::{DocumentOutline, HeadingLevel, RunStream, Section, TextRun};
use crate::text::{collapse_whitespace, join_fragments};

/// Title used for page-level sections of heading-less documents.
pub fn page_section_title(page: u32) -> String {
    format!("Content from Page {}", page)
}

/// Groups body text under the outline's headings.
#[derive(Debug, Clone)]
pub struct SectionSegmenter<'a> {
    document_id: &'a str,
    document_index: usize,
}

impl<'a> SectionSegmenter<'a> {
    /// Create a segmenter for one document of a collection.
    pub fn new(document_id: &'a str, document_index: usize) -> Self {
        Self {
            document_id,
            document_index,
        }
    }

    /// Split the run stream into sections.
    pub fn segment(&self, outline: &DocumentOutline, stream: &RunStream) -> Vec<Section> {
        let mut runs: Vec<&TextRun> = stream
            .runs
            .iter()
            .filter(|r| !r.text.trim().is_empty() && !outline.title_covers(r.page, r.reading_order))
            .collect();
        runs.sort_by_key(|r| (r.page, r.reading_order));

        if outline.headings.is_empty() {
            return self.page_sections(&runs);
        }

        let headings = &outline.headings;
        headings
            .iter()
            .enumerate()
            .map(|(i, heading)| {
                let start = (heading.page, heading.last_order);
                let end = headings[i + 1..]
                    .iter()
                    .find(|next| next.level <= heading.level)
                    .map(|next| (next.page, next.first_order));

                let body = runs
                    .iter()
                    .filter(|r| {
                        let key = (r.page, r.reading_order);
                        key > start && end.map_or(true, |e| key < e)
                    })
                    .map(|r| r.text.as_str());

                Section {
                    document_id: self.document_id.to_string(),
                    document_index: self.document_index,
                    title: heading.text.clone(),
                    page: heading.page,
                    reading_order: heading.first_order,
                    body_text: join_body(body),
                    level: heading.level,
                }
            })
            .collect()
    }

    /// One section per page with text, for documents without headings.
    fn page_sections(&self, runs: &[&TextRun]) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        for run in runs {
            match sections.last_mut() {
                Some(section) if section.page == run.page => {
                    section.body_text = join_fragments(&section.body_text, &run.text);
                }
                _ => sections.push(Section {
                    document_id: self.document_id.to_string(),
                    document_index: self.document_index,
                    title: page_section_title(run.page),
                    page: run.page,
                    reading_order: run.reading_order,
                    body_text: run.text.trim().to_string(),
                    level: HeadingLevel::H1,
                }),
            }
        }
        for section in &mut sections {
            section.body_text = collapse_whitespace(&section.body_text);
        }
        sections
    }
}

fn join_body<'t>(parts: impl Iterator<Item = &'t str>) -> String {
    let joined = parts.fold(String::new(), |acc, part| join_fragments(&acc, part));
    collapse_whitespace(&joined)
}

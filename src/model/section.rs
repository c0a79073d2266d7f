//! Sections: body text grouped under an opening heading.

use serde::{Deserialize, Serialize};

use super::HeadingLevel;

/// A contiguous slice of a document opened by a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the owning document (usually its file name)
    pub document_id: String,
    /// Position of the owning document within its collection
    pub document_index: usize,
    /// Opening heading text
    pub title: String,
    /// Page of the opening heading
    pub page: u32,
    /// Reading order of the opening heading
    pub reading_order: usize,
    /// Text between the heading and the next heading of equal or higher level
    pub body_text: String,
    /// Level of the opening heading
    pub level: HeadingLevel,
}

impl Section {
    /// Title and body as one string.
    pub fn full_text(&self) -> String {
        if self.body_text.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body_text)
        }
    }

    /// Collection-wide ordering key (document, page, reading order).
    pub fn order_key(&self) -> (usize, u32, usize) {
        (self.document_index, self.page, self.reading_order)
    }
}

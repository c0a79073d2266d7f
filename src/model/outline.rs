//! Document outline types.

use serde::{Deserialize, Serialize};

/// Heading level in the three-level outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Level for a 1-based depth; depths beyond 3 collapse into H3.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// 1-based depth.
    pub fn depth(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Output spelling ("H1", "H2", "H3").
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A heading with its resolved level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedHeading {
    /// Heading text (numbering prefix removed)
    pub text: String,
    /// Resolved level
    pub level: HeadingLevel,
    /// Page number (1-indexed)
    pub page: u32,
    /// Scorer confidence in 0..=1
    pub confidence: f32,
    /// Reading order of the heading's first run
    pub first_order: usize,
    /// Reading order of the heading's last run
    pub last_order: usize,
}

/// Title plus ordered headings of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutline {
    /// Document title (may be empty)
    pub title: String,
    /// Headings ordered by (page, reading order)
    pub headings: Vec<ClassifiedHeading>,
    /// Reading-order span of the runs forming the title, if the title came from page text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_span: Option<(u32, usize, usize)>,
}

impl DocumentOutline {
    /// Outline with an empty title and no headings.
    pub fn untitled() -> Self {
        Self::default()
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Count headings at a level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.headings.iter().filter(|h| h.level == level).count()
    }

    /// Whether a run belongs to the title.
    pub fn title_covers(&self, page: u32, order: usize) -> bool {
        matches!(self.title_span, Some((p, first, last)) if p == page && order >= first && order <= last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_ordering() {
        assert!(HeadingLevel::H1 < HeadingLevel::H2);
        assert!(HeadingLevel::H2 < HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_depth(5), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_depth(1).depth(), 1);
    }

    #[test]
    fn test_heading_level_serialization() {
        assert_eq!(serde_json::to_string(&HeadingLevel::H2).unwrap(), "\"H2\"");
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
    }

    #[test]
    fn test_title_covers() {
        let outline = DocumentOutline {
            title: "Guide".to_string(),
            headings: Vec::new(),
            title_span: Some((1, 0, 1)),
        };
        assert!(outline.title_covers(1, 1));
        assert!(!outline.title_covers(1, 2));
        assert!(!outline.title_covers(2, 0));
        assert!(outline.is_empty());
    }
}

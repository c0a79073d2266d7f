//! Heading candidates produced by the run merger.

use serde::{Deserialize, Serialize};

use super::{BBox, TextRun};

/// Structural pattern family a candidate matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternTag {
    /// "1. Introduction"
    #[serde(rename = "NUMERIC_1")]
    Numeric1,
    /// "1.1 Background"
    #[serde(rename = "NUMERIC_1_1")]
    Numeric11,
    /// "1.1.1 Prior Work" (and deeper)
    #[serde(rename = "NUMERIC_1_1_1")]
    Numeric111,
    /// "Chapter 3", "第3章", "अध्याय 3", "제3장"
    ChapterWord,
    /// Common section names ("Abstract", "Conclusion")
    Keyword,
    /// Script-specific section names ("はじめに", "परिचय")
    ScriptMarker,
    /// "Part A", "Section III", "Appendix B"
    AlphaMarker,
    /// "IV. Results"
    Roman,
    /// "B. Methods", "가. 개요"
    Letter,
    /// Short all-caps line
    AllCaps,
}

impl PatternTag {
    /// Outline depth implied by explicit numbering.
    pub fn explicit_depth(&self) -> Option<u8> {
        match self {
            PatternTag::Numeric1 => Some(1),
            PatternTag::Numeric11 => Some(2),
            PatternTag::Numeric111 => Some(3),
            _ => None,
        }
    }

    /// Whether the tag marks the start of a new outline item.
    pub fn is_outline_marker(&self) -> bool {
        matches!(
            self,
            PatternTag::Numeric1
                | PatternTag::Numeric11
                | PatternTag::Numeric111
                | PatternTag::ChapterWord
        )
    }
}

/// One or more adjacent runs treated as a single typographic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedHeadingCandidate {
    /// Merged text
    pub text: String,
    /// Font family of the first run
    pub font_family: String,
    /// Font size of the first run
    pub font_size: f32,
    /// Bold flag of the first run
    pub is_bold: bool,
    /// Italic flag of the first run
    pub is_italic: bool,
    /// Union of the merged runs' boxes
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
    /// Reading order of the first merged run
    pub first_order: usize,
    /// Reading order of the last merged run
    pub last_order: usize,
    /// Number of runs merged into this candidate
    pub run_count: usize,
    /// Best structural pattern, filled in by the scorer
    pub pattern_tag: Option<PatternTag>,
    /// Whitespace/placement signal in 0..=1
    pub position_score: f32,
    /// Exceeded the maximum heading length while merging
    pub oversized: bool,
}

impl MergedHeadingCandidate {
    /// Start a candidate from a single run.
    pub fn from_run(run: &TextRun) -> Self {
        Self {
            text: run.text.trim().to_string(),
            font_family: run.font_family.clone(),
            font_size: run.font_size,
            is_bold: run.is_bold,
            is_italic: run.is_italic,
            bbox: run.bbox,
            page: run.page,
            first_order: run.reading_order,
            last_order: run.reading_order,
            run_count: 1,
            pattern_tag: None,
            position_score: 0.0,
            oversized: false,
        }
    }

    /// View this candidate as an atomic run.
    pub fn as_run(&self) -> TextRun {
        TextRun {
            text: self.text.clone(),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            is_bold: self.is_bold,
            is_italic: self.is_italic,
            bbox: self.bbox,
            page: self.page,
            reading_order: self.first_order,
        }
    }

    /// Number of characters in the text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether a run with the given page and order belongs to this candidate.
    pub fn covers(&self, page: u32, order: usize) -> bool {
        self.page == page && order >= self.first_order && order <= self.last_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_depth() {
        assert_eq!(PatternTag::Numeric1.explicit_depth(), Some(1));
        assert_eq!(PatternTag::Numeric111.explicit_depth(), Some(3));
        assert_eq!(PatternTag::AllCaps.explicit_depth(), None);
        assert!(PatternTag::ChapterWord.is_outline_marker());
        assert!(!PatternTag::Keyword.is_outline_marker());
    }

    #[test]
    fn test_pattern_tag_serialization() {
        let json = serde_json::to_string(&PatternTag::Numeric11).unwrap();
        assert_eq!(json, "\"NUMERIC_1_1\"");
        let json = serde_json::to_string(&PatternTag::AllCaps).unwrap();
        assert_eq!(json, "\"ALL_CAPS\"");
    }

    #[test]
    fn test_candidate_from_run_roundtrip() {
        let run = TextRun::new("  Overview ", "Arial-Bold", 16.0, BBox::new(72.0, 90.0, 160.0, 106.0), 2, 7);
        let cand = MergedHeadingCandidate::from_run(&run);
        assert_eq!(cand.text, "Overview");
        assert!(cand.covers(2, 7));
        assert!(!cand.covers(1, 7));

        let back = cand.as_run();
        assert_eq!(back.reading_order, 7);
        assert!(back.is_bold);
    }
}

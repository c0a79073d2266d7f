//! Text runs as delivered by the PDF layer.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in top-down page coordinates.
///
/// `y0` is the top edge and `y1` the bottom edge (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Vertical gap from the bottom of `self` to the top of `below`.
    ///
    /// Negative when the boxes overlap vertically.
    pub fn vertical_gap_to(&self, below: &BBox) -> f32 {
        below.y0 - self.y1
    }
}

/// A styled text fragment with its position on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Font family name (e.g., "Helvetica-Bold")
    pub font_family: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font is bold
    #[serde(default)]
    pub is_bold: bool,
    /// Whether the font is italic
    #[serde(default)]
    pub is_italic: bool,
    /// Position on the page
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
    /// Document-wide reading order
    #[serde(alias = "reading_order_index")]
    pub reading_order: usize,
}

impl TextRun {
    /// Create a run, inferring bold/italic flags from the font name.
    pub fn new(
        text: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f32,
        bbox: BBox,
        page: u32,
        reading_order: usize,
    ) -> Self {
        let font_family = font_family.into();
        let lower = font_family.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text: text.into(),
            font_family,
            font_size,
            is_bold,
            is_italic,
            bbox,
            page,
            reading_order,
        }
    }

    /// Override the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = bold;
        self
    }

    /// Number of characters, ignoring surrounding whitespace.
    pub fn char_count(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// The complete run stream of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStream {
    /// Runs in reading order
    pub runs: Vec<TextRun>,
    /// Title from the document information dictionary, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_title: Option<String>,
    /// Total number of pages
    #[serde(default)]
    pub page_count: u32,
}

impl RunStream {
    /// Wrap a run list, deriving the page count from the runs.
    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        let page_count = runs.iter().map(|r| r.page).max().unwrap_or(0);
        Self {
            runs,
            metadata_title: None,
            page_count,
        }
    }

    /// Check if the stream has no text at all.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Sort runs by (page, reading order).
    pub fn sort(&mut self) {
        self.runs.sort_by_key(|r| (r.page, r.reading_order));
    }
}

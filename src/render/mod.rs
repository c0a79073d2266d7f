//! Output records and their rendering.

mod json;
mod result;
mod text;

pub use json::{to_json, JsonFormat};
pub use result::{
    ExtractedSection, OutlineEntry, OutlineResult, RankingMetadata, RankingResult,
    SubsectionAnalysis,
};
pub use text::inspection_to_text;

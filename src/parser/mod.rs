//! PDF layer: turns documents into [`RunStream`](crate::model::RunStream)s.

mod backend;
mod options;
mod runs;
mod source;

pub use backend::{
    decode_bytes, LopdfBackend, Operand, Operation, PageFont, PageId, PdfBackend,
    DEFAULT_PAGE_SIZE,
};
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use runs::RunExtractor;
pub use source::{AutoRunSource, JsonRunSource, PdfRunSource, RunSource};

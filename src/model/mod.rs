//! Document model types.
//!
//! These types carry a document from raw text runs through heading
//! candidates to the final outline and sections. They are independent of the
//! PDF library that produced the runs.

mod candidate;
mod outline;
mod run;
mod section;

pub use candidate::{MergedHeadingCandidate, PatternTag};
pub use outline::{ClassifiedHeading, DocumentOutline, HeadingLevel};
pub use run::{BBox, RunStream, TextRun};
pub use section::Section;

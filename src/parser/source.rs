//! Run sources: where a document's [`RunStream`] comes from.

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::detect::{detect_input_from_bytes, InputKind};
use crate::error::{Error, Result};
use crate::model::{RunStream, TextRun};

use super::backend::{LopdfBackend, PdfBackend};
use super::options::{ErrorMode, PageSelection, ParseOptions};
use super::runs::RunExtractor;

/// Produces the run stream of one document.
pub trait RunSource: Send + Sync {
    /// Read a document from bytes.
    fn read_bytes(&self, data: &[u8]) -> Result<RunStream>;

    /// Read a document from a file.
    fn read_path(&self, path: &Path) -> Result<RunStream> {
        let data = fs::read(path)?;
        self.read_bytes(&data)
    }
}

/// Extracts runs from PDF content streams.
#[derive(Debug, Clone, Default)]
pub struct PdfRunSource {
    options: ParseOptions,
}

impl PdfRunSource {
    /// Create a source with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Extract the run stream of an opened document.
    pub fn extract<B: PdfBackend + ?Sized>(&self, backend: &B) -> Result<RunStream> {
        let pages = backend.pages();
        let page_count = pages.len() as u32;
        check_selection(&self.options.pages, page_count, self.options.error_mode)?;

        let extractor = RunExtractor::new(backend);
        let mut page_spans = Vec::new();
        for (&number, &id) in pages.iter().filter(|(n, _)| self.options.pages.includes(**n)) {
            match extractor.page_spans(number, id) {
                Ok(spans) => page_spans.push(spans),
                Err(e) => match self.options.error_mode {
                    ErrorMode::Strict => return Err(e),
                    ErrorMode::Lenient => log::warn!("Skipping page {}: {}", number, e),
                },
            }
        }

        // Grouping is pure; backend access above stays on this thread
        let per_page: Vec<Vec<TextRun>> = if self.options.parallel {
            page_spans.into_par_iter().map(|p| p.into_runs()).collect()
        } else {
            page_spans.into_iter().map(|p| p.into_runs()).collect()
        };

        let mut runs: Vec<TextRun> = per_page.into_iter().flatten().collect();
        for (order, run) in runs.iter_mut().enumerate() {
            run.reading_order = order;
        }
        log::debug!("Extracted {} runs from {} pages", runs.len(), page_count);

        Ok(RunStream {
            runs,
            metadata_title: backend.info_title(),
            page_count,
        })
    }
}

impl RunSource for PdfRunSource {
    fn read_bytes(&self, data: &[u8]) -> Result<RunStream> {
        self.extract(&LopdfBackend::load_bytes(data)?)
    }

    fn read_path(&self, path: &Path) -> Result<RunStream> {
        self.extract(&LopdfBackend::load_file(path)?)
    }
}

fn check_selection(selection: &PageSelection, page_count: u32, mode: ErrorMode) -> Result<()> {
    let highest = match selection {
        PageSelection::All => return Ok(()),
        PageSelection::Range(range) => *range.end(),
        PageSelection::Pages(pages) => pages.iter().copied().max().unwrap_or(0),
    };
    if highest > page_count {
        match mode {
            ErrorMode::Strict => return Err(Error::PageOutOfRange(highest, page_count)),
            ErrorMode::Lenient => log::warn!(
                "Page {} requested but document has {} pages",
                highest,
                page_count
            ),
        }
    }
    Ok(())
}

/// Reads pre-extracted run dumps.
///
/// Accepts a serialized [`RunStream`] or a bare array of runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRunSource;

impl RunSource for JsonRunSource {
    fn read_bytes(&self, data: &[u8]) -> Result<RunStream> {
        let first = data.iter().find(|b| !b.is_ascii_whitespace());
        let mut stream = match first {
            Some(b'[') => RunStream::from_runs(serde_json::from_slice::<Vec<TextRun>>(data)?),
            Some(b'{') => {
                let mut stream: RunStream = serde_json::from_slice(data)?;
                let highest = stream.runs.iter().map(|r| r.page).max().unwrap_or(0);
                stream.page_count = stream.page_count.max(highest);
                stream
            }
            _ => return Err(Error::UnknownFormat),
        };
        stream.sort();
        Ok(stream)
    }
}

/// Dispatches to [`PdfRunSource`] or [`JsonRunSource`] by sniffing the input.
#[derive(Debug, Clone, Default)]
pub struct AutoRunSource {
    pdf: PdfRunSource,
}

impl AutoRunSource {
    /// Create a source using the given PDF parse options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            pdf: PdfRunSource::new(options),
        }
    }
}

impl RunSource for AutoRunSource {
    fn read_bytes(&self, data: &[u8]) -> Result<RunStream> {
        match detect_input_from_bytes(data)? {
            InputKind::Pdf(format) => {
                log::debug!("Reading {}", format);
                self.pdf.read_bytes(data)
            }
            InputKind::RunDump => JsonRunSource.read_bytes(data),
        }
    }
}

//! Content stream interpretation into positioned text runs.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{BBox, TextRun};
use crate::text::{collapse_whitespace, is_spaceless_script_char};

use super::backend::{Operand, Operation, PageId, PdfBackend};

/// TJ adjustment (in 1/1000 text space units) treated as a word space.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Leading used by `T*` when no `TL` was set.
const DEFAULT_LEADING: f32 = 12.0;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Ascent and descent as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// Text matrix with its line matrix.
#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Advance the pen along the baseline.
    fn advance(&mut self, width: f32) {
        self.e += width * self.a;
        self.f += width * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn vertical_scale(&self) -> f32 {
        let scale = (self.b * self.b + self.d * self.d).sqrt();
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }
}

/// A string shown by one text operator, in PDF (bottom-up) coordinates.
#[derive(Debug, Clone, PartialEq)]
struct Span {
    text: String,
    font: String,
    size: f32,
    x: f32,
    baseline: f32,
    width: f32,
}

#[derive(Debug)]
struct TextState {
    matrix: TextMatrix,
    leading: f32,
    font_resource: Vec<u8>,
    font_size: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: TextMatrix::default(),
            leading: DEFAULT_LEADING,
            font_resource: Vec::new(),
            font_size: 12.0,
        }
    }
}

/// Raw spans of one page, ready for grouping.
#[derive(Debug)]
pub(crate) struct PageSpans {
    page: u32,
    height: f32,
    spans: Vec<Span>,
}

impl PageSpans {
    /// Group into runs; needs no backend access.
    pub(crate) fn into_runs(self) -> Vec<TextRun> {
        group_spans(self.spans, self.page, self.height)
    }
}

/// Extracts [`TextRun`]s from pages of a [`PdfBackend`].
pub struct RunExtractor<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: PdfBackend + ?Sized> RunExtractor<'a, B> {
    /// Create an extractor over a backend.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract the runs of one page in reading order.
    ///
    /// `reading_order` is left at 0; callers number runs document-wide.
    pub fn page_runs(&self, page_number: u32, page_id: PageId) -> Result<Vec<TextRun>> {
        Ok(self.page_spans(page_number, page_id)?.into_runs())
    }

    /// Interpret one page's content stream without grouping.
    pub(crate) fn page_spans(&self, page_number: u32, page_id: PageId) -> Result<PageSpans> {
        let (_, page_height) = self.backend.page_size(page_id);
        let mut page = PageSpans {
            page: page_number,
            height: page_height,
            spans: Vec::new(),
        };

        let content = self.backend.page_content(page_id)?;
        if content.is_empty() {
            return Ok(page);
        }
        let fonts: HashMap<Vec<u8>, String> = self
            .backend
            .page_fonts(page_id)?
            .into_iter()
            .map(|f| (f.resource, f.base_font))
            .collect();
        let operations = self.backend.decode_content(&content)?;
        page.spans = self.spans(page_id, &operations, &fonts);
        Ok(page)
    }

    fn spans(
        &self,
        page_id: PageId,
        operations: &[Operation],
        fonts: &HashMap<Vec<u8>, String>,
    ) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut state = TextState::default();
        let mut in_text_block = false;

        for op in operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text_block = true;
                    state.matrix = TextMatrix::default();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let Some(Operand::Name(name)) = op.operands.first() {
                        state.font_resource = name.clone();
                    }
                    state.font_size = op.number(1, state.font_size);
                }
                "TL" => state.leading = op.number(0, state.leading),
                "Td" => state.matrix.translate(op.number(0, 0.0), op.number(1, 0.0)),
                "TD" => {
                    let ty = op.number(1, 0.0);
                    state.leading = -ty;
                    state.matrix.translate(op.number(0, 0.0), ty);
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        state.matrix.set(
                            op.number(0, 1.0),
                            op.number(1, 0.0),
                            op.number(2, 0.0),
                            op.number(3, 1.0),
                            op.number(4, 0.0),
                            op.number(5, 0.0),
                        );
                    }
                }
                "T*" => state.matrix.translate(0.0, -state.leading),
                "Tj" | "TJ" | "'" | "\"" if in_text_block => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        state.matrix.translate(0.0, -state.leading);
                    }
                    let text = self.shown_text(page_id, &state.font_resource, op);
                    if let Some(span) = emit_span(&mut state, fonts, text) {
                        spans.push(span);
                    }
                }
                _ => {}
            }
        }
        spans
    }

    /// Decode the string operand(s) of a show operator.
    fn shown_text(&self, page_id: PageId, font: &[u8], op: &Operation) -> String {
        let decode = |bytes: &[u8]| self.backend.decode_text(page_id, font, bytes);
        match op.operator.as_str() {
            "TJ" => {
                let Some(Operand::Array(items)) = op.operands.first() else {
                    return String::new();
                };
                let mut combined = String::new();
                for item in items {
                    match item {
                        Operand::Bytes(bytes) => combined.push_str(&decode(bytes)),
                        Operand::Number(n) => {
                            // Negative adjustments move right; large ones are word gaps
                            if -n > TJ_SPACE_THRESHOLD && needs_space(&combined) {
                                combined.push(' ');
                            }
                        }
                        _ => {}
                    }
                }
                combined
            }
            // `"` carries word and char spacing before the string
            "\"" => match op.operands.get(2) {
                Some(Operand::Bytes(bytes)) => decode(bytes),
                _ => String::new(),
            },
            _ => match op.operands.first() {
                Some(Operand::Bytes(bytes)) => decode(bytes),
                _ => String::new(),
            },
        }
    }
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => !c.is_whitespace() && c != '\u{00A0}' && !is_spaceless_script_char(c),
        None => false,
    }
}

fn emit_span(state: &mut TextState, fonts: &HashMap<Vec<u8>, String>, text: String) -> Option<Span> {
    let size = state.font_size.abs() * state.matrix.vertical_scale();
    let width = text.chars().count() as f32 * state.font_size.abs() * AVG_GLYPH_WIDTH;
    let (x, baseline) = state.matrix.position();
    state.matrix.advance(width);

    if text.trim().is_empty() || size <= 0.0 {
        return None;
    }
    let font = fonts
        .get(&state.font_resource)
        .cloned()
        .unwrap_or_else(|| String::from_utf8_lossy(&state.font_resource).into_owned());

    Some(Span {
        text,
        font,
        size,
        x,
        baseline,
        width: width * (state.matrix.a * state.matrix.a + state.matrix.b * state.matrix.b).sqrt(),
    })
}

/// Order spans into lines and merge neighbors with the same font into runs.
fn group_spans(mut spans: Vec<Span>, page: u32, page_height: f32) -> Vec<TextRun> {
    // Top of page first, then left to right
    spans.sort_by(|a, b| {
        b.baseline
            .total_cmp(&a.baseline)
            .then(a.x.total_cmp(&b.x))
    });

    let mut lines: Vec<Vec<Span>> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some(line) if same_line(&line[0], &span) => line.push(span),
            _ => lines.push(vec![span]),
        }
    }

    let mut runs = Vec::new();
    for mut line in lines {
        line.sort_by(|a, b| a.x.total_cmp(&b.x));
        let mut current: Option<Span> = None;
        for span in line {
            current = match current {
                Some(mut acc) if continues(&acc, &span) => {
                    let gap = span.x - (acc.x + acc.width);
                    let glue = gap > acc.size * 0.15 && needs_space(&acc.text);
                    if glue && !span.text.starts_with(char::is_whitespace) {
                        acc.text.push(' ');
                    }
                    acc.text.push_str(&span.text);
                    acc.width = (span.x + span.width - acc.x).max(acc.width);
                    Some(acc)
                }
                Some(acc) => {
                    runs.push(to_run(acc, page, page_height));
                    Some(span)
                }
                None => Some(span),
            };
        }
        if let Some(acc) = current {
            runs.push(to_run(acc, page, page_height));
        }
    }
    runs
}

fn same_line(a: &Span, b: &Span) -> bool {
    (a.baseline - b.baseline).abs() <= a.size.min(b.size) * 0.5
}

fn continues(acc: &Span, next: &Span) -> bool {
    acc.font == next.font
        && (acc.size - next.size).abs() < 0.1
        && next.x - (acc.x + acc.width) < acc.size * 2.0
}

fn to_run(span: Span, page: u32, page_height: f32) -> TextRun {
    let top = page_height - (span.baseline + span.size * ASCENT);
    let bottom = page_height - (span.baseline - span.size * DESCENT);
    let bbox = BBox::new(span.x, top, span.x + span.width, bottom);
    TextRun::new(collapse_whitespace(&span.text), span.font, span.size, bbox, page, 0)
}

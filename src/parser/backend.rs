//! PDF backend abstraction.
//!
//! Run extraction talks to a [`PdfBackend`], never to lopdf directly, so a
//! different PDF library (or an in-memory fake in tests) can be swapped in.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// US Letter, used when a page carries no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// A font resource of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFont {
    /// Resource name used by `Tf` (e.g. "F1")
    pub resource: Vec<u8>,
    /// Base font name (e.g. "Helvetica-Bold")
    pub base_font: String,
}

/// An operand of a content stream operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f32),
    Name(Vec<u8>),
    Bytes(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    /// Numeric value, if the operand is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One content stream operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl Operation {
    /// Create an operation.
    pub fn new(operator: &str, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    /// Numeric operand at `index`, or `default`.
    pub fn number(&self, index: usize, default: f32) -> f32 {
        self.operands
            .get(index)
            .and_then(Operand::as_number)
            .unwrap_or(default)
    }
}

/// Read access to a PDF document.
pub trait PdfBackend {
    /// All pages as page number (1-based) → id.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page width and height in points.
    fn page_size(&self, page: PageId) -> (f32, f32);

    /// Font resources of a page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<PageFont>>;

    /// Decompressed content stream of a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Tokenize content stream bytes into operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<Operation>>;

    /// Decode string bytes shown with a font resource of a page.
    fn decode_text(&self, page: PageId, font: &[u8], bytes: &[u8]) -> String;

    /// Title from the document information dictionary.
    fn info_title(&self) -> Option<String>;
}

/// Decode string bytes without font information.
///
/// Handles UTF-16BE with BOM, then UTF-8, then falls back to Latin-1.
pub fn decode_bytes(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// [`PdfBackend`] backed by `lopdf`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::checked(LopdfDocument::load(path)?)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Self::checked(LopdfDocument::load_mem(data)?)
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        // lopdf has already tried the empty user password at this point
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may be unreadable");
        }
        Ok(Self { doc })
    }

    /// PDF version string (e.g. "1.7").
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Look up a page attribute, following the `Parent` chain.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page;
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
            dict = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn stream_bytes(&self, id: ObjectId) -> Result<Vec<u8>> {
        match self.doc.get_object(id)? {
            Object::Stream(s) => Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone())),
            _ => Err(Error::PdfParse(format!("object {:?} is not a stream", id))),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> (f32, f32) {
        let Ok(dict) = self.doc.get_dictionary(page) else {
            return DEFAULT_PAGE_SIZE;
        };
        let media_box = self
            .inherited(dict, b"MediaBox")
            .map(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| match self.resolve(v) {
                        Object::Integer(i) => Some(*i as f32),
                        Object::Real(r) => Some(*r),
                        _ => None,
                    })
                    .collect::<Vec<f32>>()
            });
        match media_box.as_deref() {
            Some([x0, y0, x1, y1]) if x1 > x0 && y1 > y0 => (x1 - x0, y1 - y0),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<PageFont>> {
        let fonts = self.doc.get_page_fonts(page)?;
        Ok(fonts
            .iter()
            .map(|(resource, dict)| PageFont {
                resource: resource.clone(),
                base_font: dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned())
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        let dict = self.doc.get_dictionary(page)?;
        let contents = match dict.get(b"Contents") {
            Ok(c) => c,
            // A page without content is blank, not broken
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(id) => match self.doc.get_object(*id)? {
                Object::Array(parts) => concat_streams(self, parts),
                _ => self.stream_bytes(*id),
            },
            Object::Array(parts) => concat_streams(self, parts),
            _ => Err(Error::PdfParse("page has an invalid /Contents entry".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<Operation>> {
        let content = lopdf::content::Content::decode(data)?;
        Ok(content
            .operations
            .iter()
            .map(|op| Operation {
                operator: op.operator.clone(),
                operands: op.operands.iter().map(to_operand).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font: &[u8], bytes: &[u8]) -> String {
        let decoded = self.doc.get_page_fonts(page).ok().and_then(|fonts| {
            let dict = fonts.get(font)?;
            let encoding = dict.get_font_encoding(&self.doc).ok()?;
            LopdfDocument::decode_text(&encoding, bytes).ok()
        });
        decoded.unwrap_or_else(|| decode_bytes(bytes))
    }

    fn info_title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?;
        let dict = match self.resolve(info) {
            Object::Dictionary(d) => d,
            _ => return None,
        };
        match self.resolve(dict.get(b"Title").ok()?) {
            Object::String(bytes, _) => {
                let title = decode_bytes(bytes).trim().to_string();
                (!title.is_empty()).then_some(title)
            }
            _ => None,
        }
    }
}

fn concat_streams(backend: &LopdfBackend, parts: &[Object]) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    for part in parts {
        if let Object::Reference(id) = part {
            match backend.stream_bytes(*id) {
                Ok(data) => {
                    content.extend_from_slice(&data);
                    content.push(b'\n');
                }
                Err(e) => log::warn!("Skipping unreadable content stream {:?}: {}", id, e),
            }
        }
    }
    Ok(content)
}

fn to_operand(obj: &Object) -> Operand {
    match obj {
        Object::Integer(i) => Operand::Number(*i as f32),
        Object::Real(r) => Operand::Number(*r),
        Object::Name(n) => Operand::Name(n.clone()),
        Object::String(b, _) => Operand::Bytes(b.clone()),
        Object::Array(items) => Operand::Array(items.iter().map(to_operand).collect()),
        _ => Operand::Other,
    }
}

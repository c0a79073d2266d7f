//! Pattern library.
//!
//! A registry of `(script, tag, pattern, strength)` entries. Every candidate
//! is matched against every entry regardless of script; the strongest match
//! wins. Adding a script means adding entries, nothing else.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::PatternTag;
use crate::text::normalize;

/// Writing system a pattern was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Script {
    Latin,
    Japanese,
    Chinese,
    Korean,
    Devanagari,
    /// Applies to any cased script
    Universal,
}

/// One registered structural pattern.
#[derive(Debug, Clone)]
pub struct StructuralPattern {
    /// Script the pattern targets
    pub script: Script,
    /// Tag reported on a match
    pub tag: PatternTag,
    /// Strength in 0..=1
    pub strength: f32,
    /// Only match texts with at most this many words
    pub max_words: Option<usize>,
    regex: Regex,
}

impl StructuralPattern {
    /// Compile a pattern.
    ///
    /// A named `body` group, when present, marks the heading text that
    /// remains after the numbering prefix.
    pub fn new(script: Script, tag: PatternTag, pattern: &str, strength: f32) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Config(format!("invalid pattern {:?}: {}", pattern, e)))?;
        Ok(Self {
            script,
            tag,
            strength: strength.clamp(0.0, 1.0),
            max_words: None,
            regex,
        })
    }

    /// Restrict the pattern to short texts.
    pub fn with_max_words(mut self, words: usize) -> Self {
        self.max_words = Some(words);
        self
    }

    fn matches<'t>(&self, text: &'t str) -> Option<regex::Captures<'t>> {
        if let Some(max) = self.max_words {
            if text.split_whitespace().count() > max {
                return None;
            }
        }
        self.regex.captures(text)
    }
}

/// The best pattern match for a text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub tag: PatternTag,
    pub strength: f32,
    pub script: Script,
    /// Heading text without the numbering prefix, for numbered patterns
    pub body: Option<String>,
}

impl PatternMatch {
    /// Heading text to report for the matched (normalized) text.
    pub fn heading_text(&self, normalized: &str) -> String {
        match &self.body {
            Some(body) if !body.trim().is_empty() => body.trim().to_string(),
            _ => normalized.to_string(),
        }
    }
}

/// Built-in entries: (script, tag, pattern, strength, max words).
///
/// A numbered title starts with an uppercase or uncased letter, so wrapped
/// body lines such as "2.5 km from the beach" are not outline items.
const BUILTIN: &[(Script, PatternTag, &str, f32, Option<usize>)] = &[
    // Latin
    (Script::Latin, PatternTag::ChapterWord, r"(?i)^chapter\s+(?:\d+|[ivxlcdm]+)\b", 0.95, Some(14)),
    (Script::Latin, PatternTag::Numeric111, r"^\d{1,2}\.\d{1,2}\.\d{1,2}(?:\.\d{1,2})*\.?\s+(?P<body>[\p{Lu}\p{Lt}\p{Lo}].*)$", 0.85, None),
    (Script::Latin, PatternTag::Numeric11, r"^\d{1,2}\.\d{1,2}\.?\s+(?P<body>[\p{Lu}\p{Lt}\p{Lo}].*)$", 0.90, None),
    (Script::Latin, PatternTag::Numeric1, r"^\d{1,2}[.)]\s+(?P<body>[\p{Lu}\p{Lt}\p{Lo}].*)$", 0.80, None),
    (
        Script::Latin,
        PatternTag::Keyword,
        r"(?i)^(?:abstract|introduction|background|overview|summary|executive summary|conclusions?|discussion|results|methods?|methodology|related work|future work|evaluation|references|bibliography|acknowledge?ments?|appendix|appendices|table of contents|contents|preface|foreword|glossary|index|revision history|objectives?|scope|requirements)\s*:?$",
        0.80,
        None,
    ),
    (
        Script::Latin,
        PatternTag::AlphaMarker,
        r"(?i)^(?:part|section|appendix|annex|unit|module|lesson|step)\s+(?:\d+|[ivxlcdm]+|[a-z])\b[.:]?(?:\s.*)?$",
        0.70,
        Some(12),
    ),
    (Script::Latin, PatternTag::Roman, r"^[IVXLCDM]+\.\s+\p{L}", 0.60, Some(12)),
    (Script::Latin, PatternTag::Letter, r"^[A-Z][.)]\s+\p{Lu}", 0.50, Some(10)),
    // Japanese
    (Script::Japanese, PatternTag::ChapterWord, r"^第\s*[0-9一二三四五六七八九十百]+\s*[章部編]", 0.95, None),
    (Script::Japanese, PatternTag::AlphaMarker, r"^第\s*[0-9一二三四五六七八九十百]+\s*節", 0.70, None),
    (
        Script::Japanese,
        PatternTag::ScriptMarker,
        r"^(?:はじめに|まえがき|おわりに|あとがき|序論|結論|概要|要旨|参考文献|目次|付録)\s*$",
        0.80,
        None,
    ),
    // Chinese
    (Script::Chinese, PatternTag::ChapterWord, r"^第\s*[0-9一二三四五六七八九十百零〇]+\s*[章篇]", 0.95, None),
    (Script::Chinese, PatternTag::AlphaMarker, r"^[一二三四五六七八九十]+、\s*\S", 0.70, Some(8)),
    (
        Script::Chinese,
        PatternTag::ScriptMarker,
        r"^(?:摘要|引言|前言|绪论|结论|参考文献|附录|目录|概述|总结)\s*$",
        0.80,
        None,
    ),
    // Korean
    (Script::Korean, PatternTag::ChapterWord, r"^제\s*\d+\s*[장편부]", 0.95, None),
    (Script::Korean, PatternTag::Letter, r"^[가나다라마바사아자차카타파하]\.\s*\S", 0.50, Some(10)),
    (
        Script::Korean,
        PatternTag::ScriptMarker,
        r"^(?:서론|결론|개요|요약|소개|참고문헌|목차|부록)\s*$",
        0.80,
        None,
    ),
    // Devanagari
    (Script::Devanagari, PatternTag::ChapterWord, r"^अध्याय\s*\d+", 0.95, None),
    (
        Script::Devanagari,
        PatternTag::ScriptMarker,
        r"^(?:परिचय|प्रस्तावना|भूमिका|निष्कर्ष|सारांश|संदर्भ|अनुक्रमणिका)\s*$",
        0.80,
        None,
    ),
    // Any cased script: short line without lowercase letters
    (
        Script::Universal,
        PatternTag::AllCaps,
        r"^[^\p{Ll}]*\p{Lu}[^\p{Ll}]*\p{Lu}[^\p{Ll}]*$",
        0.50,
        Some(6),
    ),
];

static BUILTIN_LIBRARY: Lazy<PatternLibrary> = Lazy::new(PatternLibrary::new);

/// Registry of structural patterns.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<StructuralPattern>,
}

impl PatternLibrary {
    /// Library with the built-in entries for all supported scripts.
    pub fn new() -> Self {
        let patterns = BUILTIN
            .iter()
            .map(|&(script, tag, pattern, strength, max_words)| StructuralPattern {
                script,
                tag,
                strength,
                max_words,
                regex: Regex::new(pattern).unwrap(),
            })
            .collect();
        Self { patterns }
    }

    /// Shared instance of the built-in library.
    pub fn builtin() -> &'static PatternLibrary {
        &BUILTIN_LIBRARY
    }

    /// Library without any entries.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Add an entry.
    pub fn register(&mut self, pattern: StructuralPattern) {
        self.patterns.push(pattern);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the library has no entries.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Scripts covered by at least one entry.
    pub fn scripts(&self) -> Vec<Script> {
        let mut scripts: Vec<Script> = Vec::new();
        for p in &self.patterns {
            if !scripts.contains(&p.script) {
                scripts.push(p.script);
            }
        }
        scripts
    }

    /// Strongest match for a text; earlier entries win ties.
    ///
    /// The text is NFKC-normalized first.
    pub fn best_match(&self, text: &str) -> Option<PatternMatch> {
        self.best_match_normalized(&normalize(text))
    }

    /// Like [`best_match`](Self::best_match) for already normalized text.
    pub fn best_match_normalized(&self, text: &str) -> Option<PatternMatch> {
        let mut best: Option<PatternMatch> = None;
        for pattern in &self.patterns {
            if best.as_ref().is_some_and(|b| b.strength >= pattern.strength) {
                continue;
            }
            if let Some(caps) = pattern.matches(text) {
                best = Some(PatternMatch {
                    tag: pattern.tag,
                    strength: pattern.strength,
                    script: pattern.script,
                    body: caps.name("body").map(|m| m.as_str().to_string()),
                });
            }
        }
        best
    }

    /// Whether the text opens a numbered or chapter-style outline item.
    pub fn opens_outline_item(&self, text: &str) -> bool {
        let normalized = normalize(text);
        self.patterns
            .iter()
            .filter(|p| p.tag.is_outline_marker())
            .any(|p| p.matches(&normalized).is_some())
    }

    /// Whether the text is an outline item that already carries a title,
    /// as in "1.1 Background" or "Chapter 3 Results" but not "Chapter 3".
    pub fn holds_outline_title(&self, text: &str) -> bool {
        let normalized = normalize(text);
        self.patterns
            .iter()
            .filter(|p| p.tag.is_outline_marker())
            .filter_map(|p| p.matches(&normalized))
            .any(|caps| match (caps.name("body"), caps.get(0)) {
                (Some(body), _) => !body.as_str().trim().is_empty(),
                (None, Some(whole)) => !normalized[whole.end()..].trim().is_empty(),
                (None, None) => false,
            })
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_of(text: &str) -> Option<PatternTag> {
        PatternLibrary::new().best_match(text).map(|m| m.tag)
    }

    #[test]
    fn test_numeric_depths() {
        let lib = PatternLibrary::new();
        let m = lib.best_match("1. Introduction").unwrap();
        assert_eq!(m.tag, PatternTag::Numeric1);
        assert_eq!(m.heading_text("1. Introduction"), "Introduction");

        let m = lib.best_match("1.1 Background").unwrap();
        assert_eq!(m.tag, PatternTag::Numeric11);
        assert_eq!(m.body.as_deref(), Some("Background"));

        let m = lib.best_match("1.1.1 Prior Work").unwrap();
        assert_eq!(m.tag, PatternTag::Numeric111);
        assert_eq!(m.body.as_deref(), Some("Prior Work"));

        assert_eq!(tag_of("2.3.4.5 Deep Item"), Some(PatternTag::Numeric111));
    }

    #[test]
    fn test_numeric_requires_text_after_number() {
        assert_eq!(tag_of("2023. 5 mg daily"), None);
        assert_eq!(tag_of("1."), None);
    }

    #[test]
    fn test_numeric_requires_title_case_text() {
        let lib = PatternLibrary::new();
        assert_eq!(tag_of("2.5 km from the beach and the main station"), None);
        assert_eq!(tag_of("3) and then turn left"), None);
        assert!(!lib.opens_outline_item("2.5 km from the beach"));
        assert!(lib.opens_outline_item("2.5 Getting Around"));
        assert_eq!(tag_of("1.2 概要"), Some(PatternTag::Numeric11));
    }

    #[test]
    fn test_fullwidth_numbering() {
        let m = PatternLibrary::new().best_match("１．２　概要").unwrap();
        assert_eq!(m.tag, PatternTag::Numeric11);
        assert_eq!(m.body.as_deref(), Some("概要"));
    }

    #[test]
    fn test_keywords_and_markers() {
        assert_eq!(tag_of("Abstract"), Some(PatternTag::Keyword));
        assert_eq!(tag_of("Conclusions:"), Some(PatternTag::Keyword));
        assert_eq!(tag_of("Chapter 3 Results"), Some(PatternTag::ChapterWord));
        assert_eq!(tag_of("Appendix B: Data"), Some(PatternTag::AlphaMarker));
        assert_eq!(tag_of("IV. Results"), Some(PatternTag::Roman));
        assert_eq!(tag_of("B. Methods"), Some(PatternTag::Letter));
    }

    #[test]
    fn test_keyword_beats_all_caps() {
        assert_eq!(tag_of("METHODOLOGY"), Some(PatternTag::Keyword));
        assert_eq!(tag_of("PROJECT PLAN"), Some(PatternTag::AllCaps));
    }

    #[test]
    fn test_all_caps_word_limit() {
        assert_eq!(tag_of("THIS LINE HAS FAR TOO MANY WORDS TO COUNT"), None);
        assert_eq!(tag_of("A"), None);
        assert_eq!(tag_of("Mixed Case Line"), None);
    }

    #[test]
    fn test_script_markers() {
        assert_eq!(tag_of("第3章 研究方法"), Some(PatternTag::ChapterWord));
        assert_eq!(tag_of("はじめに"), Some(PatternTag::ScriptMarker));
        assert_eq!(tag_of("제2장 결과"), Some(PatternTag::ChapterWord));
        assert_eq!(tag_of("가. 개요"), Some(PatternTag::Letter));
        assert_eq!(tag_of("अध्याय 4"), Some(PatternTag::ChapterWord));
        assert_eq!(tag_of("परिचय"), Some(PatternTag::ScriptMarker));
        assert_eq!(tag_of("一、概述"), Some(PatternTag::AlphaMarker));
    }

    #[test]
    fn test_opens_outline_item() {
        let lib = PatternLibrary::new();
        assert!(lib.opens_outline_item("3. Results"));
        assert!(lib.opens_outline_item("Chapter 2"));
        assert!(!lib.opens_outline_item("Abstract"));
        assert!(!lib.opens_outline_item("continued text"));
    }

    #[test]
    fn test_holds_outline_title() {
        let lib = PatternLibrary::new();
        assert!(lib.holds_outline_title("1.1 Background"));
        assert!(lib.holds_outline_title("Chapter 3 Results"));
        assert!(lib.holds_outline_title("第3章 研究方法"));
        assert!(!lib.holds_outline_title("Chapter 3"));
        assert!(!lib.holds_outline_title("Background"));
    }

    #[test]
    fn test_register_custom_pattern() {
        let mut lib = PatternLibrary::empty();
        assert!(lib.is_empty());
        let entry = StructuralPattern::new(Script::Latin, PatternTag::Keyword, r"^Itinerary$", 0.8).unwrap();
        lib.register(entry);
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.best_match("Itinerary").map(|m| m.tag), Some(PatternTag::Keyword));
        assert!(StructuralPattern::new(Script::Latin, PatternTag::Keyword, r"(", 0.8).is_err());
    }

    #[test]
    fn test_builtin_covers_all_scripts() {
        let scripts = PatternLibrary::builtin().scripts();
        assert_eq!(scripts.len(), 6);
    }
}

//! Text utilities shared by the structural engine and the ranker.
//!
//! Normalization is NFKC-based so full-width digits and punctuation used in
//! CJK documents behave like their ASCII forms.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Sentence terminators, including the CJK full-width forms.
const TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

static BARE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+(?:\.\d+)*|[IVXLCDM]+|[A-Za-z])\.$").unwrap()
});

static OUTLINE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:chapter|part|section|appendix|annex)\s+(?:\d+(?:\.\d+)*|[ivxlcdm]+|[a-z])\.$").unwrap()
});

static INTERIOR_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Ll}[.!?]\s+\p{Lu}").unwrap());

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc", "few", "for",
    "from", "further", "get", "had", "has", "have", "having", "he", "her", "here", "hers", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "may", "me", "might",
    "more", "most", "must", "my", "need", "no", "nor", "not", "now", "of", "off", "on", "once",
    "one", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "shall", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "upon", "us", "using", "very", "via", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "would", "you", "your", "yours",
];

/// NFKC-normalize, collapse whitespace and trim.
pub fn normalize(text: &str) -> String {
    let nfkc: String = text.nfkc().collect();
    collapse_whitespace(&nfkc)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    MULTI_SPACE.replace_all(text.trim(), " ").into_owned()
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions A-F
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Join two text fragments with a single space, except between two
/// spaceless-script characters.
pub fn join_fragments(left: &str, right: &str) -> String {
    let left = left.trim_end();
    let right = right.trim_start();
    if left.is_empty() {
        return right.to_string();
    }
    if right.is_empty() {
        return left.to_string();
    }

    let spaceless = left.chars().last().is_some_and(is_spaceless_script_char)
        && right.chars().next().is_some_and(is_spaceless_script_char);

    let mut joined = String::with_capacity(left.len() + right.len() + 1);
    joined.push_str(left);
    if !spaceless {
        joined.push(' ');
    }
    joined.push_str(right);
    joined
}

/// Whether the text already ends a sentence.
///
/// A trailing terminator does not count when the whole text is a bare
/// outline marker ("1.", "IV.") or a marker label ("Chapter IV.").
pub fn ends_sentence(text: &str) -> bool {
    let trimmed = text.trim();
    let Some(last) = trimmed.chars().last() else {
        return false;
    };
    if !TERMINATORS.contains(&last) {
        return false;
    }
    !BARE_MARKER.is_match(trimmed) && !OUTLINE_LABEL.is_match(trimmed)
}

/// Whether the text contains a sentence boundary followed by more text.
pub fn contains_sentence_break(text: &str) -> bool {
    INTERIOR_BREAK.is_match(text)
}

/// Split text into trimmed sentences.
///
/// Western terminators split only when followed by whitespace or the end of
/// the text; CJK terminators always split. A leading outline marker such as
/// "1." is kept with the sentence it numbers.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);
        if !TERMINATORS.contains(&c) {
            continue;
        }
        let next = chars.get(i + 1);
        let cjk = matches!(c, '。' | '！' | '？');
        let at_boundary = cjk || next.map_or(true, |n| n.is_whitespace());
        if !at_boundary {
            continue;
        }
        // Keep "1." / "A." with the text that follows.
        if BARE_MARKER.is_match(current.trim()) {
            continue;
        }
        let sentence = collapse_whitespace(&current);
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        current.clear();
    }

    let tail = collapse_whitespace(&current);
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Check whether a lowercase token is an English stop-word.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Truncate to at most `budget` characters, preferring a sentence boundary.
///
/// The cut falls at the last sentence end inside the budget when that keeps
/// at least half of it; otherwise at the last word boundary.
pub fn truncate_at_sentence(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let head: String = text.chars().take(budget).collect();
    let head_chars: Vec<char> = head.chars().collect();

    let sentence_end = head_chars.iter().enumerate().rev().find(|&(i, c)| {
        TERMINATORS.contains(c) && head_chars.get(i + 1).map_or(true, |n| n.is_whitespace())
    });
    if let Some((idx, _)) = sentence_end {
        if idx + 1 >= budget / 2 {
            return head_chars[..=idx].iter().collect();
        }
    }

    match head.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => head[..pos].trim_end().to_string(),
        _ => head,
    }
}

//! Relevance signals shared by section and sentence scoring.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{split_sentences, tokenize};

use super::persona::ContentType;

/// Share of instruction-like sentences that makes a text procedural.
const PROCEDURAL_SHARE: f32 = 0.3;

/// Verbs that open instructions.
const IMPERATIVE_VERBS: &[&str] = &[
    "add", "arrive", "avoid", "book", "bring", "buy", "check", "choose", "click", "combine",
    "consider", "cook", "create", "download", "enjoy", "ensure", "enter", "explore", "fill",
    "follow", "go", "head", "install", "make", "mix", "open", "pack", "place", "plan", "preheat",
    "prepare", "print", "remove", "rent", "reserve", "save", "select", "serve", "set", "sign",
    "start", "stir", "take", "try", "use", "visit",
];

/// Words that mark a sentence as a key point.
const KEY_INDICATORS: &[&str] = &[
    "conclusion", "critical", "essential", "important", "key", "main", "must", "primary",
    "recommended", "significant", "summary",
];

/// Sentences shorter or longer than this are never key points.
const KEY_POINT_CHARS: std::ops::RangeInclusive<usize> = 21..=199;

static STEP_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\d{1,2}[.)]\s|step\s+\d+|[-•*▪●◦]\s)").unwrap()
});

/// Cosine similarity clamped to `0..=1`.
///
/// Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Fraction of salient terms found in the text (case-insensitive substring).
pub fn keyword_overlap(terms: &[String], text: &str) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();
    let matched = terms.iter().filter(|t| lower.contains(t.as_str())).count();
    matched as f32 / terms.len() as f32
}

/// Whether a sentence reads as an instruction or a numbered step.
pub fn is_instruction(sentence: &str) -> bool {
    let trimmed = sentence.trim_start();
    if STEP_MARKER.is_match(trimmed) {
        return true;
    }
    tokenize(trimmed)
        .first()
        .is_some_and(|first| IMPERATIVE_VERBS.binary_search(&first.as_str()).is_ok())
}

/// Content type of a section or sentence.
pub fn classify_content(text: &str) -> ContentType {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return ContentType::Descriptive;
    }
    let instructions = sentences.iter().filter(|s| is_instruction(s)).count();
    if instructions as f32 / sentences.len() as f32 >= PROCEDURAL_SHARE {
        ContentType::Procedural
    } else {
        ContentType::Descriptive
    }
}

/// Up to `max` sentences that carry a key indicator word, in text order.
pub fn key_points(text: &str, max: usize) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| KEY_POINT_CHARS.contains(&s.chars().count()))
        .filter(|s| {
            tokenize(s)
                .iter()
                .any(|t| KEY_INDICATORS.binary_search(&t.as_str()).is_ok())
        })
        .take(max)
        .collect()
}

/// 1 when the content type matches the task's, else 0.
pub fn content_type_bonus(task: ContentType, text: ContentType) -> f32 {
    if task == text {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imperative_verbs_sorted() {
        let mut sorted = IMPERATIVE_VERBS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, IMPERATIVE_VERBS.to_vec());
    }

    #[test]
    fn test_key_indicators_sorted() {
        let mut sorted = KEY_INDICATORS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEY_INDICATORS.to_vec());
    }

    #[test]
    fn test_key_points() {
        let text = "Book early. The main square is the key meeting point for groups. \
                    Buses run hourly through the valley. \
                    It is important to carry cash in the hill villages. \
                    A monkey sanctuary sits above the town.";
        assert_eq!(
            key_points(text, 3),
            vec![
                "The main square is the key meeting point for groups.",
                "It is important to carry cash in the hill villages.",
            ]
        );
        assert_eq!(key_points(text, 1).len(), 1);
        assert!(key_points("Key.", 3).is_empty());
        assert!(key_points("", 3).is_empty());
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_keyword_overlap() {
        let terms: Vec<String> = ["hotel", "trip", "visa"].iter().map(|s| s.to_string()).collect();
        let score = keyword_overlap(&terms, "Hotels for your Trip");
        assert!((score - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(keyword_overlap(&[], "anything"), 0.0);
    }

    #[test]
    fn test_is_instruction() {
        assert!(is_instruction("Book the hostel early."));
        assert!(is_instruction("1. Preheat the oven"));
        assert!(is_instruction("Step 3 Stir well"));
        assert!(is_instruction("• Pack light"));
        assert!(!is_instruction("The city was founded in 1200."));
    }

    #[test]
    fn test_classify_content() {
        let recipe = "Preheat the oven. Mix the flour and sugar. The cake is a local favorite.";
        assert_eq!(classify_content(recipe), ContentType::Procedural);

        let history = "The town grew around its harbor. Trade flourished for centuries. Visit the museum.";
        assert_eq!(classify_content(history), ContentType::Procedural);

        let prose = "The town grew around its harbor. Trade flourished for centuries. Its walls still stand. Many festivals remain.";
        assert_eq!(classify_content(prose), ContentType::Descriptive);
        assert_eq!(classify_content(""), ContentType::Descriptive);
    }

    #[test]
    fn test_content_type_bonus() {
        assert_eq!(content_type_bonus(ContentType::Procedural, ContentType::Procedural), 1.0);
        assert_eq!(content_type_bonus(ContentType::Procedural, ContentType::Descriptive), 0.0);
    }
}

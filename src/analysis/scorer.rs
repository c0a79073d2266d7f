//! Heading candidate scorer.
//!
//! Each signal is an independent function returning a value in `0..=1`;
//! [`HeadingScorer::score`] combines them with the configured weights:
//!
//! ```text
//! confidence = w_t * typography + w_p * pattern + w_pos * position + w_l * (1 - length_penalty)
//! ```
//!
//! A candidate is accepted when the confidence reaches the threshold, or when
//! a strong explicit pattern (e.g. "1.1 Background") carries it on its own.

use serde::Serialize;

use crate::model::MergedHeadingCandidate;
use crate::text::{ends_sentence, normalize};

use super::font_profile::FontProfile;
use super::options::ScoringOptions;
use super::patterns::{PatternLibrary, PatternMatch};

/// Characters at which the length penalty saturates.
const LENGTH_PENALTY_SATURATION: usize = 200;

/// The individual signal values of one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SignalScores {
    pub typography: f32,
    pub pattern: f32,
    pub position: f32,
    pub length_penalty: f32,
}

/// A candidate with its signals and decision.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    /// The candidate, with `pattern_tag` filled in
    pub candidate: MergedHeadingCandidate,
    /// Normalized text, numbering prefix removed for numbered patterns
    pub heading_text: String,
    /// Size rank of the candidate's font
    pub size_rank: usize,
    /// Signal values
    pub signals: SignalScores,
    /// Weighted confidence in 0..=1
    pub confidence: f32,
    /// Accepted as a heading
    pub accepted: bool,
}

impl ScoredCandidate {
    /// Outline depth implied by explicit numbering, if any.
    pub fn explicit_depth(&self) -> Option<u8> {
        self.candidate.pattern_tag.and_then(|t| t.explicit_depth())
    }
}

/// Typography signal: relative size, boldness and font change.
pub fn typography_score(cand: &MergedHeadingCandidate, profile: &FontProfile, tolerance: f32) -> f32 {
    let size = if profile.is_body_size(cand.font_size, tolerance) {
        0.0
    } else {
        let rank = profile.rank_of(cand.font_size);
        let rank_score = if profile.body_rank == 0 {
            0.0
        } else {
            (profile.body_rank as f32 - rank as f32) / profile.body_rank as f32
        };
        let ratio_score = cand.font_size / profile.body_size.max(f32::EPSILON) - 1.0;
        0.5 * rank_score.clamp(0.0, 1.0) + 0.5 * ratio_score.clamp(0.0, 1.0)
    };

    let bold = if cand.is_bold { 1.0 } else { 0.0 };
    let font_differs = if !profile.body_font.is_empty()
        && !cand.font_family.eq_ignore_ascii_case(&profile.body_font)
    {
        1.0
    } else {
        0.0
    };

    0.5 * size + 0.3 * bold + 0.2 * font_differs
}

/// Pattern signal: strength of the best match, halved for sentence-like text.
pub fn pattern_score(normalized: &str, best: Option<&PatternMatch>) -> f32 {
    match best {
        Some(m) if ends_sentence(normalized) => m.strength * 0.5,
        Some(m) => m.strength,
        None => 0.0,
    }
}

/// Length penalty: 0 up to `short_chars`, rising linearly to 1 at 200 characters.
pub fn length_penalty(chars: usize, short_chars: usize) -> f32 {
    if chars <= short_chars {
        return 0.0;
    }
    let span = LENGTH_PENALTY_SATURATION.saturating_sub(short_chars).max(1);
    ((chars - short_chars) as f32 / span as f32).min(1.0)
}

/// Scores candidates of one document.
#[derive(Debug, Clone)]
pub struct HeadingScorer<'a> {
    profile: &'a FontProfile,
    patterns: &'a PatternLibrary,
    options: &'a ScoringOptions,
    size_tolerance: f32,
}

impl<'a> HeadingScorer<'a> {
    /// Create a scorer.
    pub fn new(
        profile: &'a FontProfile,
        patterns: &'a PatternLibrary,
        options: &'a ScoringOptions,
        size_tolerance: f32,
    ) -> Self {
        Self {
            profile,
            patterns,
            options,
            size_tolerance,
        }
    }

    /// Score one candidate.
    pub fn score(&self, mut candidate: MergedHeadingCandidate) -> ScoredCandidate {
        let normalized = normalize(&candidate.text);
        let best = self.patterns.best_match_normalized(&normalized);
        let chars = normalized.chars().count();

        let signals = SignalScores {
            typography: typography_score(&candidate, self.profile, self.size_tolerance),
            pattern: pattern_score(&normalized, best.as_ref()),
            position: candidate.position_score.clamp(0.0, 1.0),
            length_penalty: length_penalty(chars, self.options.short_heading_chars),
        };

        let w = &self.options.weights;
        let confidence = (w.typography * signals.typography
            + w.pattern * signals.pattern
            + w.position * signals.position
            + w.length * (1.0 - signals.length_penalty))
            .clamp(0.0, 1.0);

        let eligible = !candidate.oversized && chars >= self.options.min_heading_chars;
        let strong_pattern = signals.pattern >= self.options.strong_pattern_threshold
            && signals.length_penalty < 0.5;
        let accepted = eligible && (confidence >= self.options.accept_threshold || strong_pattern);

        let heading_text = match &best {
            Some(m) => m.heading_text(&normalized),
            None => normalized,
        };
        candidate.pattern_tag = best.map(|m| m.tag);

        ScoredCandidate {
            size_rank: self.profile.rank_of(candidate.font_size),
            candidate,
            heading_text,
            signals,
            confidence,
            accepted,
        }
    }

    /// Score every candidate, keeping order.
    pub fn score_all(&self, candidates: Vec<MergedHeadingCandidate>) -> Vec<ScoredCandidate> {
        let scored: Vec<ScoredCandidate> = candidates.into_iter().map(|c| self.score(c)).collect();
        let accepted = scored.iter().filter(|s| s.accepted).count();
        log::debug!("Accepted {} of {} heading candidates", accepted, scored.len());
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::patterns::Script;
    use crate::model::{BBox, PatternTag, TextRun};

    fn profile() -> FontProfile {
        let runs = vec![
            TextRun::new("Big Title", "Helvetica-Bold", 24.0, BBox::default(), 1, 0),
            TextRun::new("Section", "Helvetica-Bold", 16.0, BBox::default(), 1, 1),
            TextRun::new(
                "plenty of body text to make twelve points the body size",
                "Helvetica",
                12.0,
                BBox::default(),
                1,
                2,
            ),
        ];
        FontProfile::build(&runs, 0.5, 6)
    }

    fn cand(text: &str, font: &str, size: f32, position: f32) -> MergedHeadingCandidate {
        let run = TextRun::new(text, font, size, BBox::new(72.0, 100.0, 300.0, 100.0 + size), 1, 0);
        let mut c = MergedHeadingCandidate::from_run(&run);
        c.position_score = position;
        c
    }

    #[test]
    fn test_typography_score() {
        let p = profile();
        let title = cand("Big Title", "Helvetica-Bold", 24.0, 0.0);
        assert!((typography_score(&title, &p, 0.5) - 1.0).abs() < 1e-6);

        let body = cand("body", "Helvetica", 12.0, 0.0);
        assert_eq!(typography_score(&body, &p, 0.5), 0.0);

        let section = cand("Section", "Helvetica-Bold", 16.0, 0.0);
        let t = typography_score(&section, &p, 0.5);
        assert!(t > 0.5 && t < 1.0);
    }

    #[test]
    fn test_pattern_score_halved_for_sentences() {
        let m = PatternMatch {
            tag: PatternTag::Numeric1,
            strength: 0.8,
            script: Script::Latin,
            body: None,
        };
        assert!((pattern_score("1. Pack light", Some(&m)) - 0.8).abs() < 1e-6);
        assert!((pattern_score("1. Pack light.", Some(&m)) - 0.4).abs() < 1e-6);
        assert_eq!(pattern_score("anything", None), 0.0);
    }

    #[test]
    fn test_length_penalty() {
        assert_eq!(length_penalty(40, 80), 0.0);
        assert_eq!(length_penalty(80, 80), 0.0);
        assert!((length_penalty(140, 80) - 0.5).abs() < 1e-6);
        assert_eq!(length_penalty(500, 80), 1.0);
    }

    #[test]
    fn test_accepts_prominent_heading() {
        let p = profile();
        let lib = PatternLibrary::new();
        let opts = ScoringOptions::default();
        let scorer = HeadingScorer::new(&p, &lib, &opts, 0.5);

        let scored = scorer.score(cand("Section", "Helvetica-Bold", 16.0, 0.8));
        assert!(scored.accepted);
        assert_eq!(scored.size_rank, 1);
    }

    #[test]
    fn test_rejects_body_text() {
        let p = profile();
        let lib = PatternLibrary::new();
        let opts = ScoringOptions::default();
        let scorer = HeadingScorer::new(&p, &lib, &opts, 0.5);

        let scored = scorer.score(cand("The results were consistent across runs.", "Helvetica", 12.0, 1.0));
        assert!(!scored.accepted);
        assert!(scored.confidence < 0.45);
    }

    #[test]
    fn test_strong_pattern_overrides_flat_typography() {
        let p = profile();
        let lib = PatternLibrary::new();
        let opts = ScoringOptions::default();
        let scorer = HeadingScorer::new(&p, &lib, &opts, 0.5);

        let scored = scorer.score(cand("1.1 Background", "Helvetica", 12.0, 0.0));
        assert!(scored.accepted);
        assert_eq!(scored.heading_text, "Background");
        assert_eq!(scored.explicit_depth(), Some(2));
        assert_eq!(scored.candidate.pattern_tag, Some(PatternTag::Numeric11));
    }

    #[test]
    fn test_never_accepts_short_or_oversized() {
        let p = profile();
        let lib = PatternLibrary::new();
        let opts = ScoringOptions::default();
        let scorer = HeadingScorer::new(&p, &lib, &opts, 0.5);

        assert!(!scorer.score(cand("IV", "Helvetica-Bold", 24.0, 1.0)).accepted);

        let mut big = cand("Overview", "Helvetica-Bold", 24.0, 1.0);
        big.oversized = true;
        assert!(!scorer.score(big).accepted);
    }
}

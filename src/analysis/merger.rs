//! Run merger.
//!
//! Consecutive runs that are fragments of one logical line or heading are
//! merged into a single [`MergedHeadingCandidate`]. Every comparison is made
//! against the accumulated candidate, not the previous run, so feeding the
//! merged candidates back in as atomic runs reproduces the same list.

use std::collections::BTreeMap;

use crate::model::{MergedHeadingCandidate, TextRun};
use crate::text::{contains_sentence_break, ends_sentence, join_fragments};

use super::options::MergeOptions;
use super::patterns::PatternLibrary;

/// Weight of the whitespace signal inside `position_score`.
const WHITESPACE_WEIGHT: f32 = 0.6;
/// Weight of the placement signal inside `position_score`.
const PLACEMENT_WEIGHT: f32 = 0.4;
/// A gap counts as whitespace margin above this multiple of the median gap.
const SPACED_GAP_FACTOR: f32 = 1.5;

/// Merges raw text runs into heading candidates.
#[derive(Debug, Clone)]
pub struct RunMerger<'a> {
    options: &'a MergeOptions,
    patterns: &'a PatternLibrary,
}

impl<'a> RunMerger<'a> {
    /// Create a merger.
    pub fn new(options: &'a MergeOptions, patterns: &'a PatternLibrary) -> Self {
        Self { options, patterns }
    }

    /// Merge runs (sorted by page and reading order) into candidates and
    /// fill in their position scores.
    pub fn merge(&self, runs: &[TextRun]) -> Vec<MergedHeadingCandidate> {
        let mut candidates: Vec<MergedHeadingCandidate> = Vec::new();

        for run in runs.iter().filter(|r| !r.text.trim().is_empty()) {
            match candidates.last_mut() {
                Some(acc) if self.can_merge(acc, run) => self.absorb(acc, run),
                _ => {
                    let mut cand = MergedHeadingCandidate::from_run(run);
                    cand.oversized = cand.char_count() > self.options.max_heading_chars;
                    candidates.push(cand);
                }
            }
        }

        assign_position_scores(&mut candidates);

        log::debug!(
            "Merged {} runs into {} candidates",
            runs.len(),
            candidates.len()
        );
        candidates
    }

    /// Re-run the merger over already merged candidates.
    pub fn remerge(&self, candidates: &[MergedHeadingCandidate]) -> Vec<MergedHeadingCandidate> {
        let runs: Vec<TextRun> = candidates.iter().map(|c| c.as_run()).collect();
        self.merge(&runs)
    }

    /// Whether `next` continues the accumulated candidate.
    pub fn can_merge(&self, acc: &MergedHeadingCandidate, next: &TextRun) -> bool {
        if acc.page != next.page {
            return false;
        }

        // Same typographic class
        if !acc.font_family.eq_ignore_ascii_case(&next.font_family)
            || (acc.font_size - next.font_size).abs() >= self.options.size_tolerance
            || acc.is_bold != next.is_bold
        {
            return false;
        }

        // Same line or the next line of the same block
        let min_size = acc.font_size.min(next.font_size);
        let gap = acc.bbox.vertical_gap_to(&next.bbox);
        let max_overlap = acc.bbox.height().max(min_size);
        if gap < -max_overlap || gap >= self.options.gap_factor * min_size {
            return false;
        }

        // A numbered heading that already has its title ends with its line
        let starts_new_line = gap > -0.5 * min_size;
        if starts_new_line && self.patterns.holds_outline_title(&acc.text) {
            return false;
        }

        if ends_sentence(&acc.text)
            || ends_sentence(&next.text)
            || contains_sentence_break(&acc.text)
            || contains_sentence_break(&next.text)
        {
            return false;
        }

        // "2. Methods" directly below "1. Introduction" is a new item
        !self.patterns.opens_outline_item(&next.text)
    }

    fn absorb(&self, acc: &mut MergedHeadingCandidate, run: &TextRun) {
        acc.text = join_fragments(&acc.text, &run.text);
        acc.bbox = acc.bbox.union(&run.bbox);
        acc.last_order = acc.last_order.max(run.reading_order);
        acc.run_count += 1;
        if acc.char_count() > self.options.max_heading_chars {
            acc.oversized = true;
        }
    }
}

/// Page extent estimated from the candidates placed on it.
#[derive(Debug, Clone, Copy)]
struct PageExtent {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl PageExtent {
    fn of(candidates: &[&MergedHeadingCandidate]) -> Self {
        let mut extent = PageExtent {
            left: f32::MAX,
            right: f32::MIN,
            top: f32::MAX,
            bottom: f32::MIN,
        };
        for c in candidates {
            extent.left = extent.left.min(c.bbox.x0);
            extent.right = extent.right.max(c.bbox.x1);
            extent.top = extent.top.min(c.bbox.y0);
            extent.bottom = extent.bottom.max(c.bbox.y1);
        }
        extent
    }

    fn width(&self) -> f32 {
        (self.right - self.left).max(1.0)
    }

    fn height(&self) -> f32 {
        (self.bottom - self.top).max(1.0)
    }
}

/// Compute `position_score` for every candidate.
///
/// Whitespace margin is judged against the median positive gap between
/// consecutive candidates on the same page; the first and last candidate of
/// a page count as spaced on their open side.
pub fn assign_position_scores(candidates: &mut [MergedHeadingCandidate]) {
    let median_gap = median_gap(candidates);
    let threshold = median_gap * SPACED_GAP_FACTOR;

    let mut pages: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, c) in candidates.iter().enumerate() {
        pages.entry(c.page).or_default().push(i);
    }

    for indices in pages.values() {
        let extent = {
            let members: Vec<&MergedHeadingCandidate> =
                indices.iter().map(|&i| &candidates[i]).collect();
            PageExtent::of(&members)
        };

        let scores: Vec<f32> = indices
            .iter()
            .enumerate()
            .map(|(pos, &i)| {
                let cand = &candidates[i];
                let above = match pos.checked_sub(1) {
                    Some(prev) => candidates[indices[prev]].bbox.vertical_gap_to(&cand.bbox) > threshold,
                    None => true,
                };
                let below = match indices.get(pos + 1) {
                    Some(&next) => cand.bbox.vertical_gap_to(&candidates[next].bbox) > threshold,
                    None => true,
                };
                let whitespace = (above as u8 as f32 + below as u8 as f32) / 2.0;
                WHITESPACE_WEIGHT * whitespace + PLACEMENT_WEIGHT * placement_score(cand, &extent)
            })
            .collect();

        for (&i, score) in indices.iter().zip(scores) {
            candidates[i].position_score = score.clamp(0.0, 1.0);
        }
    }
}

fn median_gap(candidates: &[MergedHeadingCandidate]) -> f32 {
    let mut gaps: Vec<f32> = candidates
        .windows(2)
        .filter(|w| w[0].page == w[1].page)
        .map(|w| w[0].bbox.vertical_gap_to(&w[1].bbox))
        .filter(|g| *g > 0.0)
        .collect();
    if gaps.is_empty() {
        return 0.0;
    }
    gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    gaps[gaps.len() / 2]
}

fn placement_score(cand: &MergedHeadingCandidate, extent: &PageExtent) -> f32 {
    let left_flush = (cand.bbox.x0 - extent.left).abs() <= extent.width() * 0.02 + 1.0;
    let page_center = (extent.left + extent.right) / 2.0;
    let centered = (cand.bbox.center_x() - page_center).abs() <= extent.width() * 0.1
        && cand.bbox.x0 > extent.left + 1.0;
    let top_quarter = cand.bbox.y0 <= extent.top + extent.height() * 0.25;

    if cand.page == 1 && top_quarter && (centered || left_flush) {
        1.0
    } else if left_flush {
        0.5
    } else {
        0.0
    }
}

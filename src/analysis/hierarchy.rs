//! Hierarchy resolver: title selection and H1/H2/H3 level assignment.

use std::cmp::Ordering;

use crate::model::{ClassifiedHeading, DocumentOutline, HeadingLevel};

use super::font_profile::FontProfile;
use super::scorer::ScoredCandidate;

/// Turns scored candidates into a [`DocumentOutline`].
#[derive(Debug, Clone)]
pub struct HierarchyResolver<'a> {
    profile: &'a FontProfile,
    prefer_metadata_title: bool,
    min_title_chars: usize,
}

impl<'a> HierarchyResolver<'a> {
    /// Create a resolver.
    pub fn new(profile: &'a FontProfile) -> Self {
        Self {
            profile,
            prefer_metadata_title: false,
            min_title_chars: 3,
        }
    }

    /// Use a non-empty document information title instead of page text.
    pub fn prefer_metadata_title(mut self, prefer: bool) -> Self {
        self.prefer_metadata_title = prefer;
        self
    }

    /// Resolve the outline of one document.
    pub fn resolve(&self, scored: &[ScoredCandidate], metadata_title: Option<&str>) -> DocumentOutline {
        let metadata_title = metadata_title.map(str::trim).filter(|t| !t.is_empty());

        let (title, title_index) = match metadata_title {
            Some(t) if self.prefer_metadata_title => (t.to_string(), None),
            _ => match self.select_title(scored) {
                Some(i) => (scored[i].candidate.text.trim().to_string(), Some(i)),
                None => (String::new(), None),
            },
        };
        let title = crate::text::normalize(&title);

        let headings_src: Vec<&ScoredCandidate> = scored
            .iter()
            .enumerate()
            .filter(|(i, s)| s.accepted && Some(*i) != title_index)
            .map(|(_, s)| s)
            .collect();

        let mut ranks: Vec<usize> = headings_src.iter().map(|s| s.size_rank).collect();
        ranks.sort_unstable();
        ranks.dedup();

        let mut headings: Vec<ClassifiedHeading> = headings_src
            .iter()
            .map(|s| {
                let level = match s.explicit_depth() {
                    Some(depth) => HeadingLevel::from_depth(depth as usize),
                    None => {
                        let pos = ranks.binary_search(&s.size_rank).unwrap_or(ranks.len());
                        HeadingLevel::from_depth(pos + 1)
                    }
                };
                ClassifiedHeading {
                    text: s.heading_text.clone(),
                    level,
                    page: s.candidate.page,
                    confidence: s.confidence,
                    first_order: s.candidate.first_order,
                    last_order: s.candidate.last_order,
                }
            })
            .collect();

        headings.sort_by_key(|h| (h.page, h.first_order));
        headings.dedup_by(|b, a| a.level == b.level && a.page == b.page && a.text == b.text);

        if headings.is_empty() {
            log::debug!("No candidate passed the acceptance threshold");
        }

        let title_span = title_index.map(|i| {
            let c = &scored[i].candidate;
            (c.page, c.first_order, c.last_order)
        });

        DocumentOutline {
            title,
            headings,
            title_span,
        }
    }

    /// Index of the title candidate.
    ///
    /// Accepted page-1 candidates without explicit numbering compete on size
    /// rank, then on vertical position. Without one, the largest page-1
    /// candidate is used when it is set larger than body text.
    fn select_title(&self, scored: &[ScoredCandidate]) -> Option<usize> {
        let by_rank_then_top = |a: &(usize, &ScoredCandidate), b: &(usize, &ScoredCandidate)| {
            a.1.size_rank
                .cmp(&b.1.size_rank)
                .then(a.1.candidate.bbox.y0.partial_cmp(&b.1.candidate.bbox.y0).unwrap_or(Ordering::Equal))
                .then(a.0.cmp(&b.0))
        };

        let accepted = scored
            .iter()
            .enumerate()
            .filter(|(_, s)| s.candidate.page == 1 && s.accepted && s.explicit_depth().is_none())
            .min_by(by_rank_then_top);
        if let Some((i, _)) = accepted {
            return Some(i);
        }

        let (i, largest) = scored
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.candidate.page == 1
                    && !s.candidate.oversized
                    && s.candidate.char_count() >= self.min_title_chars
            })
            .min_by(|a, b| {
                b.1.candidate
                    .font_size
                    .partial_cmp(&a.1.candidate.font_size)
                    .unwrap_or(Ordering::Equal)
                    .then(by_rank_then_top(a, b))
            })?;

        (self.profile.rank_of(largest.candidate.font_size) < self.profile.body_rank).then_some(i)
    }
}

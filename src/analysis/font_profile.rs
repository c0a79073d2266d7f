//! Font statistics used as the normalization baseline for heading detection.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model::TextRun;

/// Body size assumed for documents without text.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Per-document font statistics.
#[derive(Debug, Clone, Serialize)]
pub struct FontProfile {
    /// Body text font size (size with the most characters)
    pub body_size: f32,
    /// Body text font family
    pub body_font: String,
    /// Size rank of the body text
    pub body_rank: usize,
    /// Character count per size (key = size in tenths of a point)
    pub size_histogram: BTreeMap<i32, usize>,
    /// Size rank per observed size (key = size in tenths of a point; 0 = largest)
    pub size_rank_table: BTreeMap<i32, usize>,
    /// Body size per page
    pub page_body_sizes: BTreeMap<u32, f32>,
    /// Smallest size belonging to each rank
    #[serde(skip)]
    rank_floors: Vec<f32>,
}

/// Round a font size to a histogram key (0.1 pt precision).
pub fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn key_size(key: i32) -> f32 {
    key as f32 / 10.0
}

/// Key with the most characters; ties go to the smaller size.
fn dominant_key(histogram: &BTreeMap<i32, usize>) -> Option<i32> {
    histogram
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(k, _)| *k)
}

impl FontProfile {
    /// Build the profile for one document.
    ///
    /// Sizes whose distance to the top of their group is within `tolerance`
    /// share a rank; ranks beyond `max_ranks` collapse into the last one.
    pub fn build(runs: &[TextRun], tolerance: f32, max_ranks: usize) -> Self {
        let mut size_histogram: BTreeMap<i32, usize> = BTreeMap::new();
        let mut font_chars: HashMap<&str, usize> = HashMap::new();
        let mut page_histograms: BTreeMap<u32, BTreeMap<i32, usize>> = BTreeMap::new();

        for run in runs {
            let chars = run.char_count();
            if chars == 0 || run.font_size <= 0.0 {
                continue;
            }
            let key = size_key(run.font_size);
            *size_histogram.entry(key).or_insert(0) += chars;
            *font_chars.entry(run.font_family.as_str()).or_insert(0) += chars;
            *page_histograms
                .entry(run.page)
                .or_default()
                .entry(key)
                .or_insert(0) += chars;
        }

        let body_size = dominant_key(&size_histogram)
            .map(key_size)
            .unwrap_or(DEFAULT_BODY_SIZE);

        let body_font = font_chars
            .iter()
            .max_by(|(fa, ca), (fb, cb)| ca.cmp(cb).then(fb.cmp(fa)))
            .map(|(f, _)| f.to_string())
            .unwrap_or_default();

        let page_body_sizes = page_histograms
            .iter()
            .filter_map(|(page, hist)| dominant_key(hist).map(|k| (*page, key_size(k))))
            .collect();

        // Distinct sizes, largest first, grouped into ranks
        let max_ranks = max_ranks.max(1);
        let mut size_rank_table = BTreeMap::new();
        let mut rank_floors: Vec<f32> = Vec::new();
        let mut group_top = f32::MAX;
        for &key in size_histogram.keys().rev() {
            let size = key_size(key);
            let starts_group = rank_floors.is_empty() || group_top - size > tolerance;
            if starts_group && rank_floors.len() < max_ranks {
                group_top = size;
                rank_floors.push(size);
            } else if let Some(floor) = rank_floors.last_mut() {
                *floor = size;
            }
            size_rank_table.insert(key, rank_floors.len() - 1);
        }

        let mut profile = Self {
            body_size,
            body_font,
            body_rank: 0,
            size_histogram,
            size_rank_table,
            page_body_sizes,
            rank_floors,
        };
        profile.body_rank = profile.rank_of(body_size);

        log::debug!(
            "Font profile: body {:.1}pt ({}), {} ranks, body rank {}",
            profile.body_size,
            profile.body_font,
            profile.rank_count(),
            profile.body_rank
        );
        profile
    }

    /// Size rank for a font size (0 = largest).
    ///
    /// Sizes not seen while building fall into the first rank whose floor
    /// they reach.
    pub fn rank_of(&self, size: f32) -> usize {
        if let Some(rank) = self.size_rank_table.get(&size_key(size)) {
            return *rank;
        }
        self.rank_floors
            .iter()
            .position(|floor| size >= *floor)
            .unwrap_or(self.rank_floors.len().saturating_sub(1))
    }

    /// Number of distinct ranks.
    pub fn rank_count(&self) -> usize {
        self.rank_floors.len()
    }

    /// Whether a size is indistinguishable from the body size.
    pub fn is_body_size(&self, size: f32, tolerance: f32) -> bool {
        (size - self.body_size).abs() <= tolerance
    }

    /// Body size on a page, falling back to the document body size.
    pub fn page_body_size(&self, page: u32) -> f32 {
        self.page_body_sizes
            .get(&page)
            .copied()
            .unwrap_or(self.body_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn run(text: &str, font: &str, size: f32, page: u32) -> TextRun {
        TextRun::new(text, font, size, BBox::default(), page, 0)
    }

    #[test]
    fn test_body_size_is_character_mode() {
        let runs = vec![
            run("A very long caption written in a tiny size", "Arial", 8.0, 1),
            run("Title", "Arial-Bold", 24.0, 1),
            run("Body text line one of many words", "Times", 11.0, 1),
            run("Body text line two of many words", "Times", 11.0, 1),
        ];
        let profile = FontProfile::build(&runs, 0.5, 6);
        assert!((profile.body_size - 11.0).abs() < f32::EPSILON);
        assert_eq!(profile.body_font, "Times");
        assert_eq!(profile.rank_of(24.0), 0);
        assert_eq!(profile.rank_of(11.0), 1);
        assert_eq!(profile.rank_of(8.0), 2);
        assert_eq!(profile.body_rank, 1);
    }

    #[test]
    fn test_sizes_within_tolerance_coalesce() {
        let runs = vec![
            run("Heading", "Arial", 16.0, 1),
            run("Heading", "Arial", 15.7, 1),
            run("Body body body body", "Arial", 12.0, 1),
        ];
        let profile = FontProfile::build(&runs, 0.5, 6);
        assert_eq!(profile.rank_of(16.0), profile.rank_of(15.7));
        assert_eq!(profile.rank_count(), 2);
    }

    #[test]
    fn test_rank_cap() {
        let runs: Vec<TextRun> = (0..10)
            .map(|i| run("text", "Arial", 30.0 - i as f32 * 2.0, 1))
            .collect();
        let profile = FontProfile::build(&runs, 0.5, 3);
        assert_eq!(profile.rank_count(), 3);
        assert_eq!(profile.rank_of(12.0), 2);
        assert_eq!(profile.rank_of(30.0), 0);
    }

    #[test]
    fn test_empty_profile() {
        let profile = FontProfile::build(&[], 0.5, 6);
        assert!((profile.body_size - DEFAULT_BODY_SIZE).abs() < f32::EPSILON);
        assert!(profile.size_rank_table.is_empty());
        assert_eq!(profile.rank_of(18.0), 0);
    }

    #[test]
    fn test_page_body_size() {
        let runs = vec![
            run("page one body text", "Arial", 12.0, 1),
            run("page two is set smaller", "Arial", 9.0, 2),
        ];
        let profile = FontProfile::build(&runs, 0.5, 6);
        assert!((profile.page_body_size(2) - 9.0).abs() < f32::EPSILON);
        assert!((profile.page_body_size(7) - profile.body_size).abs() < f32::EPSILON);
    }
}

//! Parsing options.

use std::ops::RangeInclusive;

/// Options controlling run extraction.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Extract pages in parallel
    pub parallel: bool,

    /// Pages to extract
    pub pages: PageSelection,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use lenient error handling (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Use strict error handling (fail on the first unreadable page).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Disable parallel page extraction.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}

/// Which pages to extract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSelection {
    #[default]
    All,
    /// Inclusive 1-based range
    Range(RangeInclusive<u32>),
    /// Explicit 1-based page numbers
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check whether a 1-based page number is selected.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a selection like `"1-3,5"`. Empty input selects all pages.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Some(PageSelection::All);
        }
        if let Some((start, end)) = input.split_once('-') {
            if !input.contains(',') {
                let start: u32 = start.trim().parse().ok()?;
                let end: u32 = end.trim().parse().ok()?;
                return (start >= 1 && start <= end).then(|| PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in input.split(',') {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start: u32 = start.trim().parse().ok()?;
                    let end: u32 = end.trim().parse().ok()?;
                    if start == 0 || start > end {
                        return None;
                    }
                    pages.extend(start..=end);
                }
                None => {
                    let page: u32 = part.trim().parse().ok()?;
                    if page == 0 {
                        return None;
                    }
                    pages.push(page);
                }
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Some(PageSelection::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .sequential()
            .with_pages(PageSelection::Range(1..=2));

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(!options.parallel);
        assert_eq!(options.pages, PageSelection::Range(1..=2));
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.parallel);
        assert_eq!(options.pages, PageSelection::All);
    }

    #[test]
    fn test_page_selection_includes() {
        assert!(PageSelection::All.includes(40));
        assert!(PageSelection::Range(2..=4).includes(3));
        assert!(!PageSelection::Range(2..=4).includes(5));
        assert!(PageSelection::Pages(vec![1, 7]).includes(7));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse(""), Some(PageSelection::All));
        assert_eq!(PageSelection::parse("2-5"), Some(PageSelection::Range(2..=5)));
        assert_eq!(
            PageSelection::parse("3,1-2,3"),
            Some(PageSelection::Pages(vec![1, 2, 3]))
        );
        assert_eq!(PageSelection::parse("0"), None);
        assert_eq!(PageSelection::parse("5-2"), None);
        assert_eq!(PageSelection::parse("x"), None);
    }
}

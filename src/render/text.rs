//! Plain text report of an analysis inspection.

use std::fmt::Write;

use crate::analysis::Inspection;

/// Render the font profile and per-candidate signals as a text table.
pub fn inspection_to_text(inspection: &Inspection) -> String {
    let mut out = String::new();
    let profile = &inspection.profile;

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "Body: {:.1}pt {} (rank {})",
        profile.body_size, profile.body_font, profile.body_rank
    );
    out.push_str("Sizes:");
    for (key, chars) in profile.size_histogram.iter().rev() {
        let rank = profile
            .size_rank_table
            .get(key)
            .map_or_else(|| "-".to_string(), |r| r.to_string());
        let _ = write!(out, " {:.1}pt×{} [r{}]", *key as f32 / 10.0, chars, rank);
    }
    out.push_str("\n\n");

    let _ = writeln!(
        out,
        "{:>4} {:>4} {:>5} {:>5} {:>5} {:>5} {:>5}  {:<3} text",
        "page", "rank", "typo", "patt", "pos", "len", "conf", "ok"
    );
    for c in &inspection.candidates {
        let _ = writeln!(
            out,
            "{:>4} {:>4} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2}  {:<3} {}",
            c.candidate.page,
            c.size_rank,
            c.signals.typography,
            c.signals.pattern,
            c.signals.position,
            c.signals.length_penalty,
            c.confidence,
            if c.accepted { "yes" } else { "" },
            preview(&c.heading_text, 60)
        );
    }

    out.push('\n');
    let _ = writeln!(out, "Title: {}", inspection.outline.title);
    for h in &inspection.outline.headings {
        let indent = "  ".repeat(h.level.depth() as usize - 1);
        let _ = writeln!(out, "{}{} {} (p{})", indent, h.level, h.text, h.page);
    }
    out
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

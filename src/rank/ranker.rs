//! Embedding ranker: orders sections of a collection against a persona.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::model::Section;
use crate::text::{join_fragments, split_sentences, truncate_at_sentence};

use super::embed::{embed_with_timeout, Embedder};
use super::options::RankOptions;
use super::persona::PersonaContext;
use super::signals::{classify_content, content_type_bonus, cosine_similarity, key_points, keyword_overlap};

/// Body characters scanned for key points.
const KEY_POINT_SCAN_CHARS: usize = 500;

/// Signal values behind one relevance score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RelevanceSignals {
    pub embedding: f32,
    pub keyword: f32,
    pub content_type: f32,
}

/// A section with its relevance before selection.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredSection {
    pub section: Section,
    pub signals: RelevanceSignals,
    pub relevance_score: f32,
    /// Dense 1-based position among all sections of the collection
    pub overall_rank: usize,
}

/// A selected section.
#[derive(Debug, Clone, Serialize)]
pub struct RankedSection {
    pub section: Section,
    pub relevance_score: f32,
    /// Dense 1-based position among the selected sections
    pub importance_rank: usize,
    /// Best sentences of the body, in document order
    pub refined_text: String,
    /// Sentences flagged by key indicator words
    pub key_points: Vec<String>,
}

/// Result of ranking one collection.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    /// Every section, best first
    pub scored: Vec<ScoredSection>,
    /// The top-K selection
    pub selected: Vec<RankedSection>,
    /// Whether embedding similarity contributed to the scores
    pub embeddings_used: bool,
}

/// Ranks sections by persona relevance.
#[derive(Clone)]
pub struct EmbeddingRanker {
    embedder: Arc<dyn Embedder>,
    options: RankOptions,
}

impl std::fmt::Debug for EmbeddingRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingRanker")
            .field("embedder", &self.embedder.name())
            .field("options", &self.options)
            .finish()
    }
}

impl EmbeddingRanker {
    /// Create a ranker.
    pub fn new(embedder: Arc<dyn Embedder>, options: RankOptions) -> Self {
        Self { embedder, options }
    }

    /// Rank options in use.
    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Score, order and select sections.
    pub fn rank(&self, context: &PersonaContext, sections: &[Section]) -> Ranking {
        let context_vector = self.context_embedding(context);
        let section_vectors = match &context_vector {
            Some(_) => self.section_embeddings(sections),
            None => HashMap::new(),
        };
        let embeddings_used = context_vector.is_some() && !section_vectors.is_empty();

        let mut scored: Vec<ScoredSection> = sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let embedding = match (&context_vector, section_vectors.get(&i)) {
                    (Some(ctx), Some(vec)) => cosine_similarity(ctx, vec),
                    _ => 0.0,
                };
                let text = section.full_text();
                let signals = RelevanceSignals {
                    embedding,
                    keyword: keyword_overlap(&context.salient_terms, &text),
                    content_type: content_type_bonus(context.content_type, classify_content(&text)),
                };
                ScoredSection {
                    section: section.clone(),
                    relevance_score: self.combine(&signals),
                    signals,
                    overall_rank: 0,
                }
            })
            .collect();

        scored.sort_by(|a, b| by_score_then_order(a.relevance_score, b.relevance_score, &a.section, &b.section));
        for (i, s) in scored.iter_mut().enumerate() {
            s.overall_rank = i + 1;
        }

        let picks = self.select(&scored);
        let selected: Vec<RankedSection> = picks
            .into_iter()
            .enumerate()
            .map(|(i, idx)| {
                let s = &scored[idx];
                RankedSection {
                    section: s.section.clone(),
                    relevance_score: s.relevance_score,
                    importance_rank: i + 1,
                    refined_text: self.refine(context, context_vector.as_deref(), &s.section),
                    key_points: key_points(
                        &truncate_at_sentence(&s.section.body_text, KEY_POINT_SCAN_CHARS),
                        self.options.key_points,
                    ),
                }
            })
            .collect();

        log::info!(
            "Ranked {} sections, selected {} (embeddings {})",
            scored.len(),
            selected.len(),
            if embeddings_used { "on" } else { "off" }
        );

        Ranking {
            scored,
            selected,
            embeddings_used,
        }
    }

    fn combine(&self, signals: &RelevanceSignals) -> f32 {
        let w = &self.options.weights;
        w.embedding * signals.embedding + w.keyword * signals.keyword + w.content_type * signals.content_type
    }

    fn context_embedding(&self, context: &PersonaContext) -> Option<Vec<f32>> {
        if !self.options.use_embeddings {
            return None;
        }
        match embed_with_timeout(
            self.embedder.clone(),
            vec![context.combined_query.clone()],
            self.options.embedding_timeout,
        ) {
            Ok(mut vectors) => vectors.pop(),
            Err(e) => {
                log::warn!("Context embedding failed, ranking without embeddings: {}", e);
                None
            }
        }
    }

    /// Embed sections in one batch per document; failed documents are left out.
    fn section_embeddings(&self, sections: &[Section]) -> HashMap<usize, Vec<f32>> {
        let mut by_document: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, s) in sections.iter().enumerate() {
            by_document.entry(s.document_index).or_default().push(i);
        }
        let groups: Vec<(usize, Vec<usize>)> = by_document.into_iter().collect();

        let embed_group = |(doc, indices): &(usize, Vec<usize>)| -> Vec<(usize, Vec<f32>)> {
            let texts: Vec<String> = indices
                .iter()
                .map(|&i| self.embedding_text(&sections[i]))
                .collect();
            match embed_with_timeout(self.embedder.clone(), texts, self.options.embedding_timeout) {
                Ok(vectors) => indices.iter().copied().zip(vectors).collect(),
                Err(e) => {
                    let id = indices.first().map(|&i| sections[i].document_id.as_str()).unwrap_or("");
                    log::warn!("Embeddings unavailable for document {} ({}): {}", doc, id, e);
                    Vec::new()
                }
            }
        };

        let pairs: Vec<Vec<(usize, Vec<f32>)>> = if self.options.parallel {
            groups.par_iter().map(embed_group).collect()
        } else {
            groups.iter().map(embed_group).collect()
        };
        pairs.into_iter().flatten().collect()
    }

    /// Title plus the budget-truncated body.
    fn embedding_text(&self, section: &Section) -> String {
        let body = truncate_at_sentence(&section.body_text, self.options.section_char_budget);
        join_fragments(&section.title, &body)
    }

    /// Indices into `scored` of the top-K, honoring the per-document cap.
    fn select(&self, scored: &[ScoredSection]) -> Vec<usize> {
        let k = self.options.top_k;
        let cap = self.options.per_document_cap;
        let mut per_document: HashMap<usize, usize> = HashMap::new();
        let mut picks: Vec<usize> = Vec::with_capacity(k);
        let mut deferred: Vec<usize> = Vec::new();

        for (i, s) in scored.iter().enumerate() {
            if picks.len() >= k {
                break;
            }
            let count = per_document.entry(s.section.document_index).or_insert(0);
            if cap > 0 && *count >= cap {
                deferred.push(i);
                continue;
            }
            *count += 1;
            picks.push(i);
        }

        // Not enough documents to satisfy the cap
        if picks.len() < k {
            picks.extend(deferred.into_iter().take(k - picks.len()));
            picks.sort_unstable();
        }
        picks
    }

    /// Highest-scoring sentences of a section, re-emitted in document order.
    fn refine(&self, context: &PersonaContext, context_vector: Option<&[f32]>, section: &Section) -> String {
        let sentences: Vec<String> = split_sentences(&section.body_text)
            .into_iter()
            .filter(|s| {
                let n = s.chars().count();
                n >= self.options.min_sentence_chars && n <= self.options.max_sentence_chars
            })
            .collect();

        if sentences.is_empty() {
            let fallback = truncate_at_sentence(&section.body_text, self.options.refined_char_budget);
            return if fallback.is_empty() {
                section.title.clone()
            } else {
                fallback
            };
        }

        let vectors = context_vector.and_then(|_| {
            embed_with_timeout(
                self.embedder.clone(),
                sentences.clone(),
                self.options.embedding_timeout,
            )
            .map_err(|e| log::debug!("Sentence embeddings unavailable: {}", e))
            .ok()
        });

        let mut scored: Vec<(usize, f32)> = sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                let embedding = match (context_vector, &vectors) {
                    (Some(ctx), Some(vs)) => cosine_similarity(ctx, &vs[i]),
                    _ => 0.0,
                };
                let signals = RelevanceSignals {
                    embedding,
                    keyword: keyword_overlap(&context.salient_terms, sentence),
                    content_type: content_type_bonus(context.content_type, classify_content(sentence)),
                };
                (i, self.combine(&signals))
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        let mut best: Vec<usize> = scored
            .into_iter()
            .take(self.options.refined_sentences)
            .map(|(i, _)| i)
            .collect();
        best.sort_unstable();

        let excerpt = best
            .into_iter()
            .map(|i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");
        truncate_at_sentence(&excerpt, self.options.refined_char_budget)
    }
}

/// Descending score; ties by (document, page, reading order).
fn by_score_then_order(a_score: f32, b_score: f32, a: &Section, b: &Section) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then(a.order_key().cmp(&b.order_key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::HeadingLevel;
    use crate::rank::embed::{HashingEmbedder, UnavailableEmbedder};

    /// Rejects every batch holding a text with the marker word.
    #[derive(Clone)]
    struct RejectingEmbedder {
        inner: HashingEmbedder,
        marker: &'static str,
    }

    impl Embedder for RejectingEmbedder {
        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains(self.marker) {
                return Err(Error::EmbeddingUnavailable("batch rejected".to_string()));
            }
            self.inner.embed(text)
        }
    }

    fn section(doc: usize, title: &str, body: &str, page: u32, order: usize) -> Section {
        Section {
            document_id: format!("doc{}.pdf", doc),
            document_index: doc,
            title: title.to_string(),
            page,
            reading_order: order,
            body_text: body.to_string(),
            level: HeadingLevel::H1,
        }
    }

    fn persona() -> PersonaContext {
        PersonaContext::new("Travel Planner", "Plan a 4-day trip for 10 college friends").unwrap()
    }

    fn ranker(options: RankOptions) -> EmbeddingRanker {
        EmbeddingRanker::new(Arc::new(HashingEmbedder::default()), options)
    }

    #[test]
    fn test_dense_importance_ranks() {
        let sections: Vec<Section> = (0..6)
            .map(|i| section(i % 3, &format!("Part {}", i), "Plan the trip with friends.", 1, i))
            .collect();
        let ranking = ranker(RankOptions::default().sequential()).rank(&persona(), &sections);
        let ranks: Vec<usize> = ranking.selected.iter().map(|s| s.importance_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        let overall: Vec<usize> = ranking.scored.iter().map(|s| s.overall_rank).collect();
        assert_eq!(overall, (1..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_per_document_cap() {
        let mut sections: Vec<Section> = (0..4)
            .map(|i| section(0, "Trip plan", "Plan a trip for college friends with hotels.", 1, i))
            .collect();
        sections.push(section(1, "Museums", "The museum holds old paintings.", 1, 0));

        let options = RankOptions::default().with_top_k(3).sequential();
        let ranking = ranker(options).rank(&persona(), &sections);
        let docs: Vec<usize> = ranking.selected.iter().map(|s| s.section.document_index).collect();
        assert_eq!(docs.iter().filter(|d| **d == 0).count(), 2);
        assert!(docs.contains(&1));
    }

    #[test]
    fn test_cap_shortfall_is_filled() {
        let sections: Vec<Section> = (0..4)
            .map(|i| section(0, "Trip plan", "Plan a trip for friends.", 1, i))
            .collect();
        let options = RankOptions::default().with_top_k(3).sequential();
        let ranking = ranker(options).rank(&persona(), &sections);
        assert_eq!(ranking.selected.len(), 3);
    }

    #[test]
    fn test_unavailable_embeddings_still_rank() {
        let sections = vec![
            section(0, "Visa Paperwork", "Embassy forms must be filed in person.", 2, 0),
            section(1, "Group Hotels", "Plan hotel stays for college friends on a 4-day trip.", 1, 0),
        ];
        let r = EmbeddingRanker::new(Arc::new(UnavailableEmbedder), RankOptions::default().sequential());
        let ranking = r.rank(&persona(), &sections);
        assert!(!ranking.embeddings_used);
        assert_eq!(ranking.selected[0].section.title, "Group Hotels");
        assert_eq!(ranking.selected.len(), 2);
    }

    #[test]
    fn test_failed_batch_only_affects_its_document() {
        let sections = vec![
            section(0, "Group Hotels", "Plan hotel stays for college friends on a 4-day trip.", 1, 0),
            section(1, "Ferry Timetable", "Boats leave the harbour for the islands every hour.", 1, 0),
            section(1, "Ticket Office", "Tickets are sold at the pier for groups of friends.", 2, 1),
            section(2, "Friends Itinerary", "Plan each day of the trip with your college friends.", 1, 0),
        ];
        let embedder = RejectingEmbedder {
            inner: HashingEmbedder::default(),
            marker: "harbour",
        };

        for options in [RankOptions::default(), RankOptions::default().sequential()] {
            let ranking = EmbeddingRanker::new(Arc::new(embedder.clone()), options)
                .rank(&persona(), &sections);

            assert!(ranking.embeddings_used);
            assert_eq!(ranking.scored.len(), 4);
            for s in &ranking.scored {
                if s.section.document_index == 1 {
                    assert_eq!(s.signals.embedding, 0.0, "{}", s.section.title);
                } else {
                    assert!(s.signals.embedding > 0.0, "{}", s.section.title);
                }
            }
            let overall: Vec<usize> = ranking.scored.iter().map(|s| s.overall_rank).collect();
            assert_eq!(overall, vec![1, 2, 3, 4]);
            let ranks: Vec<usize> = ranking.selected.iter().map(|s| s.importance_rank).collect();
            assert_eq!(ranks, vec![1, 2, 3, 4]);
            assert!(ranking.selected.iter().any(|s| s.section.title == "Ticket Office"));
        }
    }

    #[test]
    fn test_selected_sections_carry_key_points() {
        let body = "Plan the trip around the ferry times. \
                    The main harbour is the key meeting point for groups.";
        let sections = vec![section(0, "Getting Around", body, 1, 0)];
        let ranking = ranker(RankOptions::default().sequential()).rank(&persona(), &sections);
        assert_eq!(
            ranking.selected[0].key_points,
            vec!["The main harbour is the key meeting point for groups."]
        );

        let none = ranker(RankOptions::default().with_key_points(0)).rank(&persona(), &sections);
        assert!(none.selected[0].key_points.is_empty());
    }

    #[test]
    fn test_refined_text_keeps_document_order() {
        let body = "The region has a long history of trade. \
                    Plan your trip around the harbor festival with friends. \
                    Local bakeries open early in the morning. \
                    Book a hostel for college groups near the station.";
        let sections = vec![section(0, "Tips", body, 1, 0)];
        let options = RankOptions::default().with_refined_sentences(2).without_embeddings();
        let ranking = ranker(options).rank(&persona(), &sections);
        let refined = &ranking.selected[0].refined_text;
        let plan = refined.find("Plan your trip").unwrap();
        let book = refined.find("Book a hostel").unwrap();
        assert!(plan < book);
        assert!(!refined.contains("bakeries"));
    }

    #[test]
    fn test_refined_text_fallback() {
        let sections = vec![section(0, "Short", "Too short.", 1, 0), section(1, "Empty", "", 1, 0)];
        let ranking = ranker(RankOptions::default().sequential()).rank(&persona(), &sections);
        let texts: Vec<&str> = ranking.selected.iter().map(|s| s.refined_text.as_str()).collect();
        assert!(texts.contains(&"Too short."));
        assert!(texts.contains(&"Empty"));
    }
}

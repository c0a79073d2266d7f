//! Integration tests for persona-driven section ranking.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use docmap::model::{HeadingLevel, Section};
use docmap::rank::{ContentType, UnavailableEmbedder};
use docmap::render::{RankingMetadata, RankingResult};
use docmap::{EmbeddingRanker, Error, HashingEmbedder, PersonaContext, RankOptions};

fn section(doc: &str, index: usize, title: &str, page: u32, body: &str) -> Section {
    Section {
        document_id: doc.to_string(),
        document_index: index,
        title: title.to_string(),
        page,
        reading_order: page as usize * 10,
        body_text: body.to_string(),
        level: HeadingLevel::H1,
    }
}

/// Sections from a seven-guide travel collection.
fn travel_sections() -> Vec<Section> {
    vec![
        section(
            "South of France - Cities.pdf",
            0,
            "Marseille",
            2,
            "The oldest city in France grew around its harbour. Its history spans twenty six centuries.",
        ),
        section(
            "South of France - Cities.pdf",
            0,
            "Nice",
            5,
            "Nice sits on the Baie des Anges. The promenade was built by the English community.",
        ),
        section(
            "South of France - Hotels.pdf",
            1,
            "Hotels for Groups of College Friends",
            3,
            "Book a hostel with dorm rooms so the whole group of friends stays together. \
             Reserve early for a trip of 4 days in summer. \
             Choose places near the station to keep travel short.",
        ),
        section(
            "South of France - Hotels.pdf",
            1,
            "Luxury Stays",
            7,
            "Five star palaces line the coast. Many keep private beaches for their guests.",
        ),
        section(
            "South of France - Things to Do.pdf",
            2,
            "Coastal Adventures",
            2,
            "Rent kayaks in the calanques with your group. Try snorkelling at the bay. \
             Book a boat tour for the college friends on day 2.",
        ),
        section(
            "South of France - Cuisine.pdf",
            3,
            "Regional Dishes",
            4,
            "Bouillabaisse began as a fisherman's stew. Ratatouille comes from the Nice area.",
        ),
        section(
            "South of France - Traditions.pdf",
            4,
            "Festivals",
            6,
            "Lavender festivals fill the summer calendar. Villages hold processions in August.",
        ),
        section(
            "South of France - Tips.pdf",
            5,
            "Visa Requirements",
            1,
            "Visitors from outside the Schengen area apply at a consulate. \
             Processing usually takes several weeks.",
        ),
        section(
            "South of France - Restaurants.pdf",
            6,
            "Dining With a Group",
            3,
            "Reserve a long table for groups of 10 people. Plan one shared dinner for all the friends.",
        ),
    ]
}

fn planner() -> PersonaContext {
    PersonaContext::new(
        "Travel Planner",
        "Plan a trip of 4 days for a group of 10 college friends.",
    )
    .unwrap()
}

fn ranker(options: RankOptions) -> EmbeddingRanker {
    EmbeddingRanker::new(Arc::new(HashingEmbedder::default()), options)
}

fn overall_rank(ranking: &docmap::rank::Ranking, title: &str) -> usize {
    ranking
        .scored
        .iter()
        .find(|s| s.section.title == title)
        .map(|s| s.overall_rank)
        .unwrap()
}

#[test]
fn test_task_sections_outrank_unrelated_ones() {
    let ranking = ranker(RankOptions::default()).rank(&planner(), &travel_sections());

    assert!(ranking.embeddings_used);
    assert_eq!(planner().content_type, ContentType::Procedural);

    let lodging = overall_rank(&ranking, "Hotels for Groups of College Friends");
    let visa = overall_rank(&ranking, "Visa Requirements");
    let luxury = overall_rank(&ranking, "Luxury Stays");
    assert!(lodging < visa);
    assert!(lodging < luxury);
    assert_eq!(ranking.selected[0].section.title, "Hotels for Groups of College Friends");
}

#[test]
fn test_importance_ranks_are_dense() {
    let ranking = ranker(RankOptions::default()).rank(&planner(), &travel_sections());

    assert_eq!(ranking.selected.len(), 5);
    let ranks: Vec<usize> = ranking.selected.iter().map(|s| s.importance_rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);

    let overall: Vec<usize> = ranking.scored.iter().map(|s| s.overall_rank).collect();
    assert_eq!(overall, (1..=travel_sections().len()).collect::<Vec<_>>());

    let scores: Vec<f32> = ranking.selected.iter().map(|s| s.relevance_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_per_document_cap() {
    let options = RankOptions::new().with_top_k(4).with_per_document_cap(1);
    let ranking = ranker(options).rank(&planner(), &travel_sections());

    let mut per_doc: HashMap<usize, usize> = HashMap::new();
    for s in &ranking.selected {
        *per_doc.entry(s.section.document_index).or_insert(0) += 1;
    }
    assert_eq!(ranking.selected.len(), 4);
    assert!(per_doc.values().all(|&n| n == 1));
}

#[test]
fn test_small_collection_fills_past_cap() {
    let sections: Vec<Section> = travel_sections()
        .into_iter()
        .filter(|s| s.document_index <= 1)
        .collect();
    let options = RankOptions::new().with_top_k(4).with_per_document_cap(1);
    let ranking = ranker(options).rank(&planner(), &sections);

    assert_eq!(ranking.selected.len(), 4);
    let ranks: Vec<usize> = ranking.selected.iter().map(|s| s.importance_rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn test_fallback_without_embeddings_is_deterministic() {
    let ranker = EmbeddingRanker::new(Arc::new(UnavailableEmbedder), RankOptions::default());
    let first = ranker.rank(&planner(), &travel_sections());
    let second = ranker.rank(&planner(), &travel_sections());

    assert!(!first.embeddings_used);
    assert!(first.scored.iter().all(|s| s.signals.embedding == 0.0));
    let order = |r: &docmap::rank::Ranking| {
        r.scored
            .iter()
            .map(|s| s.section.order_key())
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&first), order(&second));

    // Equal scores fall back to collection order
    for pair in first.scored.windows(2) {
        if pair[0].relevance_score == pair[1].relevance_score {
            assert!(pair[0].section.order_key() < pair[1].section.order_key());
        }
    }
    assert_eq!(first.selected[0].section.title, "Hotels for Groups of College Friends");
}

#[test]
fn test_disabled_embeddings_match_unavailable_backend() {
    let disabled = ranker(RankOptions::new().without_embeddings()).rank(&planner(), &travel_sections());
    let unavailable = EmbeddingRanker::new(Arc::new(UnavailableEmbedder), RankOptions::default())
        .rank(&planner(), &travel_sections());

    let titles = |r: &docmap::rank::Ranking| {
        r.scored
            .iter()
            .map(|s| s.section.title.clone())
            .collect::<Vec<_>>()
    };
    assert!(!disabled.embeddings_used);
    assert_eq!(titles(&disabled), titles(&unavailable));
}

#[test]
fn test_sequential_matches_parallel() {
    let parallel = ranker(RankOptions::default()).rank(&planner(), &travel_sections());
    let sequential = ranker(RankOptions::new().sequential()).rank(&planner(), &travel_sections());

    let summary = |r: &docmap::rank::Ranking| {
        r.selected
            .iter()
            .map(|s| (s.section.title.clone(), s.importance_rank, s.refined_text.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&parallel), summary(&sequential));
}

#[test]
fn test_refined_text_comes_from_section_body() {
    let ranking = ranker(RankOptions::default()).rank(&planner(), &travel_sections());
    let top = &ranking.selected[0];

    assert!(!top.refined_text.is_empty());
    assert!(top.refined_text.len() <= top.section.body_text.len());
    assert!(top.refined_text.contains("group"));
}

#[test]
fn test_empty_persona_rejected() {
    let err = PersonaContext::new("", "  ").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_empty_collection() {
    let ranking = ranker(RankOptions::default()).rank(&planner(), &[]);
    assert!(ranking.scored.is_empty());
    assert!(ranking.selected.is_empty());
}

#[test]
fn test_ranking_result_json() {
    let ranking = ranker(RankOptions::default()).rank(&planner(), &travel_sections());
    let at = Utc.with_ymd_and_hms(2025, 7, 10, 12, 0, 0).unwrap();
    let metadata = RankingMetadata::new(
        vec!["South of France - Hotels.pdf".to_string()],
        &planner(),
        at,
    );
    let result = RankingResult::from_ranking(metadata, &ranking);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["metadata"]["persona"], "Travel Planner");
    assert_eq!(value["metadata"]["processing_timestamp"], "2025-07-10T12:00:00Z");
    assert_eq!(value["extracted_sections"][0]["importance_rank"], 1);
    assert_eq!(
        value["extracted_sections"][0]["document"],
        "South of France - Hotels.pdf"
    );
    assert_eq!(value["extracted_sections"][0]["page_number"], 3);
    assert_eq!(
        value["subsection_analysis"].as_array().map(Vec::len),
        Some(5)
    );

    let first = &value["subsection_analysis"][0];
    assert_eq!(first["parent_section"], "Hotels for Groups of College Friends");
    assert!(first["relevance_score"].as_f64().is_some_and(|s| s > 0.0));
    assert!(first["key_points"].is_array());
    assert_eq!(value["metadata"]["total_processing_time"], 0.0);
}

#[test]
fn test_key_points_follow_indicator_words() {
    let mut sections = travel_sections();
    sections[2].body_text.push_str(
        " The main station has lockers for large bags. It is important to confirm bunk counts.",
    );
    let ranking = ranker(RankOptions::default()).rank(&planner(), &sections);
    let lodging = ranking
        .selected
        .iter()
        .find(|s| s.section.title == "Hotels for Groups of College Friends")
        .unwrap();

    assert_eq!(
        lodging.key_points,
        vec![
            "The main station has lockers for large bags.",
            "It is important to confirm bunk counts.",
        ]
    );
}

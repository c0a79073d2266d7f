//! Persona-driven relevance ranking of document sections.

mod embed;
mod options;
mod persona;
mod ranker;
mod signals;

pub use embed::{embed_with_timeout, Embedder, HashingEmbedder, UnavailableEmbedder};
pub use options::{RankOptions, RelevanceWeights};
pub use persona::{salient_terms, task_content_type, ContentType, PersonaBuilder, PersonaContext, MAX_OBJECTIVES};
pub use ranker::{EmbeddingRanker, RankedSection, Ranking, RelevanceSignals, ScoredSection};
pub use signals::{classify_content, content_type_bonus, cosine_similarity, is_instruction, keyword_overlap};

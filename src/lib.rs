// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod article;
pub mod classify;
pub mod cluster;
pub mod consolidate;
pub mod engine;
pub mod events;
pub mod extract;
pub mod freq_cache;
pub mod normalize;
pub mod score;
pub mod stopwords;
pub mod suggest;

// ---- Re-exports for stable public API ----
pub use crate::article::{
    Article, CandidatePhrase, ConsolidatedPhrase, PhraseCluster, RunReport, ScoredPhrase,
};
pub use crate::classify::{Category, Classifier, ClassifierConfig, Topic, UrlShape};
pub use crate::cluster::cluster_phrases;
pub use crate::consolidate::{consolidate, consolidate_with, ConsolidateParams};
pub use crate::engine::{EngineConfig, TrendEngine};
pub use crate::events::{ChannelSink, EventSink, NullSink, Stage, StageEvent};
pub use crate::extract::{extract_docs, extract_texts, DocTokens, ExtractParams};
pub use crate::freq_cache::FrequencyCache;
pub use crate::score::{
    composite_score, count_occurrences, select_final, MatchPolicy, Occurrence, ScoringParams,
};
pub use crate::suggest::{parse_reply, parse_reply_by_category, DisabledSuggester, PhraseSuggester};

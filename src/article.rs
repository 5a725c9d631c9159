// src/article.rs
//! Core data model shared by the pipeline stages.
//!
//! `Article` mirrors what the scraper collaborator hands over; everything
//! else is produced inside this crate. Articles are immutable after
//! construction and are dropped once a run's scoring finishes, so memory
//! stays bounded by one batch.

use serde::{Deserialize, Serialize};

/// One ingested headline record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Headline text.
    pub title: String,
    /// Sub-headline / lead paragraph. May be empty.
    pub heading: String,
    /// Canonical article URL as scraped.
    pub url: String,
    /// Source identifier, e.g. "prothomalo", "bdnews24".
    pub source: String,
    /// Pre-assigned category label, if the scraper already knows it.
    /// When present the classifier respects it and skips URL matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Publication time, unix seconds.
    pub published_at: u64,
}

impl Article {
    /// Title and heading joined — the only text occurrence counting sees.
    /// Body text is deliberately excluded: only headline-level repetition
    /// counts as "trending".
    pub fn headline_text(&self) -> String {
        if self.heading.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.heading)
        }
    }
}

/// A raw weighted phrase out of the extractor. Transient, per batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePhrase {
    pub text: String,
    /// N-gram order, 1..=3.
    pub order: usize,
    /// Batch-relative importance, >= 0.
    pub score: f64,
}

/// A phrase that survived consolidation. Carries the best score seen in
/// its duplicate equivalence class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedPhrase {
    pub text: String,
    pub score: f64,
}

/// One thematic bucket out of the clusterer. Clusters of a run form an
/// exact partition of the consolidated phrase set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseCluster {
    pub id: usize,
    pub phrases: Vec<ConsolidatedPhrase>,
}

/// Final, externally visible output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPhrase {
    pub phrase: String,
    /// Category label the phrase was scored under.
    pub category: String,
    /// Articles whose title+heading matched (capped use happens inside
    /// the composite formula, not here).
    pub occurrence_count: usize,
    /// Unique `source` ids among matching articles.
    pub distinct_source_count: usize,
    pub composite_score: f64,
}

/// Outcome of one full engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-category ranked phrase lists, in category declaration order,
    /// synthetic buckets last.
    pub per_category: Vec<(String, Vec<ScoredPhrase>)>,
    /// Thematic grouping of each category's consolidated phrases.
    /// Enrichment for consumers; the ranked lists above stand alone.
    pub clusters: Vec<(String, Vec<PhraseCluster>)>,
    /// Unix seconds when the run finished.
    pub generated_at: u64,
    /// Articles seen this run.
    pub article_count: usize,
    /// Census of synthetic fallback buckets, for later promotion of the
    /// populous ones to first-class categories.
    pub synthetic_bucket_counts: Vec<(String, usize)>,
}

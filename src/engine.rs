// src/engine.rs
//! # Trend Engine
//! Orchestrates one full run: classify → per-category extraction,
//! consolidation, clustering (parallel, isolated) → serialized suggester
//! pass → scoring → `RunReport`.
//!
//! The analysis kernel stays pure and synchronous; this layer owns the
//! async plumbing, the frequency cache lifecycle and the event sink.
//! One category failing (even panicking) degrades that category to an
//! empty candidate list and never corrupts another's result.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::article::{Article, ConsolidatedPhrase, PhraseCluster, RunReport};
use crate::classify::{Classifier, Topic, SYNTHETIC_PREFIX};
use crate::cluster::cluster_phrases;
use crate::consolidate::consolidate;
use crate::events::{EventSink, NullSink, Stage, StageEvent};
use crate::extract::{extract_docs, DocTokens, ExtractParams};
use crate::freq_cache::FrequencyCache;
use crate::normalize::sentence_tokens;
use crate::score::{select_final, MatchPolicy, ScoringParams};
use crate::suggest::{parse_reply, DynSuggester};

pub const DEFAULT_ENGINE_CONFIG_PATH: &str = "config/engine.json";
pub const ENV_ENGINE_CONFIG_PATH: &str = "TREND_ENGINE_CONFIG_PATH";

/// Run tuning. All fields have serde defaults so a partial JSON file is
/// fine; a missing or corrupt file yields `EngineConfig::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Final ranked phrases requested per category.
    pub per_category_n: usize,
    /// Candidates the extractor returns per category.
    pub extract_top_k: usize,
    /// Survivor cap after consolidation.
    pub max_candidates: usize,
    /// Upper bound on thematic clusters per category.
    pub cluster_k: usize,
    /// Cooperative delay between suggester calls (per-minute quotas on
    /// the provider side), milliseconds.
    pub suggester_delay_ms: u64,
    /// Headlines handed to the suggester per category.
    pub suggester_headline_cap: usize,
    /// Opt-in proximity fallback window (tokens). None keeps exact
    /// substring matching as the only signal.
    pub proximity_window: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_category_n: 10,
            extract_top_k: 60,
            max_candidates: 25,
            cluster_k: 6,
            suggester_delay_ms: 4_000,
            suggester_headline_cap: 30,
            proximity_window: None,
        }
    }
}

impl EngineConfig {
    /// Load from TREND_ENGINE_CONFIG_PATH or the default path.
    pub fn load() -> Self {
        let path = std::env::var(ENV_ENGINE_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_ENGINE_CONFIG_PATH.to_string());
        Self::load_from_file(path)
    }

    /// Load from a JSON file, falling back to defaults on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    fn scoring_params(&self) -> ScoringParams {
        ScoringParams {
            policy: match self.proximity_window {
                Some(window) => MatchPolicy::ExactThenProximity { window },
                None => MatchPolicy::Exact,
            },
            ..ScoringParams::default()
        }
    }
}

/// Anonymized id for logging around user-visible text: hash, never raw.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// The orchestrator. Built once, run per batch; the frequency cache
/// accumulates across runs until the caller takes or replaces it.
pub struct TrendEngine {
    classifier: Arc<Classifier>,
    config: EngineConfig,
    suggester: Option<DynSuggester>,
    sink: Arc<dyn EventSink>,
    cache: FrequencyCache,
}

impl TrendEngine {
    pub fn new(classifier: Classifier, config: EngineConfig) -> Self {
        Self {
            classifier: Arc::new(classifier),
            config,
            suggester: None,
            sink: Arc::new(NullSink),
            cache: FrequencyCache::new(),
        }
    }

    pub fn with_suggester(mut self, suggester: DynSuggester) -> Self {
        self.suggester = Some(suggester);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Inject a cache loaded by the caller; the load/merge/save
    /// lifecycle is theirs.
    pub fn with_cache(mut self, cache: FrequencyCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &FrequencyCache {
        &self.cache
    }

    /// Hand the cache back for persisting, leaving a fresh one behind.
    pub fn take_cache(&mut self) -> FrequencyCache {
        std::mem::take(&mut self.cache)
    }

    /// Run the full pipeline over one article batch.
    pub async fn run(&mut self, articles: Vec<Article>) -> Result<RunReport> {
        let article_count = articles.len();
        let (groups, synthetic_counts) = self.classify_batch(articles);
        self.sink.emit(StageEvent::now(
            Stage::Classified,
            None,
            article_count,
            groups.len(),
        ));
        info!(
            articles = article_count,
            categories = groups.len(),
            "batch classified"
        );

        let order = category_order(&groups);
        let kernel_out = self.run_kernel_tasks(&groups).await;

        let external = match &self.suggester {
            Some(suggester) => self.suggester_pass(suggester.clone(), &order, &groups).await,
            None => HashMap::new(),
        };

        let local: HashMap<String, Vec<ConsolidatedPhrase>> = kernel_out
            .iter()
            .map(|(label, (phrases, _))| (label.clone(), phrases.clone()))
            .collect();
        let clusters: Vec<(String, Vec<PhraseCluster>)> = order
            .iter()
            .filter_map(|label| {
                kernel_out
                    .get(label)
                    .map(|(_, clusters)| (label.clone(), clusters.clone()))
            })
            .collect();

        let ranked = select_final(
            &external,
            &local,
            &groups,
            self.config.per_category_n,
            &self.config.scoring_params(),
        );
        let ranked_by_label: HashMap<String, _> = ranked.into_iter().collect();
        let per_category: Vec<_> = order
            .iter()
            .map(|label| {
                (
                    label.clone(),
                    ranked_by_label.get(label).cloned().unwrap_or_default(),
                )
            })
            .collect();
        let scored_total: usize = per_category.iter().map(|(_, v)| v.len()).sum();
        self.sink.emit(StageEvent::now(
            Stage::Scored,
            None,
            article_count,
            scored_total,
        ));

        // Feed the cross-run cache, then drop the batch: articles are
        // not retained past scoring.
        for articles in groups.values() {
            for article in articles {
                self.cache
                    .observe_doc(&crate::normalize::tokenize(&article.headline_text()));
            }
        }

        Ok(RunReport {
            per_category,
            clusters,
            generated_at: chrono::Utc::now().timestamp().max(0) as u64,
            article_count,
            synthetic_bucket_counts: synthetic_counts,
        })
    }

    /// Assign every article to exactly one category label.
    fn classify_batch(
        &self,
        articles: Vec<Article>,
    ) -> (HashMap<String, Vec<Article>>, Vec<(String, usize)>) {
        let mut groups: HashMap<String, Vec<Article>> = HashMap::new();
        for article in articles {
            let label = match &article.category {
                Some(pre) if !pre.trim().is_empty() => pre.trim().to_string(),
                _ => self
                    .classifier
                    .classify(&article.url, &article.title, &article.heading)
                    .label(),
            };
            groups.entry(label).or_default().push(article);
        }
        let mut synthetic: Vec<(String, usize)> = groups
            .iter()
            .filter(|(label, _)| label.starts_with(SYNTHETIC_PREFIX))
            .map(|(label, arts)| (label.clone(), arts.len()))
            .collect();
        synthetic.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        (groups, synthetic)
    }

    /// Extraction → consolidation → clustering per category, in parallel
    /// blocking tasks. A panicked task logs and yields an empty result
    /// for that category only.
    async fn run_kernel_tasks(
        &self,
        groups: &HashMap<String, Vec<Article>>,
    ) -> HashMap<String, (Vec<ConsolidatedPhrase>, Vec<PhraseCluster>)> {
        let cache = Arc::new(self.cache.clone());
        let mut set: JoinSet<(String, Vec<ConsolidatedPhrase>, Vec<PhraseCluster>)> =
            JoinSet::new();

        for (label, articles) in groups {
            let label = label.clone();
            let texts: Vec<String> = articles.iter().map(|a| a.headline_text()).collect();
            let cache = Arc::clone(&cache);
            let sink = Arc::clone(&self.sink);
            let config = self.config.clone();
            set.spawn_blocking(move || {
                let docs: Vec<DocTokens> = texts.iter().map(|t| sentence_tokens(t)).collect();
                let candidates = extract_docs(
                    &docs,
                    config.extract_top_k,
                    &ExtractParams::default(),
                    Some(&cache),
                );
                sink.emit(StageEvent::now(
                    Stage::Extracted,
                    Some(label.clone()),
                    docs.len(),
                    candidates.len(),
                ));

                let candidate_count = candidates.len();
                let consolidated = consolidate(candidates, config.max_candidates);
                sink.emit(StageEvent::now(
                    Stage::Consolidated,
                    Some(label.clone()),
                    candidate_count,
                    consolidated.len(),
                ));

                let clusters = cluster_phrases(&consolidated, config.cluster_k);
                sink.emit(StageEvent::now(
                    Stage::Clustered,
                    Some(label.clone()),
                    consolidated.len(),
                    clusters.len(),
                ));

                (label, consolidated, clusters)
            });
        }

        let mut out = HashMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((label, consolidated, clusters)) => {
                    out.insert(label, (consolidated, clusters));
                }
                Err(e) => {
                    // The label is lost with the panicked task; the
                    // missing entry degrades to empty downstream.
                    warn!(error = %e, "category kernel task failed, degrading to empty");
                }
            }
        }
        out
    }

    /// One suggester call per category, strictly serialized with a fixed
    /// inter-call delay — a cooperative rate limit for the provider's
    /// per-minute quota, not a concurrency primitive.
    async fn suggester_pass(
        &self,
        suggester: DynSuggester,
        order: &[String],
        groups: &HashMap<String, Vec<Article>>,
    ) -> HashMap<String, Vec<String>> {
        let mut external: HashMap<String, Vec<String>> = HashMap::new();
        let delay = Duration::from_millis(self.config.suggester_delay_ms);

        let mut called = false;
        for label in order {
            let headlines: Vec<String> = groups
                .get(label)
                .map(|arts| {
                    arts.iter()
                        .take(self.config.suggester_headline_cap)
                        .map(|a| a.title.clone())
                        .collect()
                })
                .unwrap_or_default();
            if headlines.is_empty() {
                continue;
            }
            if called {
                tokio::time::sleep(delay).await;
            }
            called = true;

            let phrases = match suggester.suggest(label, &headlines).await {
                Some(reply) => parse_reply(&reply),
                None => Vec::new(),
            };
            self.sink.emit(StageEvent::now(
                Stage::SuggesterQueried,
                Some(label.clone()),
                headlines.len(),
                phrases.len(),
            ));
            debug!(
                provider = suggester.name(),
                category = anon_hash(label).as_str(),
                parsed = phrases.len(),
                "suggester reply parsed"
            );
            if !phrases.is_empty() {
                external.insert(label.clone(), phrases);
            }
        }
        external
    }
}

/// Presentation order: fixed topics first (declaration order), then the
/// special overrides, then everything else (pre-assigned and synthetic
/// labels) sorted for determinism.
fn category_order(groups: &HashMap<String, Vec<Article>>) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(groups.len());
    for topic in Topic::ALL {
        if groups.contains_key(topic.label()) {
            order.push(topic.label().to_string());
        }
    }
    for special in ["আর্কাইভ", "প্রচ্ছদ"] {
        if groups.contains_key(special) {
            order.push(special.to_string());
        }
    }
    let mut rest: Vec<String> = groups
        .keys()
        .filter(|k| !order.iter().any(|o| o == *k))
        .cloned()
        .collect();
    rest.sort();
    order.extend(rest);
    order
}

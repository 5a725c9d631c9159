// src/score.rs
//! Frequency & scoring engine: how often a phrase occurs across the
//! corpus, how many distinct sources carry it, and the composite
//! popularity number that ranks the final lists.
//!
//! Occurrence counting matches against title+heading only — body text is
//! excluded because only headline-level repetition counts as trending.
//! Exact case-insensitive substring match is the single default-on
//! signal. The proximity variant is opt-in, consulted only when exact
//! matching finds nothing in the whole corpus, and bounded by a
//! caller-supplied token window so phrases that merely share one common
//! word cannot inflate each other.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::article::{Article, ConsolidatedPhrase, ScoredPhrase};

/// How occurrences are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Exact case-insensitive substring only.
    Exact,
    /// Exact first; if the phrase has zero exact hits across the entire
    /// corpus, retry with all phrase tokens inside a `window`-token span.
    ExactThenProximity { window: usize },
}

/// Occurrence statistics for one phrase over one corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Occurrence {
    pub occurrence_count: usize,
    pub distinct_source_count: usize,
}

/// Composite-score tuning. Source spread is weighted above raw
/// repetition so one hyperactive source cannot dominate, and occurrences
/// are capped before combining.
#[derive(Debug, Clone, Copy)]
pub struct ScoringParams {
    pub occurrence_cap: usize,
    pub occurrence_weight: f64,
    pub source_weight: f64,
    pub policy: MatchPolicy,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            occurrence_cap: 10,
            occurrence_weight: 1.0,
            source_weight: 1.5,
            policy: MatchPolicy::Exact,
        }
    }
}

/// Count matching articles and their distinct sources.
pub fn count_occurrences(phrase: &str, articles: &[Article], policy: MatchPolicy) -> Occurrence {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() || articles.is_empty() {
        return Occurrence::default();
    }

    let exact = count_with(articles, |haystack, _| haystack.contains(&needle));
    if exact.occurrence_count > 0 {
        return exact;
    }

    match policy {
        MatchPolicy::Exact => exact,
        MatchPolicy::ExactThenProximity { window } => {
            let tokens: Vec<String> = needle.split_whitespace().map(str::to_string).collect();
            if tokens.len() < 2 {
                return exact;
            }
            count_with(articles, |_, words| within_window(words, &tokens, window))
        }
    }
}

fn count_with<F>(articles: &[Article], matches: F) -> Occurrence
where
    F: Fn(&str, &[String]) -> bool,
{
    let mut count = 0usize;
    let mut sources: BTreeSet<&str> = BTreeSet::new();
    for article in articles {
        let haystack = article.headline_text().to_lowercase();
        let words: Vec<String> = haystack.split_whitespace().map(str::to_string).collect();
        if matches(&haystack, &words) {
            count += 1;
            sources.insert(article.source.as_str());
        }
    }
    Occurrence {
        occurrence_count: count,
        distinct_source_count: sources.len(),
    }
}

/// True when every needle token occurs inside some `window`-token span.
fn within_window(words: &[String], tokens: &[String], window: usize) -> bool {
    if words.len() < tokens.len() {
        return false;
    }
    for start in 0..words.len() {
        let end = (start + window).min(words.len().saturating_sub(1));
        let span = &words[start..=end];
        if tokens
            .iter()
            .all(|t| span.iter().any(|w| w.contains(t.as_str())))
        {
            return true;
        }
    }
    false
}

/// Monotone composite popularity: capped occurrences plus weighted
/// distinct-source spread.
pub fn composite_score(occ: &Occurrence, params: &ScoringParams) -> f64 {
    let capped = occ.occurrence_count.min(params.occurrence_cap) as f64;
    capped * params.occurrence_weight + occ.distinct_source_count as f64 * params.source_weight
}

/// Build the final ranked per-category lists.
///
/// Externally supplied candidates (e.g. from the LLM collaborator) are
/// scored first; when fewer than `per_category_n` of them are usable
/// (at least one occurrence), the list refills deterministically from
/// the next-best locally ranked candidates. Reaching exactly N is
/// best-effort — a thin category returns fewer phrases, never an error.
pub fn select_final(
    external: &HashMap<String, Vec<String>>,
    local: &HashMap<String, Vec<ConsolidatedPhrase>>,
    articles_by_category: &HashMap<String, Vec<Article>>,
    per_category_n: usize,
    params: &ScoringParams,
) -> Vec<(String, Vec<ScoredPhrase>)> {
    let mut labels: BTreeSet<&String> = BTreeSet::new();
    labels.extend(articles_by_category.keys());
    labels.extend(external.keys());
    labels.extend(local.keys());

    let empty_articles: Vec<Article> = Vec::new();
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let articles = articles_by_category.get(label).unwrap_or(&empty_articles);
        let mut seen: HashSet<String> = HashSet::new();
        let mut picked: Vec<ScoredPhrase> = Vec::new();

        let externals = external.get(label).map(Vec::as_slice).unwrap_or(&[]);
        for cand in externals {
            push_usable(cand, label, articles, params, &mut seen, &mut picked);
        }

        if picked.len() < per_category_n {
            let locals = local.get(label).map(Vec::as_slice).unwrap_or(&[]);
            for cand in locals {
                if picked.len() >= per_category_n {
                    break;
                }
                push_usable(&cand.text, label, articles, params, &mut seen, &mut picked);
            }
        }

        picked.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.occurrence_count.cmp(&a.occurrence_count))
                .then_with(|| a.phrase.cmp(&b.phrase))
        });
        picked.truncate(per_category_n);
        out.push((label.clone(), picked));
    }
    out
}

fn push_usable(
    candidate: &str,
    label: &str,
    articles: &[Article],
    params: &ScoringParams,
    seen: &mut HashSet<String>,
    picked: &mut Vec<ScoredPhrase>,
) {
    let text = candidate.trim();
    if text.is_empty() {
        return;
    }
    let key = text.to_lowercase();
    if !seen.insert(key) {
        return;
    }
    let occ = count_occurrences(text, articles, params.policy);
    if occ.occurrence_count == 0 {
        return;
    }
    picked.push(ScoredPhrase {
        phrase: text.to_string(),
        category: label.to_string(),
        occurrence_count: occ.occurrence_count,
        distinct_source_count: occ.distinct_source_count,
        composite_score: composite_score(&occ, params),
    });
}

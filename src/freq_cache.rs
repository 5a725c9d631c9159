// src/freq_cache.rs
//! Cross-run word-frequency cache.
//!
//! An explicit, injectable object with a load/merge/save lifecycle owned
//! by the orchestrator's caller — not a hidden module-level singleton.
//! The extractor borrows it to smooth batch IDF with document frequencies
//! accumulated over previous runs; an empty cache is always valid and
//! makes extraction purely batch-relative.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FrequencyCache {
    /// term -> number of documents (across all observed runs) containing it.
    doc_frequencies: HashMap<String, u64>,
    /// Total documents observed.
    total_docs: u64,
}

impl FrequencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document's token set. Each distinct term counts once
    /// per document.
    pub fn observe_doc(&mut self, tokens: &[String]) {
        if tokens.is_empty() {
            return;
        }
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *self.doc_frequencies.entry(term.to_string()).or_insert(0) += 1;
        }
        self.total_docs += 1;
    }

    /// Fold another cache into this one (e.g. merging per-worker caches
    /// before saving).
    pub fn merge(&mut self, other: &FrequencyCache) {
        for (term, df) in &other.doc_frequencies {
            *self.doc_frequencies.entry(term.clone()).or_insert(0) += df;
        }
        self.total_docs += other.total_docs;
    }

    /// Cached document frequency for a term; 0 when unseen.
    pub fn df(&self, term: &str) -> u64 {
        self.doc_frequencies.get(term).copied().unwrap_or(0)
    }

    pub fn total_docs(&self) -> u64 {
        self.total_docs
    }

    pub fn is_empty(&self) -> bool {
        self.total_docs == 0
    }

    /// Load from a JSON file. Missing or corrupt files yield an empty
    /// cache — a fresh cache is always a correct starting point.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(cache) => cache,
                Err(e) => {
                    warn!(error = %e, path = %path.as_ref().display(), "corrupt frequency cache, starting empty");
                    Self::new()
                }
            },
            Err(_) => Self::new(),
        }
    }

    /// Persist to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing frequency cache to {}", path.as_ref().display()))?;
        debug!(
            terms = self.doc_frequencies.len(),
            docs = self.total_docs,
            "frequency cache saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn observe_counts_each_term_once_per_doc() {
        let mut c = FrequencyCache::new();
        c.observe_doc(&doc(&["সরকার", "সরকার", "নীতি"]));
        assert_eq!(c.df("সরকার"), 1);
        assert_eq!(c.df("নীতি"), 1);
        assert_eq!(c.total_docs(), 1);
    }

    #[test]
    fn empty_doc_is_not_counted() {
        let mut c = FrequencyCache::new();
        c.observe_doc(&[]);
        assert!(c.is_empty());
    }

    #[test]
    fn merge_adds_counts_and_totals() {
        let mut a = FrequencyCache::new();
        a.observe_doc(&doc(&["সরকার"]));
        let mut b = FrequencyCache::new();
        b.observe_doc(&doc(&["সরকার", "নীতি"]));
        a.merge(&b);
        assert_eq!(a.df("সরকার"), 2);
        assert_eq!(a.df("নীতি"), 1);
        assert_eq!(a.total_docs(), 2);
    }

    #[test]
    fn missing_file_loads_empty() {
        let c = FrequencyCache::load_from_file("/nonexistent/freq.json");
        assert!(c.is_empty());
    }
}

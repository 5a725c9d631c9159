// src/extract.rs
//! Phrase extractor: ranked 1–3-gram candidates by batch-relative TF-IDF.
//!
//! Importance is computed only over the supplied batch — the same phrase
//! scores differently in different batches. An injected `FrequencyCache`
//! can add document frequencies from earlier runs so chronically common
//! words sink without ever gating the output.

use std::collections::{HashMap, HashSet};

use crate::article::CandidatePhrase;
use crate::freq_cache::FrequencyCache;
use crate::normalize::sentence_tokens;

/// One document as per-sentence token lists. N-grams are built inside a
/// sentence only.
pub type DocTokens = Vec<Vec<String>>;

/// Tunables for extraction. Defaults match the pipeline's use.
#[derive(Debug, Clone)]
pub struct ExtractParams {
    /// Highest n-gram order to build (1..=3 is the supported range).
    pub max_order: usize,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self { max_order: 3 }
    }
}

#[derive(Default)]
struct PhraseStats {
    count: u64,
    doc_freq: u64,
    order: usize,
    first_seen: usize,
}

/// Extract the `top_k` highest-scoring phrases from pre-tokenized docs.
///
/// Ties break toward the longer phrase, then toward first appearance in
/// the batch. A degenerate (empty or all-stopword) corpus returns an
/// empty list, never an error.
pub fn extract_docs(
    docs: &[DocTokens],
    top_k: usize,
    params: &ExtractParams,
    cache: Option<&FrequencyCache>,
) -> Vec<CandidatePhrase> {
    let max_order = params.max_order.clamp(1, 3);
    let mut stats: HashMap<String, PhraseStats> = HashMap::new();
    let mut total_ngrams: u64 = 0;
    let mut next_seen = 0usize;
    let mut doc_count: u64 = 0;

    for doc in docs {
        if doc.iter().all(|s| s.is_empty()) {
            continue;
        }
        doc_count += 1;
        let mut seen_this_doc: HashSet<String> = HashSet::new();
        let mut doc_phrases: Vec<(String, usize)> = Vec::new();

        for sentence in doc {
            for order in 1..=max_order {
                if sentence.len() < order {
                    continue;
                }
                for window in sentence.windows(order) {
                    doc_phrases.push((window.join(" "), order));
                }
            }
        }

        for (phrase, order) in doc_phrases {
            total_ngrams += 1;
            let new_in_doc = seen_this_doc.insert(phrase.clone());
            let entry = stats.entry(phrase).or_insert_with(|| {
                let s = PhraseStats {
                    order,
                    first_seen: next_seen,
                    ..PhraseStats::default()
                };
                next_seen += 1;
                s
            });
            entry.count += 1;
            if new_in_doc {
                entry.doc_freq += 1;
            }
        }
    }

    if total_ngrams == 0 {
        return Vec::new();
    }

    let cache = cache.filter(|c| !c.is_empty());
    let cache_docs = cache.map_or(0, |c| c.total_docs());

    let n = (doc_count + cache_docs) as f64;
    let mut ranked: Vec<(CandidatePhrase, usize)> = stats
        .into_iter()
        .map(|(text, s)| {
            let tf = s.count as f64 / total_ngrams as f64;
            let df = (s.doc_freq + cache.map_or(0, |c| c.df(&text))) as f64;
            // Half-smoothed IDF: sharply discounts terms present in every
            // document (a batch of near-identical headlines must rank the
            // one distinctive phrase first), yet stays positive for a
            // single-document batch where df == n.
            let idf = ((n + 0.5) / df).ln();
            let score = tf * idf;
            (
                CandidatePhrase {
                    text,
                    order: s.order,
                    score,
                },
                s.first_seen,
            )
        })
        .collect();

    ranked.sort_by(|(a, seen_a), (b, seen_b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.order.cmp(&a.order))
            .then_with(|| b.text.chars().count().cmp(&a.text.chars().count()))
            .then_with(|| seen_a.cmp(seen_b))
    });

    ranked
        .into_iter()
        .take(top_k)
        .map(|(phrase, _)| phrase)
        .collect()
}

/// Convenience: normalize raw texts, then extract.
pub fn extract_texts(texts: &[&str], top_k: usize) -> Vec<CandidatePhrase> {
    let docs: Vec<DocTokens> = texts.iter().map(|t| sentence_tokens(t)).collect();
    extract_docs(&docs, top_k, &ExtractParams::default(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(sentences: &[&[&str]]) -> DocTokens {
        sentences
            .iter()
            .map(|s| s.iter().map(|w| w.to_string()).collect())
            .collect()
    }

    #[test]
    fn empty_corpus_returns_empty() {
        assert!(extract_docs(&[], 10, &ExtractParams::default(), None).is_empty());
        let blank = vec![doc(&[&[]])];
        assert!(extract_docs(&blank, 10, &ExtractParams::default(), None).is_empty());
    }

    #[test]
    fn inserted_phrase_outranks_shared_boilerplate() {
        // Two near-identical docs; one carries a distinctive bigram.
        let a = doc(&[&["সরকার", "নীতি", "ঘোষণা"]]);
        let b = doc(&[&["সরকার", "নীতি", "ঘোষণা", "পদ্মা", "সেতু"]]);
        let ranked = extract_docs(&[a, b], 50, &ExtractParams::default(), None);
        let pos = |text: &str| ranked.iter().position(|p| p.text == text);
        let inserted = pos("পদ্মা সেতু").expect("inserted bigram extracted");
        let boilerplate = pos("সরকার").expect("shared unigram extracted");
        assert!(
            inserted < boilerplate,
            "inserted phrase ranked {inserted}, boilerplate {boilerplate}"
        );
    }

    #[test]
    fn ties_prefer_longer_phrase() {
        // Single doc, every n-gram occurs once: equal tf, equal df.
        let d = doc(&[&["পদ্মা", "সেতু"]]);
        let ranked = extract_docs(&[d], 10, &ExtractParams::default(), None);
        assert_eq!(ranked[0].text, "পদ্মা সেতু");
        assert_eq!(ranked[0].order, 2);
    }

    #[test]
    fn ngrams_do_not_cross_sentences() {
        let d = doc(&[&["ঢাকা", "বৃষ্টি"], &["ক্রিকেট", "জয়"]]);
        let ranked = extract_docs(&[d], 50, &ExtractParams::default(), None);
        assert!(ranked.iter().all(|p| p.text != "বৃষ্টি ক্রিকেট"));
        assert!(ranked.iter().any(|p| p.text == "ঢাকা বৃষ্টি"));
    }

    #[test]
    fn cache_penalizes_chronically_common_terms() {
        let corpus = vec![
            doc(&[&["সরকার", "বাজেট"]]),
            doc(&[&["সরকার", "নির্বাচন"]]),
            doc(&[&["দুর্নীতি", "মামলা"]]),
        ];
        let no_cache = extract_docs(&corpus, 50, &ExtractParams::default(), None);

        let mut cache = crate::freq_cache::FrequencyCache::new();
        for _ in 0..50 {
            cache.observe_doc(&["সরকার".to_string()]);
        }
        let with_cache = extract_docs(&corpus, 50, &ExtractParams::default(), Some(&cache));

        let score = |list: &[CandidatePhrase], text: &str| {
            list.iter().find(|p| p.text == text).map(|p| p.score).unwrap()
        };
        assert!(score(&with_cache, "সরকার") < score(&no_cache, "সরকার"));
        // A term the cache never saw is *boosted* by the larger corpus.
        assert!(score(&with_cache, "বাজেট") > score(&no_cache, "বাজেট"));
    }

    #[test]
    fn top_k_truncates() {
        let d = doc(&[&["এক", "দুটো", "তিন", "চারটি", "পাঁচ"]]);
        let ranked = extract_docs(&[d], 3, &ExtractParams::default(), None);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn scores_are_non_negative() {
        let d = doc(&[&["সরকার", "নীতি"]]);
        for p in extract_docs(&[d], 10, &ExtractParams::default(), None) {
            assert!(p.score >= 0.0);
        }
    }
}

// src/consolidate.rs
//! Phrase consolidator: drop low-quality candidates, then merge
//! near-duplicates so each equivalence class surfaces exactly once.
//!
//! Rejection removes a phrase outright (person-name markers,
//! reported-speech filler, sentence fragments, residual verb stems).
//! Deduplication merges: the class representative carries the class's
//! top score, and a longer phrasing wins only when its own score is
//! competitive. The 0.7 overlap threshold is deliberately high — a
//! single shared token out of two ("ক্ষুদ্র নৃগোষ্ঠী" vs
//! "ক্ষুদ্র জাতিগোষ্ঠী") must NOT merge distinct topics.

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::collections::HashSet;

use crate::article::{CandidatePhrase, ConsolidatedPhrase};

/// Tuning knobs, with the pipeline defaults.
#[derive(Clone, Debug)]
pub struct ConsolidateParams {
    /// Token-overlap ratio above which two phrases are duplicates.
    pub overlap_threshold: f64,
    /// Normalized Levenshtein similarity treated as a typo-level variant.
    pub levenshtein_threshold: f64,
    /// A longer duplicate replaces the incumbent only if its score is at
    /// least this fraction of the incumbent's.
    pub competitive_ratio: f64,
    /// Phrases at or beyond this many chars are sentence fragments.
    pub max_phrase_chars: usize,
}

impl Default for ConsolidateParams {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.7,
            levenshtein_threshold: 0.92,
            competitive_ratio: 0.8,
            max_phrase_chars: 30,
        }
    }
}

impl ConsolidateParams {
    /// Parameter hygiene: ratios clamped into [0,1], fragment cap >= 4.
    fn sanitized(mut self) -> Self {
        self.overlap_threshold = self.overlap_threshold.clamp(0.0, 1.0);
        self.levenshtein_threshold = self.levenshtein_threshold.clamp(0.0, 1.0);
        self.competitive_ratio = self.competitive_ratio.clamp(0.0, 1.0);
        self.max_phrase_chars = self.max_phrase_chars.max(4);
        self
    }
}

/// Honorifics and surname markers. A phrase containing any of these is a
/// person reference, which is noise for a topic signal.
#[rustfmt::skip]
static PERSON_MARKERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "জনাব", "বেগম", "মিসেস", "মিস", "অধ্যাপক", "মাওলানা", "ব্যারিস্টার",
        "অ্যাডভোকেট", "ইঞ্জিনিয়ার", "ডক্টর", "সাহেব", "চৌধুরী", "তালুকদার",
        "ভূঁইয়া", "সিকদার", "মজুমদার", "হাওলাদার", "মোল্লা", "মুন্সী",
    ]
    .into_iter()
    .collect()
});

/// Residual verb stems that occasionally survive tokenization as a whole
/// "phrase". Exact-match rejection only.
#[rustfmt::skip]
static VERB_RESIDUES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "বলছে", "বলবে", "বলবেন", "চলছে", "আসছে", "আসবে", "যাচ্ছে",
        "যাচ্ছেন", "হবেন", "পেয়েছে", "নিয়েছে", "দিচ্ছে", "ঘটেছে",
    ]
    .into_iter()
    .collect()
});

/// Reported-speech connectives and similar filler shapes.
fn filler_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new("বলে জানিয়েছে|বলে জানা|সূত্রে জানা|বলে মন্তব্য|প্রসঙ্গে বলে|উল্লেখ করে")
            .expect("filler regex")
    })
}

/// Consolidate with default parameters.
pub fn consolidate(ranked: Vec<CandidatePhrase>, max_results: usize) -> Vec<ConsolidatedPhrase> {
    consolidate_with(ranked, max_results, &ConsolidateParams::default())
}

/// Filter, dedup, rank, truncate. Output is a subset of the input by
/// text, sorted by score descending, len <= max_results.
pub fn consolidate_with(
    ranked: Vec<CandidatePhrase>,
    max_results: usize,
    params: &ConsolidateParams,
) -> Vec<ConsolidatedPhrase> {
    let params = params.clone().sanitized();

    let mut candidates: Vec<CandidatePhrase> = ranked
        .into_iter()
        .map(|mut p| {
            p.text = normalize_phrase(&p.text);
            p
        })
        .filter(|p| !should_reject(&p.text, &params))
        .collect();

    // Highest score first; stable so extractor tie-breaks survive.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut survivors: Vec<ConsolidatedPhrase> = Vec::new();
    for cand in candidates {
        let class = survivors
            .iter()
            .position(|kept| is_duplicate(&kept.text, &cand.text, &params));
        let Some(idx) = class else {
            survivors.push(ConsolidatedPhrase {
                text: cand.text,
                score: cand.score,
            });
            continue;
        };
        // Class representative: prefer the longer, more specific phrasing
        // when its score is competitive; the class keeps its top score
        // either way. The swap is vetoed if the longer text would itself
        // duplicate a different survivor.
        let incumbent_len = survivors[idx].text.chars().count();
        let challenger_len = cand.text.chars().count();
        let competitive = cand.score >= params.competitive_ratio * survivors[idx].score;
        let collides_elsewhere = survivors
            .iter()
            .enumerate()
            .any(|(i, s)| i != idx && is_duplicate(&s.text, &cand.text, &params));
        if challenger_len > incumbent_len && competitive && !collides_elsewhere {
            survivors[idx].text = cand.text;
        }
    }

    survivors.truncate(max_results);
    survivors
}

fn normalize_phrase(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn should_reject(text: &str, params: &ConsolidateParams) -> bool {
    let char_len = text.chars().count();
    if char_len < 2 || char_len >= params.max_phrase_chars {
        return true;
    }
    if text.split_whitespace().any(|t| PERSON_MARKERS.contains(t)) {
        return true;
    }
    if filler_regex().is_match(text) {
        return true;
    }
    VERB_RESIDUES.contains(text)
}

/// Duplicate test: normalized substring containment, high token overlap,
/// or a typo-level edit-distance variant.
fn is_duplicate(a: &str, b: &str, params: &ConsolidateParams) -> bool {
    if a == b || a.contains(b) || b.contains(a) {
        return true;
    }
    if token_overlap(a, b) > params.overlap_threshold {
        return true;
    }
    strsim::normalized_levenshtein(a, b) >= params.levenshtein_threshold
}

/// |shared distinct tokens| / |smaller phrase's distinct tokens|.
fn token_overlap(a: &str, b: &str) -> f64 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count() as f64;
    inter / ta.len().min(tb.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(text: &str, score: f64) -> CandidatePhrase {
        CandidatePhrase {
            text: text.to_string(),
            order: text.split_whitespace().count().min(3),
            score,
        }
    }

    #[test]
    fn near_miss_distinct_topics_are_both_kept() {
        let out = consolidate(
            vec![cand("ক্ষুদ্র নৃগোষ্ঠী", 0.9), cand("ক্ষুদ্র জাতিগোষ্ঠী", 0.8)],
            10,
        );
        // one shared token out of two (0.5) is under the 0.7 threshold
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn substring_duplicates_merge_to_one() {
        let out = consolidate(
            vec![cand("পদ্মা সেতু", 0.9), cand("পদ্মা সেতু উদ্বোধন", 0.85)],
            10,
        );
        assert_eq!(out.len(), 1);
        // longer challenger is competitive (0.85 >= 0.8*0.9) so it
        // becomes the representative, carrying the class top score
        assert_eq!(out[0].text, "পদ্মা সেতু উদ্বোধন");
        assert!((out[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn uncompetitive_longer_phrase_does_not_take_over() {
        let out = consolidate(
            vec![cand("পদ্মা সেতু", 0.9), cand("পদ্মা সেতু উদ্বোধন", 0.1)],
            10,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "পদ্মা সেতু");
    }

    #[test]
    fn high_token_overlap_merges() {
        // 3 shared of min(3,4) tokens ≈ 1.0 > 0.7
        let out = consolidate(
            vec![
                cand("ডেঙ্গু পরিস্থিতি অবনতি", 0.9),
                cand("ডেঙ্গু পরিস্থিতি চরম অবনতি", 0.8),
            ],
            10,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn person_marker_phrases_are_rejected() {
        let out = consolidate(
            vec![cand("জনাব রহিম উদ্দিন", 0.9), cand("বাজেট ঘাটতি", 0.5)],
            10,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "বাজেট ঘাটতি");
    }

    #[test]
    fn fragments_fillers_and_residues_are_rejected() {
        let out = consolidate(
            vec![
                cand("মন্ত্রী বলে জানিয়েছেন সূত্র", 0.9),
                cand("চলছে", 0.8),
                cand("এই দীর্ঘ বাক্যাংশটি ত্রিশ অক্ষরের সীমা ছাড়িয়ে গেছে বলে বাদ", 0.7),
                cand("ন", 0.6),
                cand("বিদ্যুৎ সংকট", 0.5),
            ],
            10,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "বিদ্যুৎ সংকট");
    }

    #[test]
    fn output_is_ranked_and_truncated() {
        let out = consolidate(
            vec![
                cand("গ্যাস সংকট", 0.3),
                cand("বন্যা পরিস্থিতি", 0.9),
                cand("তাপপ্রবাহ সতর্কতা", 0.6),
            ],
            2,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "বন্যা পরিস্থিতি");
        assert_eq!(out[1].text, "তাপপ্রবাহ সতর্কতা");
    }

    #[test]
    fn surviving_pairs_respect_the_overlap_rule() {
        let input = vec![
            cand("ডলার সংকট", 0.9),
            cand("ডলার সংকটে ব্যাংক", 0.85),
            cand("রিজার্ভ পরিস্থিতি", 0.8),
            cand("জ্বালানি তেলের দাম", 0.7),
            cand("তেলের দাম বৃদ্ধি", 0.65),
        ];
        let out = consolidate(input, 10);
        assert_eq!(out.len(), 4);
        for i in 0..out.len() {
            for j in (i + 1)..out.len() {
                assert!(
                    token_overlap(&out[i].text, &out[j].text) <= 0.7,
                    "surviving pair too similar: {} / {}",
                    out[i].text,
                    out[j].text
                );
                assert!(!out[i].text.contains(&out[j].text));
                assert!(!out[j].text.contains(&out[i].text));
            }
        }
    }
}

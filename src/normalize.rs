// src/normalize.rs
//! Text normalizer: Bengali-aware cleanup, sentence splitting and
//! tokenization. Every public function here is total — worst case it
//! degrades to naive whitespace splitting, never an error.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

use crate::stopwords::is_stopword;

/// Bengali sentence enders. A fixed set, not a generic boundary rule:
/// danda, double danda, question mark, exclamation.
const SENTENCE_ENDERS: [char; 4] = ['।', '॥', '?', '!'];

/// Clean raw headline text: decode entities, drop joiners, canonicalize
/// composed-equivalent signs, collapse terminator and whitespace runs.
pub fn clean(text: &str) -> String {
    // 1) HTML entity decode (feeds arrive with &amp; &quot; etc.)
    let mut out = html_escape::decode_html_entities(text).to_string();

    // 2) Strip zero-width joiners; they break token equality without
    //    changing what the reader sees.
    out = out.replace(['\u{200C}', '\u{200D}'], "");

    // 3) Canonicalize visually-equivalent sign sequences to their
    //    composed forms: e-kar + aa-kar -> o-kar, e-kar + au-length-mark
    //    -> au-kar, and the three nukta consonants.
    out = out
        .replace("\u{09C7}\u{09BE}", "\u{09CB}")
        .replace("\u{09C7}\u{09D7}", "\u{09CC}")
        .replace("\u{09A1}\u{09BC}", "\u{09DC}")
        .replace("\u{09A2}\u{09BC}", "\u{09DD}")
        .replace("\u{09AF}\u{09BC}", "\u{09DF}");

    // 4) Collapse runs of 3+ sentence terminators into a single danda.
    static RE_ENDERS: OnceCell<Regex> = OnceCell::new();
    let re_enders = RE_ENDERS.get_or_init(|| Regex::new(r"[।॥?!]{3,}").expect("ender regex"));
    out = re_enders.replace_all(&out, "।").to_string();

    // 5) Collapse whitespace.
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Split cleaned text into sentences on the fixed ender set.
/// Empty/whitespace-only fragments are dropped.
pub fn sentences(text: &str) -> Vec<String> {
    clean(text)
        .split(SENTENCE_ENDERS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenize one document, sentence by sentence. N-gram construction runs
/// per inner vec so phrases never bleed across a sentence boundary.
pub fn sentence_tokens(text: &str) -> Vec<Vec<String>> {
    let strict = catch_unwind(AssertUnwindSafe(|| {
        sentences(text)
            .iter()
            .map(|s| tokenize_sentence(s))
            .filter(|toks| !toks.is_empty())
            .collect::<Vec<_>>()
    }));
    match strict {
        Ok(v) => v,
        Err(_) => {
            warn!(len = text.len(), "strict tokenization failed, using whitespace fallback");
            let toks = fallback_tokenize(text);
            if toks.is_empty() {
                Vec::new()
            } else {
                vec![toks]
            }
        }
    }
}

/// Flat token sequence for one document.
pub fn tokenize(text: &str) -> Vec<String> {
    sentence_tokens(text).into_iter().flatten().collect()
}

/// Tokenize arbitrary bytes: lossy UTF-8 decode first, so garbage input
/// still yields a defined (possibly empty) token list.
pub fn tokenize_lossy(bytes: &[u8]) -> Vec<String> {
    tokenize(&String::from_utf8_lossy(bytes))
}

/// One sentence: strip characters outside the Bengali block (hyphen and
/// space survive as separators), split, keep real words.
fn tokenize_sentence(sentence: &str) -> Vec<String> {
    let kept: String = sentence
        .chars()
        .map(|c| {
            if ('\u{0980}'..='\u{09FF}').contains(&c) || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    kept.split_whitespace()
        .map(|t| t.trim_matches('-'))
        .filter(|t| t.chars().count() > 1 && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Last-resort tokenization: plain whitespace split, stopwords and
/// one-char tokens still removed so downstream invariants hold.
fn fallback_tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| t.chars().count() > 1 && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

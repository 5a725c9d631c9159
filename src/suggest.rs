// src/suggest.rs
//! LLM collaborator seam.
//!
//! The engine never calls a model itself — callers implement
//! `PhraseSuggester` (HTTP, cache, quotas all live on their side) and
//! the engine consumes the raw free-text reply through a fuzzy parser
//! with a best-effort contract: numbered and bulleted lines in ASCII or
//! Bengali digits, optional category headers, and markdown debris are
//! handled; anything unrecognizable degrades to zero phrases, never an
//! error.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Upper bound on tokens for a parsed phrase; longer lines are prose,
/// not candidate phrases.
const MAX_PHRASE_TOKENS: usize = 8;

/// Async provider of candidate phrases for one category.
#[async_trait]
pub trait PhraseSuggester: Send + Sync {
    /// Return the provider's raw reply for this category, or None when
    /// unavailable (quota, network, disabled).
    async fn suggest(&self, category_label: &str, headlines: &[String]) -> Option<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Shared trait object used by the engine.
pub type DynSuggester = Arc<dyn PhraseSuggester>;

/// Null object: suggestions disabled.
pub struct DisabledSuggester;

#[async_trait]
impl PhraseSuggester for DisabledSuggester {
    async fn suggest(&self, _category_label: &str, _headlines: &[String]) -> Option<String> {
        None
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

fn item_regex() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // "1. x", "২। x", "3) x", "- x", "* x", "• x"
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:[0-9০-৯]{1,3}\s*[.।):\-]|[-*•])\s+(?P<body>.+)$").expect("item regex")
    })
}

/// Parse a free-text reply into an ordered, deduplicated phrase list.
pub fn parse_reply(text: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = item_regex().captures(line) {
            items.push(caps["body"].to_string());
        }
    }

    // Single-line enumerations arrive without numbering; split on commas
    // only when the text has no list structure and no sentence enders.
    if items.is_empty() && !text.contains(['।', '?', '!']) && text.chars().count() <= 200 {
        items = text.split([',', ';']).map(str::to_string).collect();
    }

    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter_map(|raw| clean_phrase(raw))
        .filter(|p| seen.insert(p.to_lowercase()))
        .collect()
}

/// Parse a reply that may group items under category headers.
///
/// A header is a line containing one of `known_labels` and ending with a
/// colon or dash (markdown emphasis stripped). Items before any header
/// land under the empty key for the caller to attribute to its requested
/// category.
pub fn parse_reply_by_category(
    text: &str,
    known_labels: &[String],
) -> HashMap<String, Vec<String>> {
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    let mut current = String::new();

    for line in text.lines() {
        let stripped = line.trim().trim_matches(['*', '#', ' ']).trim();
        if let Some(label) = header_label(stripped, known_labels) {
            current = label;
            continue;
        }
        if let Some(caps) = item_regex().captures(line) {
            if let Some(p) = clean_phrase(&caps["body"]) {
                let bucket = out.entry(current.clone()).or_default();
                if !bucket.iter().any(|x| x.to_lowercase() == p.to_lowercase()) {
                    bucket.push(p);
                }
            }
        }
    }
    out
}

fn header_label(line: &str, known_labels: &[String]) -> Option<String> {
    let ends_like_header = line.ends_with([':', '—', 'ঃ']) || line.ends_with('-');
    for label in known_labels {
        if line == label || (ends_like_header && line.contains(label.as_str())) {
            return Some(label.clone());
        }
    }
    None
}

/// Strip markdown bold, quotes and trailing punctuation; reject empties
/// and prose-length lines.
fn clean_phrase(raw: &str) -> Option<String> {
    let mut s = raw.replace("**", "");
    // Quotes and punctuation interleave ("`"ডলার সংকট",`"), so strip
    // until stable.
    loop {
        let trimmed = s
            .trim()
            .trim_matches(['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'])
            .trim_end_matches(['.', ',', ';', ':', '!', '?', '।'])
            .trim();
        if trimmed == s {
            break;
        }
        s = trimmed.to_string();
    }
    if s.is_empty() {
        return None;
    }
    if s.split_whitespace().count() > MAX_PHRASE_TOKENS {
        return None;
    }
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_ascii_and_bengali_digits_parse() {
        let reply = "1. পদ্মা সেতু\n২। ডলার সংকট\n3) বন্যা পরিস্থিতি";
        assert_eq!(
            parse_reply(reply),
            vec!["পদ্মা সেতু", "ডলার সংকট", "বন্যা পরিস্থিতি"]
        );
    }

    #[test]
    fn bullets_and_markdown_debris_are_handled() {
        let reply = "- **পদ্মা সেতু**\n* \"ডলার সংকট\",\n• বন্যা পরিস্থিতি।";
        assert_eq!(
            parse_reply(reply),
            vec!["পদ্মা সেতু", "ডলার সংকট", "বন্যা পরিস্থিতি"]
        );
    }

    #[test]
    fn duplicates_collapse_preserving_order() {
        let reply = "1. ডলার সংকট\n2. ডলার সংকট\n3. বন্যা";
        assert_eq!(parse_reply(reply), vec!["ডলার সংকট", "বন্যা"]);
    }

    #[test]
    fn prose_lines_are_not_phrases() {
        let reply =
            "1. এই দীর্ঘ লাইনটি একটি সম্পূর্ণ বাক্য যা আটটির বেশি শব্দ ধারণ করে বলে বাদ যাবে\n2. বন্যা";
        assert_eq!(parse_reply(reply), vec!["বন্যা"]);
    }

    #[test]
    fn garbage_degrades_to_empty() {
        assert!(parse_reply("").is_empty());
        assert!(parse_reply("দুঃখিত, আমি এই অনুরোধটি প্রক্রিয়া করতে পারছি না।").is_empty());
    }

    #[test]
    fn single_line_enumeration_splits_on_commas() {
        let reply = "পদ্মা সেতু, ডলার সংকট, বন্যা পরিস্থিতি";
        assert_eq!(
            parse_reply(reply),
            vec!["পদ্মা সেতু", "ডলার সংকট", "বন্যা পরিস্থিতি"]
        );
    }

    #[test]
    fn category_headers_group_items() {
        let labels = vec!["খেলাধুলা".to_string(), "অর্থনীতি".to_string()];
        let reply = "**খেলাধুলা:**\n1. টাইগারদের জয়\n\nঅর্থনীতি:\n1. ডলার সংকট\n2. রিজার্ভ";
        let out = parse_reply_by_category(reply, &labels);
        assert_eq!(out["খেলাধুলা"], vec!["টাইগারদের জয়"]);
        assert_eq!(out["অর্থনীতি"], vec!["ডলার সংকট", "রিজার্ভ"]);
    }

    #[test]
    fn headerless_prefix_lands_under_empty_key() {
        let labels = vec!["খেলাধুলা".to_string()];
        let reply = "1. ডলার সংকট\nখেলাধুলা:\n1. টাইগারদের জয়";
        let out = parse_reply_by_category(reply, &labels);
        assert_eq!(out[""], vec!["ডলার সংকট"]);
        assert_eq!(out["খেলাধুলা"], vec!["টাইগারদের জয়"]);
    }

    #[test]
    fn malformed_headers_do_not_crash() {
        let labels = vec!["খেলাধুলা".to_string()];
        let out = parse_reply_by_category("###\n::\n---\n", &labels);
        assert!(out.is_empty());
    }
}

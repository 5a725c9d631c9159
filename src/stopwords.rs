// src/stopwords.rs
//! Bengali stopword set used by the tokenizer and the extractor.
//!
//! Functional words only: pronouns, particles, auxiliaries, common light
//! verbs and connectives. Content nouns never belong here — a stopword
//! can never become a trending phrase, so the list errs on the side of
//! leaving words in.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORD_LIST.iter().copied().collect());

/// True if `token` is a Bengali functional word.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Number of entries, exposed for sanity checks in tests.
pub fn len() -> usize {
    STOPWORDS.len()
}

#[rustfmt::skip]
const STOPWORD_LIST: &[&str] = &[
    "অতএব", "অথচ", "অথবা", "অনুযায়ী", "অনেক", "অনেকে", "অনেকেই", "অন্তত",
    "অন্য", "অবধি", "অবশ্য", "অর্থাত", "আই", "আগামী", "আগে", "আগেই",
    "আছে", "আজ", "আপনার", "আপনি", "আবার", "আমরা", "আমাকে", "আমাদের",
    "আমার", "আমি", "আর", "আরও", "ইত্যাদি", "ইহা", "উচিত", "উত্তর",
    "উনি", "উপর", "উপরে", "এঁদের", "এঁরা", "এই", "একই", "একটা",
    "একটি", "একবার", "একে", "এখন", "এখনও", "এখানে", "এখানেই", "এটা",
    "এটাই", "এটি", "এত", "এতটাই", "এতে", "এদের", "এব", "এবং",
    "এবার", "এমন", "এমনকী", "এমনি", "এর", "এরা", "এল", "এস",
    "এসে", "ওঁদের", "ওঁর", "ওঁরা", "ওই", "ওকে", "ওখানে", "ওদের",
    "ওর", "ওরা", "কখনও", "কত", "কবে", "কয়েক", "কয়েকটি", "করছে",
    "করছেন", "করতে", "করবে", "করবেন", "করলে", "করলেন", "করা", "করাই",
    "করায়", "করার", "করি", "করিতে", "করিয়া", "করিয়ে", "করে", "করেই",
    "করেছিলেন", "করেছে", "করেছেন", "করেন", "কাউকে", "কাছ", "কাছে", "কাজ",
    "কাজে", "কারও", "কারণ", "কিংবা", "কিছু", "কিছুই", "কিন্তু", "কেউ",
    "কেউই", "কেন", "কোটি", "কোন", "কোনও", "কোনো", "ক্ষেত্রে", "খুব",
    "গিয়ে", "গিয়েছে", "গুলি", "গেছে", "গেল", "গেলে", "গোটা", "চলে",
    "চান", "চায়", "চার", "চালু", "চেয়ে", "চেষ্টা", "ছাড়া", "ছাড়াও",
    "ছিল", "ছিলেন", "জন", "জনকে", "জনের", "জন্য", "জানতে", "জানা",
    "জানানো", "জানায়", "জানিয়ে", "জানিয়েছে", "টি", "ঠিক", "তখন", "তত",
    "তথা", "তবু", "তবে", "তা", "তাঁকে", "তাঁদের", "তাঁর", "তাঁরা",
    "তাই", "তাও", "তাকে", "তাতে", "তাদের", "তার", "তারপর", "তারা",
    "তাহলে", "তাহা", "তাহাতে", "তাহার", "তিনি", "তিনিও", "তুমি", "তুলে",
    "তেমন", "তো", "তোমার", "থাকবে", "থাকবেন", "থাকা", "থাকায়", "থাকে",
    "থাকেন", "থেকে", "থেকেই", "থেকেও", "দিকে", "দিতে", "দিন", "দিয়ে",
    "দিয়েছে", "দিয়েছেন", "দিলেন", "দু", "দুই", "দুটি", "দুটো", "দেওয়া",
    "দেওয়ার", "দেখতে", "দেখা", "দেখে", "দেন", "দেয়", "দ্বারা", "ধরা",
    "ধরে", "নতুন", "নয়", "না", "নাই", "নাকি", "নাগাদ", "নানা",
    "নিজে", "নিজেই", "নিজেদের", "নিজের", "নিতে", "নিয়ে", "নেই", "নেওয়া",
    "নেওয়ার", "পক্ষে", "পর", "পরে", "পরেই", "পরেও", "পর্যন্ত", "পাওয়া",
    "পারি", "পারে", "পারেন", "পেয়ে", "প্রতি", "প্রভৃতি", "প্রায়", "ফের",
    "বদলে", "বরং", "বলতে", "বলল", "বললেন", "বলা", "বলে", "বলেছেন",
    "বলেন", "বসে", "বহু", "বা", "বাদে", "বার", "বিনা", "বিভিন্ন",
    "বিশেষ", "বিষয়টি", "বেশ", "বেশি", "ব্যবহার", "ব্যাপারে", "ভাবে", "ভাবেই",
    "মতো", "মতোই", "মধ্যে", "মধ্যেই", "মধ্যেও", "মনে", "মাত্র", "মাধ্যমে",
    "মোট", "মোটেই", "যখন", "যত", "যতটা", "যথেষ্ট", "যদি", "যদিও",
    "যা", "যাঁর", "যাঁরা", "যাওয়া", "যাওয়ার", "যাকে", "যাচ্ছে", "যাতে",
    "যাদের", "যান", "যাবে", "যায়", "যার", "যারা", "যিনি", "যে",
    "যেখানে", "যেতে", "যেন", "যেমন", "রকম", "রয়েছে", "রাখা", "রেখে",
    "লক্ষ", "শুধু", "শুরু", "সঙ্গে", "সঙ্গেও", "সব", "সবার", "সমস্ত",
    "সম্প্রতি", "সহ", "সহিত", "সাধারণ", "সামনে", "সুতরাং", "সে", "সেই",
    "সেখান", "সেখানে", "সেটা", "সেটাই", "সেটাও", "সেটি", "স্পষ্ট", "স্বয়ং",
    "হইতে", "হইবে", "হইয়া", "হওয়া", "হওয়ায়", "হওয়ার", "হচ্ছে", "হত",
    "হতে", "হতেই", "হন", "হবে", "হবেন", "হয়", "হয়তো", "হয়নি",
    "হয়ে", "হয়েই", "হয়েছিল", "হয়েছে", "হয়েছেন", "হল", "হলে", "হলেই",
    "হলেও", "হলো", "হাজার", "হিসাবে", "হিসেবে", "হোক",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_particles_are_stopwords() {
        for w in ["এবং", "কিন্তু", "থেকে", "হয়েছে", "করেছে", "জন্য"] {
            assert!(is_stopword(w), "expected stopword: {w}");
        }
    }

    #[test]
    fn content_words_are_not_stopwords() {
        for w in ["সরকার", "নির্বাচন", "ক্রিকেট", "অর্থনীতি"] {
            assert!(!is_stopword(w), "unexpected stopword: {w}");
        }
    }

    #[test]
    fn list_is_multi_hundred_and_duplicate_free() {
        assert!(len() >= 300, "stopword set shrank to {}", len());
        // HashSet len == slice len implies no duplicate entries slipped in.
        assert_eq!(len(), STOPWORD_LIST.len());
    }
}

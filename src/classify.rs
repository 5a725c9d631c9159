// src/classify.rs
//! Category classifier: URL → category, total and deterministic.
//!
//! Priority order, first match wins:
//! 1. whole-URL special overrides (archive subdomain, bare homepage),
//! 2. per-category ordered path-fragment lists (Latin transliterations
//!    and native-script variants), matched case-insensitively against the
//!    percent-decoded path only,
//! 3. deterministic synthetic bucket keyed by (registrable domain, path
//!    shape) — nothing ever lands in a silent generic dump.
//!
//! Fragment lists must stay most-specific-first: fragments can be
//! ambiguous substrings of each other ("/sport" vs "/sports/cricket").

use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_CATEGORIES_CONFIG_PATH: &str = "config/categories.toml";
pub const ENV_CATEGORIES_CONFIG_PATH: &str = "TREND_CATEGORIES_PATH";

/// Label used as the prefix of every synthetic bucket.
pub const SYNTHETIC_PREFIX: &str = "অন্যান্য";

/// The fixed topical categories, in classification order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    National,
    International,
    Politics,
    Economy,
    Sports,
    Entertainment,
    Technology,
    Health,
    Education,
    Opinion,
}

impl Topic {
    pub const ALL: [Topic; 10] = [
        Topic::National,
        Topic::International,
        Topic::Politics,
        Topic::Economy,
        Topic::Sports,
        Topic::Entertainment,
        Topic::Technology,
        Topic::Health,
        Topic::Education,
        Topic::Opinion,
    ];

    /// Canonical Bengali label.
    pub fn label(&self) -> &'static str {
        match self {
            Topic::National => "জাতীয়",
            Topic::International => "আন্তর্জাতিক",
            Topic::Politics => "রাজনীতি",
            Topic::Economy => "অর্থনীতি",
            Topic::Sports => "খেলাধুলা",
            Topic::Entertainment => "বিনোদন",
            Topic::Technology => "প্রযুক্তি",
            Topic::Health => "স্বাস্থ্য",
            Topic::Education => "শিক্ষা",
            Topic::Opinion => "মতামত",
        }
    }

    /// Config key, e.g. `key = "sports"` in categories.toml.
    pub fn key(&self) -> &'static str {
        match self {
            Topic::National => "national",
            Topic::International => "international",
            Topic::Politics => "politics",
            Topic::Economy => "economy",
            Topic::Sports => "sports",
            Topic::Entertainment => "entertainment",
            Topic::Technology => "technology",
            Topic::Health => "health",
            Topic::Education => "education",
            Topic::Opinion => "opinion",
        }
    }

    fn from_key(key: &str) -> Option<Topic> {
        Topic::ALL.iter().copied().find(|t| t.key() == key)
    }
}

/// Deterministic shape of an unmatched URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlShape {
    /// A segment is all digits — almost certainly an article id.
    NumericArticle,
    /// A single alphabetic segment — a region/section listing.
    RegionListing,
    /// Empty path.
    BareIndex,
    Other,
}

impl UrlShape {
    fn key(&self) -> &'static str {
        match self {
            UrlShape::NumericArticle => "article",
            UrlShape::RegionListing => "region",
            UrlShape::BareIndex => "index",
            UrlShape::Other => "other",
        }
    }
}

/// Classification result. Every article gets exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Topic(Topic),
    /// Archive subdomain override.
    Archive,
    /// Bare homepage override.
    FrontPage,
    /// Unmatched URL, bucketed by (registrable domain, path shape).
    Synthetic { domain: String, shape: UrlShape },
}

impl Category {
    pub fn label(&self) -> String {
        match self {
            Category::Topic(t) => t.label().to_string(),
            Category::Archive => "আর্কাইভ".to_string(),
            Category::FrontPage => "প্রচ্ছদ".to_string(),
            Category::Synthetic { domain, shape } => {
                format!("{SYNTHETIC_PREFIX}:{domain}:{}", shape.key())
            }
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Category::Synthetic { .. })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Ordered category entries; declaration order is match order.
    #[serde(default)]
    pub categories: Vec<CategoryCfg>,
    /// Content keyword hints, used only for articles with no usable host.
    #[serde(default)]
    pub hints: Vec<HintCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCfg {
    /// One of the fixed topic keys ("sports", "economy", ...).
    pub key: String,
    /// Path fragments, most-specific-first.
    pub fragments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HintCfg {
    pub key: String,
    pub keywords: Vec<String>,
}

impl ClassifierConfig {
    /// Built-in pattern table covering the common Bangladeshi news-site
    /// URL conventions, both transliterated and native-script.
    pub fn default_seed() -> Self {
        fn cat(key: &str, fragments: &[&str]) -> CategoryCfg {
            CategoryCfg {
                key: key.to_string(),
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
            }
        }
        fn hint(key: &str, keywords: &[&str]) -> HintCfg {
            HintCfg {
                key: key.to_string(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
            }
        }
        Self {
            categories: vec![
                cat(
                    "sports",
                    &[
                        "/sports/cricket", "/sports/football", "/sports", "/sport", "/cricket",
                        "/football", "/khela", "/খেলাধুলা", "/খেলা",
                    ],
                ),
                cat(
                    "economy",
                    &[
                        "/business/economy", "/economics", "/economy", "/business", "/trade",
                        "/share-market", "/orthoniti", "/অর্থনীতি", "/বাণিজ্য",
                    ],
                ),
                cat(
                    "politics",
                    &["/politics", "/political", "/election", "/rajniti", "/রাজনীতি", "/নির্বাচন"],
                ),
                cat(
                    "international",
                    &["/international", "/world", "/abroad", "/bidesh", "/আন্তর্জাতিক", "/বিশ্ব"],
                ),
                cat(
                    "national",
                    &[
                        "/bangladesh/district", "/bangladesh", "/national", "/country", "/jatiya",
                        "/desh", "/বাংলাদেশ", "/জাতীয়",
                    ],
                ),
                cat(
                    "entertainment",
                    &[
                        "/entertainment", "/binodon", "/cinema", "/culture", "/বিনোদন",
                        "/সংস্কৃতি",
                    ],
                ),
                cat(
                    "technology",
                    &[
                        "/science-technology", "/technology", "/tech", "/science", "/projukti",
                        "/প্রযুক্তি", "/বিজ্ঞান",
                    ],
                ),
                cat("health", &["/health", "/coronavirus", "/shastho", "/স্বাস্থ্য"]),
                cat("education", &["/education", "/campus", "/shiksha", "/শিক্ষা"]),
                cat(
                    "opinion",
                    &["/opinion", "/editorial", "/op-ed", "/motamot", "/মতামত", "/সম্পাদকীয়"],
                ),
            ],
            hints: vec![
                hint("sports", &["ক্রিকেট", "ফুটবল", "টেস্ট", "উইকেট", "গোল"]),
                hint("economy", &["ব্যাংক", "শেয়ারবাজার", "রপ্তানি", "মূল্যস্ফীতি"]),
                hint("politics", &["নির্বাচন", "ভোট", "সংসদ"]),
            ],
        }
    }
}

/* ----------------------------
Compiled engine
---------------------------- */

#[derive(Debug)]
struct CompiledCategory {
    topic: Topic,
    /// Lowercased fragments, declaration order preserved.
    fragments: Vec<String>,
}

#[derive(Debug)]
struct CompiledHint {
    topic: Topic,
    keywords: Vec<String>,
}

/// Compiled classifier. Pure: `classify` has no side effects and is
/// idempotent over its inputs.
#[derive(Debug)]
pub struct Classifier {
    categories: Vec<CompiledCategory>,
    hints: Vec<CompiledHint>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(ClassifierConfig::default_seed())
            .expect("built-in category seed is valid")
    }
}

impl Classifier {
    pub fn from_config(cfg: ClassifierConfig) -> anyhow::Result<Self> {
        let categories = cfg
            .categories
            .iter()
            .map(|c| {
                let topic = Topic::from_key(&c.key)
                    .with_context(|| format!("unknown category key `{}`", c.key))?;
                Ok(CompiledCategory {
                    topic,
                    fragments: c.fragments.iter().map(|f| f.to_lowercase()).collect(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let hints = cfg
            .hints
            .iter()
            .map(|h| {
                let topic = Topic::from_key(&h.key)
                    .with_context(|| format!("unknown hint key `{}`", h.key))?;
                Ok(CompiledHint {
                    topic,
                    keywords: h.keywords.clone(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { categories, hints })
    }

    /// Load from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: ClassifierConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    /// Load from a TOML file. Uses TREND_CATEGORIES_PATH or the default
    /// path; a missing file falls back to the built-in seed.
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CATEGORIES_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATEGORIES_CONFIG_PATH));
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("bad categories config at {}", path.display())),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Map (url, title, content) to a category. Total: never fails,
    /// never returns a generic dump bucket.
    pub fn classify(&self, url: &str, title: &str, content: &str) -> Category {
        let parts = UrlParts::parse(url);
        let whole_lower = url.to_lowercase();

        // 1) Special overrides against the whole URL.
        if parts.host.starts_with("archive.") || parts.host.contains(".archive.") {
            return Category::Archive;
        }
        if !parts.host.is_empty() && parts.path_is_bare() && parts.query.is_empty() {
            return Category::FrontPage;
        }

        // 2) Ordered fragment lists against the decoded path only.
        let path_lower = parts.decoded_path.to_lowercase();
        for cat in &self.categories {
            for frag in &cat.fragments {
                if path_lower.contains(frag.as_str()) {
                    return Category::Topic(cat.topic);
                }
            }
        }

        // 3) No usable host: fall back to content keyword hints.
        if parts.host.is_empty() {
            let haystack = format!("{title} {content}");
            for hint in &self.hints {
                if hint.keywords.iter().any(|k| haystack.contains(k.as_str())) {
                    return Category::Topic(hint.topic);
                }
            }
        }

        // 4) Deterministic synthetic bucket.
        let domain = if parts.host.is_empty() {
            "unknown".to_string()
        } else {
            registrable_domain(&parts.host)
        };
        let shape = parts.shape();
        debug!(url = %whole_lower, domain = %domain, shape = ?shape, "classification miss, synthetic bucket");
        Category::Synthetic { domain, shape }
    }
}

/* ----------------------------
URL plumbing
---------------------------- */

/// Minimal URL decomposition; no external crate needed for host/path/query.
#[derive(Debug, Default)]
struct UrlParts {
    host: String,
    path: String,
    decoded_path: String,
    query: String,
}

impl UrlParts {
    fn parse(url: &str) -> Self {
        let rest = url
            .trim()
            .strip_prefix("https://")
            .or_else(|| url.trim().strip_prefix("http://"))
            .unwrap_or_else(|| url.trim());
        if rest.is_empty() {
            return Self::default();
        }
        let (host_port, tail) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        // A host must look like one: reject bare words with no dot.
        let host = host_port.split(':').next().unwrap_or("").to_lowercase();
        let host = if host.contains('.') { host } else { String::new() };
        let (path, query) = match tail.split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (tail.to_string(), String::new()),
        };
        let decoded_path = percent_decode(&path);
        Self {
            host,
            path,
            decoded_path,
            query,
        }
    }

    fn path_is_bare(&self) -> bool {
        self.path.is_empty() || self.path == "/"
    }

    fn segments(&self) -> Vec<&str> {
        self.decoded_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn shape(&self) -> UrlShape {
        let segs = self.segments();
        if segs.is_empty() {
            return UrlShape::BareIndex;
        }
        if segs
            .iter()
            .any(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        {
            return UrlShape::NumericArticle;
        }
        if segs.len() == 1 && segs[0].chars().all(|c| c.is_alphabetic() || c == '-') {
            return UrlShape::RegionListing;
        }
        UrlShape::Other
    }
}

/// Percent-decode a URL path (native-script fragments arrive encoded).
/// Invalid escapes pass through untouched; decoding is lossy on purpose.
fn percent_decode(path: &str) -> String {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Strip common mobile/language subdomains, then keep the registrable
/// suffix: three labels for country-code second-level domains (com.bd,
/// gov.bd, ...), two otherwise.
fn registrable_domain(host: &str) -> String {
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("en."))
        .or_else(|| host.strip_prefix("bangla."))
        .unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 3 {
        let second = labels[labels.len() - 2];
        let tld = labels[labels.len() - 1];
        if tld.len() == 2 && matches!(second, "com" | "net" | "org" | "gov" | "edu" | "co" | "ac") {
            return labels[labels.len() - 3..].join(".");
        }
    }
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

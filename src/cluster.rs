// src/cluster.rs
//! Phrase clusterer: thematic buckets over the consolidated phrase set.
//!
//! Vectors are TF-IDF fit on the phrase list itself (each phrase is a
//! document), partitioned with k-means under a fixed seed so two runs
//! over the same input agree. Clustering is enrichment, never a gate:
//! any degenerate input or internal failure collapses to one cluster
//! holding everything, and the output is always an exact partition —
//! every input phrase appears in exactly one cluster.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

use crate::article::{ConsolidatedPhrase, PhraseCluster};

/// Fixed seed: reruns over the same phrase list must partition alike.
const KMEANS_SEED: u64 = 0x5249_5445_4e44; // "TREND"

const MAX_ITERATIONS: usize = 100;

/// Partition `phrases` into at most `k` thematic buckets.
///
/// `k` is an upper bound, not a requirement: fewer phrases than `k`
/// yields singletons, and failures yield one catch-all cluster.
pub fn cluster_phrases(phrases: &[ConsolidatedPhrase], k: usize) -> Vec<PhraseCluster> {
    if phrases.is_empty() {
        return Vec::new();
    }
    if k == 0 {
        return vec![catch_all(phrases)];
    }
    if phrases.len() < k {
        return phrases
            .iter()
            .enumerate()
            .map(|(id, p)| PhraseCluster {
                id,
                phrases: vec![p.clone()],
            })
            .collect();
    }

    let attempt = catch_unwind(AssertUnwindSafe(|| kmeans_partition(phrases, k)));
    match attempt {
        Ok(Some(clusters)) => clusters,
        Ok(None) => vec![catch_all(phrases)],
        Err(_) => {
            warn!(n = phrases.len(), k, "clustering panicked, degrading to one cluster");
            vec![catch_all(phrases)]
        }
    }
}

fn catch_all(phrases: &[ConsolidatedPhrase]) -> PhraseCluster {
    PhraseCluster {
        id: 0,
        phrases: phrases.to_vec(),
    }
}

/// TF-IDF embedding + seeded k-means. Returns None on degenerate vector
/// spaces (e.g. every phrase vectorized to zero).
fn kmeans_partition(phrases: &[ConsolidatedPhrase], k: usize) -> Option<Vec<PhraseCluster>> {
    let vectors = embed(phrases)?;
    let n = vectors.len();
    let dim = vectors[0].len();

    // Farthest-point init: seeded first pick, then maximal-min-distance
    // picks. Spread-out seeds keep one theme from hogging two centroids.
    let mut rng = StdRng::seed_from_u64(KMEANS_SEED);
    let mut seed_idxs: Vec<usize> = vec![rng.random_range(0..n)];
    while seed_idxs.len() < k {
        let next = (0..n)
            .filter(|i| !seed_idxs.contains(i))
            .max_by(|&a, &b| {
                let da = min_dist_to(&vectors[a], &seed_idxs, &vectors);
                let db = min_dist_to(&vectors[b], &seed_idxs, &vectors);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("k <= n");
        seed_idxs.push(next);
    }
    let mut centroids: Vec<Vec<f64>> = seed_idxs.iter().map(|&i| vectors[i].clone()).collect();

    let mut assignment = vec![0usize; n];
    for _ in 0..MAX_ITERATIONS {
        // Assign each vector to its nearest centroid.
        let mut changed = false;
        for (i, v) in vectors.iter().enumerate() {
            let best = nearest_centroid(v, &centroids);
            if assignment[i] != best {
                assignment[i] = best;
                changed = true;
            }
        }

        // Empty-cluster repair: seize the point farthest from its
        // centroid so the partition keeps exactly k non-empty cells.
        for c in 0..k {
            if assignment.iter().any(|&a| a == c) {
                continue;
            }
            let farthest = (0..n)
                .max_by(|&a, &b| {
                    let da = distance_sq(&vectors[a], &centroids[assignment[a]]);
                    let db = distance_sq(&vectors[b], &centroids[assignment[b]]);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .expect("non-empty vector set");
            assignment[farthest] = c;
            changed = true;
        }

        if !changed {
            break;
        }

        // Recompute centroids as member means.
        let mut sums = vec![vec![0.0f64; dim]; k];
        let mut counts = vec![0usize; k];
        for (i, v) in vectors.iter().enumerate() {
            counts[assignment[i]] += 1;
            for (d, x) in v.iter().enumerate() {
                sums[assignment[i]][d] += x;
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                for d in 0..dim {
                    sums[c][d] /= counts[c] as f64;
                }
                centroids[c] = std::mem::take(&mut sums[c]);
            }
        }
    }

    // Materialize clusters in first-member order, ids renumbered.
    let mut by_cell: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &cell) in assignment.iter().enumerate() {
        by_cell[cell].push(i);
    }
    let mut cells: Vec<Vec<usize>> = by_cell.into_iter().filter(|c| !c.is_empty()).collect();
    cells.sort_by_key(|members| members[0]);

    Some(
        cells
            .into_iter()
            .enumerate()
            .map(|(id, members)| PhraseCluster {
                id,
                phrases: members.iter().map(|&i| phrases[i].clone()).collect(),
            })
            .collect(),
    )
}

/// Fit TF-IDF on the phrase list and return L2-normalized vectors.
/// None when the vocabulary is empty or all vectors are zero.
fn embed(phrases: &[ConsolidatedPhrase]) -> Option<Vec<Vec<f64>>> {
    let docs: Vec<Vec<&str>> = phrases
        .iter()
        .map(|p| p.text.split_whitespace().collect())
        .collect();

    let mut vocab: HashMap<&str, usize> = HashMap::new();
    let mut doc_freq: Vec<u64> = Vec::new();
    for doc in &docs {
        let mut seen: Vec<&str> = doc.clone();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            let next = vocab.len();
            let idx = *vocab.entry(term).or_insert(next);
            if idx == doc_freq.len() {
                doc_freq.push(0);
            }
            doc_freq[idx] += 1;
        }
    }
    if vocab.is_empty() {
        return None;
    }

    let n = docs.len() as f64;
    let dim = vocab.len();
    let mut vectors = Vec::with_capacity(docs.len());
    let mut any_nonzero = false;
    for doc in &docs {
        let mut v = vec![0.0f64; dim];
        for term in doc {
            let idx = vocab[term];
            let idf = ((n + 1.0) / (doc_freq[idx] as f64 + 1.0)).ln() + 1.0;
            v[idx] += idf;
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in v.iter_mut() {
                *x /= norm;
            }
            any_nonzero = true;
        }
        vectors.push(v);
    }
    any_nonzero.then_some(vectors)
}

fn min_dist_to(v: &[f64], chosen: &[usize], vectors: &[Vec<f64>]) -> f64 {
    chosen
        .iter()
        .map(|&i| distance_sq(v, &vectors[i]))
        .fold(f64::INFINITY, f64::min)
}

fn nearest_centroid(v: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = distance_sq(v, centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn distance_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(text: &str) -> ConsolidatedPhrase {
        ConsolidatedPhrase {
            text: text.to_string(),
            score: 1.0,
        }
    }

    fn total_members(clusters: &[PhraseCluster]) -> usize {
        clusters.iter().map(|c| c.phrases.len()).sum()
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        assert!(cluster_phrases(&[], 5).is_empty());
    }

    #[test]
    fn fewer_phrases_than_k_yields_singletons() {
        let phrases = vec![phrase("বন্যা পরিস্থিতি"), phrase("ডলার সংকট")];
        let clusters = cluster_phrases(&phrases, 5);
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.phrases.len() == 1));
    }

    #[test]
    fn partition_is_exact_cover() {
        let phrases = vec![
            phrase("বন্যা পরিস্থিতি অবনতি"),
            phrase("বন্যা দুর্গত এলাকা"),
            phrase("ডলার সংকট"),
            phrase("ডলারের দাম"),
            phrase("জাতীয় নির্বাচন"),
            phrase("নির্বাচন কমিশন"),
        ];
        let clusters = cluster_phrases(&phrases, 3);
        assert_eq!(total_members(&clusters), phrases.len());
        // no phrase appears twice
        let mut texts: Vec<&str> = clusters
            .iter()
            .flat_map(|c| c.phrases.iter().map(|p| p.text.as_str()))
            .collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), phrases.len());
    }

    #[test]
    fn clustering_is_deterministic() {
        let phrases: Vec<ConsolidatedPhrase> = (0..12)
            .map(|i| phrase(&format!("বিষয়{i} শব্দ{}", i % 4)))
            .collect();
        let a = cluster_phrases(&phrases, 4);
        let b = cluster_phrases(&phrases, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn related_phrases_land_together() {
        let phrases = vec![
            phrase("বন্যা পরিস্থিতি অবনতি"),
            phrase("বন্যা পরিস্থিতি উন্নতি"),
            phrase("ক্রিকেট দল জয়"),
            phrase("ক্রিকেট সিরিজ জয়"),
        ];
        let clusters = cluster_phrases(&phrases, 2);
        assert_eq!(clusters.len(), 2);
        for c in &clusters {
            let flood = c.phrases.iter().filter(|p| p.text.contains("বন্যা")).count();
            assert!(flood == 0 || flood == c.phrases.len(), "mixed cluster: {c:?}");
        }
    }

    #[test]
    fn k_zero_degrades_to_single_cluster() {
        let phrases = vec![phrase("বন্যা"), phrase("ডলার")];
        let clusters = cluster_phrases(&phrases, 0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(total_members(&clusters), 2);
    }
}

// tests/consolidate_dedup.rs
use shironam_trend_analyzer::{consolidate, CandidatePhrase};

fn cand(text: &str, score: f64) -> CandidatePhrase {
    CandidatePhrase {
        text: text.to_string(),
        order: text.split_whitespace().count().min(3),
        score,
    }
}

#[test]
fn near_duplicate_topics_survive_side_by_side() {
    // Single-token overlap out of two (0.5) is below the 0.7 threshold:
    // distinct small-group topics must not merge.
    let out = consolidate(
        vec![cand("ক্ষুদ্র নৃগোষ্ঠী", 0.9), cand("ক্ষুদ্র জাতিগোষ্ঠী", 0.8)],
        10,
    );
    let texts: Vec<&str> = out.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["ক্ষুদ্র নৃগোষ্ঠী", "ক্ষুদ্র জাতিগোষ্ঠী"]);
}

#[test]
fn x_and_x_plus_y_do_not_both_surface() {
    let out = consolidate(
        vec![cand("পদ্মা সেতু", 1.0), cand("পদ্মা সেতু উদ্বোধন", 0.9)],
        10,
    );
    assert_eq!(out.len(), 1);
}

#[test]
fn output_is_a_subset_of_input_by_text() {
    let input = vec![
        cand("বন্যা পরিস্থিতি", 0.9),
        cand("ডলার সংকট", 0.8),
        cand("গ্যাস সরবরাহ", 0.7),
    ];
    let input_texts: Vec<String> = input.iter().map(|p| p.text.clone()).collect();
    let out = consolidate(input, 10);
    assert!(out.iter().all(|p| input_texts.contains(&p.text)));
}

#[test]
fn max_results_bounds_the_output() {
    let input: Vec<CandidatePhrase> = (0..20)
        .map(|i| cand(&format!("বিষয়{i} প্রসঙ্গ{i}"), 1.0 - i as f64 * 0.01))
        .collect();
    let out = consolidate(input, 5);
    assert!(out.len() <= 5);
}

#[test]
fn empty_input_is_fine() {
    assert!(consolidate(Vec::new(), 10).is_empty());
}

#[test]
fn representative_carries_class_top_score() {
    let out = consolidate(
        vec![cand("নির্বাচন কমিশন", 0.95), cand("নির্বাচন কমিশন তফসিল", 0.9)],
        10,
    );
    assert_eq!(out.len(), 1);
    assert!((out[0].score - 0.95).abs() < 1e-9);
    // longer phrasing is competitive (0.9 >= 0.8 * 0.95), so it represents
    assert_eq!(out[0].text, "নির্বাচন কমিশন তফসিল");
}

// tests/suggest_malformed.rs
//! The reply parser's best-effort contract, exercised against known
//! malformed provider outputs. Degrading to zero phrases is correct;
//! raising is not an option.

use shironam_trend_analyzer::{parse_reply, parse_reply_by_category};

#[test]
fn well_formed_numbered_reply() {
    let reply = "আজকের প্রবণতা:\n1. পদ্মা সেতু\n2. ডলার সংকট\n3. নির্বাচন কমিশন";
    assert_eq!(
        parse_reply(reply),
        vec!["পদ্মা সেতু", "ডলার সংকট", "নির্বাচন কমিশন"]
    );
}

#[test]
fn refusal_prose_yields_nothing() {
    let reply = "দুঃখিত, এই শিরোনামগুলো থেকে কোনো প্রবণতা শনাক্ত করা সম্ভব হয়নি।";
    assert!(parse_reply(reply).is_empty());
}

#[test]
fn mixed_numbering_styles_in_one_reply() {
    let reply = "১। বন্যা পরিস্থিতি\n2) ডলার সংকট\n- তাপপ্রবাহ";
    assert_eq!(
        parse_reply(reply),
        vec!["বন্যা পরিস্থিতি", "ডলার সংকট", "তাপপ্রবাহ"]
    );
}

#[test]
fn truncated_reply_keeps_complete_items() {
    // Provider cut off mid-line: the dangling fragment still parses as
    // an item; only structurally broken lines are dropped.
    let reply = "1. পদ্মা সেতু\n2. ডলার সং";
    let got = parse_reply(reply);
    assert_eq!(got[0], "পদ্মা সেতু");
    assert!(got.len() <= 2);
}

#[test]
fn repeated_and_empty_items_are_collapsed() {
    let reply = "1. \n2. বন্যা\n3.   \n4. বন্যা\n5. বন্যা।";
    assert_eq!(parse_reply(reply), vec!["বন্যা"]);
}

#[test]
fn json_shaped_garbage_is_tolerated() {
    let reply = r#"{"phrases": ["পদ্মা সেতু", "ডলার সংকট"]}"#;
    // No list structure the grammar recognizes — empty is acceptable,
    // raising is not.
    let _ = parse_reply(reply);
}

#[test]
fn category_attribution_survives_noise_lines() {
    let labels = vec!["খেলাধুলা".to_string(), "অর্থনীতি".to_string()];
    let reply = "এখানে ফলাফল:\n\nখেলাধুলা:\nকিছু ভূমিকা লেখা\n1. টাইগারদের জয়\n\nঅর্থনীতি —\n1. ডলার সংকট";
    let out = parse_reply_by_category(reply, &labels);
    assert_eq!(out["খেলাধুলা"], vec!["টাইগারদের জয়"]);
    assert_eq!(out["অর্থনীতি"], vec!["ডলার সংকট"]);
}

#[test]
fn unknown_headers_do_not_steal_items() {
    let labels = vec!["খেলাধুলা".to_string()];
    let reply = "আবহাওয়া:\n1. তাপপ্রবাহ\nখেলাধুলা:\n1. টাইগারদের জয়";
    let out = parse_reply_by_category(reply, &labels);
    // items under the unknown header stay attributed to the headerless
    // prefix bucket
    assert_eq!(out[""], vec!["তাপপ্রবাহ"]);
    assert_eq!(out["খেলাধুলা"], vec!["টাইগারদের জয়"]);
}

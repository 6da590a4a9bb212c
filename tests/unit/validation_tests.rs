/*!
 * Tests for anomaly classification, placeholder checks and reports
 */

use std::str::FromStr;

use dialoc::database::DialogueRecord;
use dialoc::validation::anomalies::{is_dlc, is_punctuation_mismatch, is_technical};
use dialoc::validation::{classify, AnomalyReport, AnomalyTag, PlaceholderValidator};

fn record(id: i64, source: &str, dest: Option<&str>) -> DialogueRecord {
    DialogueRecord {
        id,
        string_key: format!("{:06}", id),
        edid: None,
        source: source.to_string(),
        masked_source: None,
        dest: dest.map(String::from),
    }
}

#[test]
fn test_classify_withEmptyTranslation_shouldBeMissing() {
    let tags = classify("Hello there.", Some(""));
    assert!(tags.contains(AnomalyTag::Missing));
    assert_eq!(tags.len(), 1);
}

#[test]
fn test_classify_withCopiedSource_shouldBeSameNotPunctuation() {
    let tags = classify("<Alias=Player>", Some("<Alias=Player>"));
    assert!(tags.contains(AnomalyTag::Same));
    assert!(!tags.contains(AnomalyTag::Punctuation));
}

#[test]
fn test_classify_withLostQuotes_shouldBePunctuation() {
    let tags = classify(r#"He said "run"."#, Some("Il a dit « cours »."));
    assert!(tags.contains(AnomalyTag::Punctuation));
}

#[test]
fn test_classify_withDlcIdentifier_shouldCombineTags() {
    let tags = classify("DLC2_MQ01", None);
    assert_eq!(tags.to_string(), "MISSING,DLC,TECHNICAL");
}

#[test]
fn test_predicates_withEdgeCases() {
    assert!(is_dlc("dlc01 quest"));
    assert!(is_dlc("DLCTitle"));
    assert!(!is_dlc("Dawnguard"));

    assert!(is_technical("FemaleHeadWoodElf"));
    assert!(is_technical("Quest_stage"));
    assert!(!is_technical("Hello"));
    assert!(!is_technical("Two Words1"));

    assert!(!is_punctuation_mismatch("<b>", ""));
    assert!(is_punctuation_mismatch("<b>", "b"));
}

#[test]
fn test_anomalyTag_fromStr_shouldAcceptAnyCase() {
    assert_eq!(AnomalyTag::from_str("technical").unwrap(), AnomalyTag::Technical);
    assert!(AnomalyTag::from_str("LENGTH").is_err());
}

#[test]
fn test_placeholderValidator_shouldReportLostAndInventedTokens() {
    let result = PlaceholderValidator::validate(
        "[Npc_a1] meets [Npc_a1] in [Location_b2]",
        "[Npc_a1] rencontre [Npc_c3]",
    );

    assert!(!result.passed());
    assert_eq!(result.missing, vec!["[Location_b2]", "[Npc_a1]"]);
    assert_eq!(result.unexpected, vec!["[Npc_c3]"]);
}

#[test]
fn test_anomalyReport_shouldCountAndRender() {
    let records = vec![
        record(1, "Hello.", Some("Bonjour.")),
        record(2, "Hello.", None),
        record(3, "Ok", Some("Ok")),
        record(4, "DLC1Intro", Some("Intro")),
    ];

    let report = AnomalyReport::build(&records);

    assert_eq!(report.total_records, 4);
    assert_eq!(report.clean_count(), 1);
    assert_eq!(report.count(AnomalyTag::Missing), 1);
    assert_eq!(report.count(AnomalyTag::Same), 1);
    assert_eq!(report.count(AnomalyTag::Dlc), 1);
    assert_eq!(report.count(AnomalyTag::Punctuation), 0);

    let text = report.to_string();
    assert!(text.starts_with("Records: 4, flagged: 3, clean: 1"));
    assert!(text.contains("<none>"));

    let json: serde_json::Value = serde_json::from_str(&report.filter(AnomalyTag::Same).to_json().unwrap()).unwrap();
    assert_eq!(json["flagged"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["counts"]["SAME"], 1);
}

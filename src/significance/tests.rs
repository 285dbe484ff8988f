// Scenario tests for the paired comparisons
//
// Datasets mirror the shape of the study's rate files: one row per question,
// `{model}_cwe_loc_{b|s}` columns for template comparisons and unsuffixed
// `{model}_cwe_loc` columns for model comparisons.

use super::*;
use crate::table::Table;
use std::path::Path;

/// Differences with a known exact result: W = 24, p = 0.041259765625
const REFERENCE: [f64; 15] = [
    6.0, 8.0, 14.0, 16.0, 23.0, 24.0, 28.0, 29.0, 41.0, -48.0, 49.0, 56.0, 60.0, -67.0, 75.0,
];

fn parse(text: &str) -> Table {
    Table::from_reader(text.as_bytes(), Path::new("inline.csv")).unwrap()
}

fn csv(headers: &[&str], rows: &[Vec<String>]) -> Table {
    let mut text = headers.join(",");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    parse(&text)
}

fn tested(report: &SignificanceReport, subject: &str) -> EffectSizeResult {
    match report.get(subject) {
        Some(SubjectOutcome::Tested(result)) => result.clone(),
        other => panic!("{} was not tested: {:?}", subject, other),
    }
}

/// gpt: reference differences (plus one incomplete row)
/// gemini: identical templates
/// deepseek: secure column missing
fn cross_template_dataset() -> Table {
    let mut rows: Vec<Vec<String>> = REFERENCE
        .iter()
        .map(|d| {
            vec![
                d.to_string(),
                "0".to_string(),
                "0.5".to_string(),
                "0.5".to_string(),
                "0.1".to_string(),
            ]
        })
        .collect();
    rows.push(vec![
        "3".to_string(),
        String::new(),
        "0.5".to_string(),
        "0.5".to_string(),
        "0.1".to_string(),
    ]);
    csv(
        &[
            "gpt_cwe_loc_b",
            "gpt_cwe_loc_s",
            "gemini_cwe_loc_b",
            "gemini_cwe_loc_s",
            "deepseek_cwe_loc_b",
        ],
        &rows,
    )
}

fn cross_model_dataset() -> Table {
    let rows: Vec<Vec<String>> = REFERENCE
        .iter()
        .map(|d| vec![d.to_string(), "0".to_string(), d.to_string()])
        .collect();
    csv(&["gpt_cwe_loc", "gemini_cwe_loc", "deepseek_cwe_loc"], &rows)
}

#[test]
fn test_cross_template_reference_result() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::default());
    assert_eq!(report.mode, ComparisonMode::CrossTemplate);

    let gpt = tested(&report, "gpt");
    assert_eq!(gpt.statistic, 24.0);
    assert!((gpt.p_value - 0.041259765625).abs() < 1e-12);
    assert!(gpt.significant);
    assert!((gpt.effect_r - 0.527_929_614_076_871_8).abs() < 1e-9);
    assert_eq!(gpt.effect_label, EffectMagnitude::Large);
}

#[test]
fn test_cross_template_drops_incomplete_rows() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::default());
    let gpt = tested(&report, "gpt");
    // 16 rows, one with a missing secure value
    assert_eq!(gpt.n_pairs, 15);
    assert_eq!(gpt.n_nonzero, 15);
}

#[test]
fn test_identical_samples_fail_without_aborting() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::default());
    assert!(matches!(
        report.get("gemini"),
        Some(SubjectOutcome::Failed { .. })
    ));
    // The subjects after the failure were still evaluated
    assert_eq!(report.subjects.len(), 4);
}

#[test]
fn test_missing_columns_skip_subject() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::default());
    match report.get("deepseek") {
        Some(SubjectOutcome::Skipped { reason }) => {
            assert!(reason.contains("deepseek_cwe_loc_s"), "reason={}", reason);
        }
        other => panic!("expected skip, got {:?}", other),
    }
    assert!(matches!(
        report.get("codellama"),
        Some(SubjectOutcome::Skipped { .. })
    ));
    assert_eq!(report.tested_count(), 1);
}

#[test]
fn test_alpha_controls_significance() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::strict());
    let gpt = tested(&report, "gpt");
    assert!(!gpt.significant);
    assert_eq!(report.alpha, 0.01);
}

#[test]
fn test_custom_field() {
    let table = parse("gpt_loc_b,gpt_loc_s\n10,8\n12,9\n30,20\n15,16\n");
    let config = SignificanceConfig {
        field: "loc".to_string(),
        ..SignificanceConfig::default()
    };
    let report = wilcoxon_cross_template(&table, &config);
    let gpt = tested(&report, "gpt");
    // Differences 2, 3, 10, -1: R- = 1
    assert_eq!(gpt.statistic, 1.0);
    assert_eq!(gpt.p_value, 0.25);
}

#[test]
fn test_non_numeric_cells_are_dropped() {
    let table = parse("gpt_cwe_loc_b,gpt_cwe_loc_s\n1,0\nn/a,0\n2,0\n3,0\n");
    let report = wilcoxon_cross_template(&table, &SignificanceConfig::default());
    let gpt = tested(&report, "gpt");
    assert_eq!(gpt.n_pairs, 3);
    assert_eq!(gpt.statistic, 0.0);
    assert_eq!(gpt.p_value, 0.25);
}

#[test]
fn test_empty_sample_is_a_failure() {
    let table = parse("gpt_cwe_loc_b,gpt_cwe_loc_s\n1,\n,2\n");
    let report = wilcoxon_cross_template(&table, &SignificanceConfig::default());
    assert!(matches!(
        report.get("gpt"),
        Some(SubjectOutcome::Failed { .. })
    ));
}

#[test]
fn test_cross_model_pairs_in_order() {
    let report = wilcoxon_cross_model(&cross_model_dataset(), &SignificanceConfig::default());
    assert_eq!(report.mode, ComparisonMode::CrossModel);
    let subjects: Vec<&str> = report.subjects.iter().map(|s| s.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec!["gpt vs gemini", "gpt vs deepseek", "gemini vs deepseek"]
    );
}

#[test]
fn test_cross_model_effect_from_p_value() {
    let report = wilcoxon_cross_model(&cross_model_dataset(), &SignificanceConfig::default());

    let first = tested(&report, "gpt vs gemini");
    assert!((first.p_value - 0.041259765625).abs() < 1e-12);
    assert!((first.effect_r - 0.526_960_716_945_799_2).abs() < 1e-6);
    assert_eq!(first.effect_label, EffectMagnitude::Large);

    // Same magnitudes with the opposite sign
    let third = tested(&report, "gemini vs deepseek");
    assert_eq!(third.statistic, first.statistic);
    assert_eq!(third.p_value, first.p_value);

    // gpt and deepseek carry the same values
    assert!(matches!(
        report.get("gpt vs deepseek"),
        Some(SubjectOutcome::Failed { .. })
    ));
}

#[test]
fn test_cross_model_missing_model_is_skipped() {
    let table = parse("gpt_cwe_loc,gemini_cwe_loc\n1,0\n2,0\n3,0\n");
    let report = wilcoxon_cross_model(&table, &SignificanceConfig::default());
    assert_eq!(report.tested_count(), 1);
    assert!(matches!(
        report.get("gemini vs deepseek"),
        Some(SubjectOutcome::Skipped { .. })
    ));
}

#[test]
fn test_report_string_layout() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::default());
    let text = report.to_report_string();
    assert!(text.starts_with(
        "\nLLM: gpt\n - Wilcoxon statistic: 24.0\n - p-value: 0.041260\n \
         - Statistically significant: ✅\n - Effect size r: 0.5279 (large)\n"
    ));
    assert!(text.contains("\nLLM: gemini - Error: "));
    assert!(text.contains("\nLLM: deepseek - Skipped: missing columns: deepseek_cwe_loc_s\n"));
}

#[test]
fn test_complete_pairs() {
    let x = [Some(1.0), None, Some(3.0), Some(4.0)];
    let y = [Some(2.0), Some(5.0), None, Some(0.0)];
    assert_eq!(complete_pairs(&x, &y), (vec![1.0, 4.0], vec![2.0, 0.0]));
}

#[test]
fn test_report_serializes_outcomes() {
    let report = wilcoxon_cross_template(&cross_template_dataset(), &SignificanceConfig::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "cross-template");
    assert_eq!(json["subjects"][0]["outcome"]["status"], "tested");
    assert_eq!(json["subjects"][0]["outcome"]["effect_label"], "large");
    assert_eq!(json["subjects"][2]["outcome"]["status"], "skipped");
}

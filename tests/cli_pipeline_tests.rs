//! Integration tests for the vulnstat binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use utils::{write_csv, PAIRED_DATASET, SINGLE_DATASET};

fn vulnstat() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("vulnstat")
}

#[test]
fn test_ratio_mean_improvement_pipeline() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "Baseline - CWE-259.csv", PAIRED_DATASET);
    let rates = dir.path().join("Baseline - CWE-259 - Rate.csv");
    let means = dir.path().join("Baseline - CWE-259 - Mean.csv");

    vulnstat().arg("ratios").arg(&dataset).arg(&rates).assert().success();
    let rate_text = fs::read_to_string(&rates).unwrap();
    assert!(rate_text.starts_with("gpt_cwe_loc_b,gpt_cwe_loc_s\n0.04,0.01\n"));
    assert!(!rate_text.contains("question"));

    vulnstat().arg("mean").arg(&rates).arg(&means).assert().success();
    assert_eq!(
        fs::read_to_string(&means).unwrap(),
        ",Mean\ngpt_cwe_loc_b,0.04\ngpt_cwe_loc_s,0.01\n"
    );

    vulnstat()
        .arg("improvement")
        .arg(&means)
        .assert()
        .success()
        .stdout("GPT Improvement: 75.00%\nGemini Improvement: 0.00%\nDeepseek Improvement: 0.00%\n");
}

#[test]
fn test_single_template_ratios() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "CWE-259.csv", SINGLE_DATASET);
    let rates = dir.path().join("CWE-259 - Rate.csv");

    vulnstat()
        .args(["ratios", "--single"])
        .arg(&dataset)
        .arg(&rates)
        .assert()
        .success();

    let header = fs::read_to_string(&rates).unwrap();
    assert!(header.starts_with("gpt_cwe_loc,gemini_cwe_loc,deepseek_cwe_loc\n"));
}

#[test]
fn test_cross_template_report() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "paired.csv", PAIRED_DATASET);
    let rates = dir.path().join("rates.csv");
    vulnstat().arg("ratios").arg(&dataset).arg(&rates).assert().success();

    vulnstat()
        .arg("cross-template")
        .arg(&rates)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\nLLM: gpt\n - Wilcoxon statistic: 0.0\n - p-value: 0.025347\n \
             - Statistically significant: ✅\n - Effect size r: 0.9045 (large)\n",
        ))
        .stdout(predicate::str::contains("LLM: gemini - Skipped: missing columns"));
}

#[test]
fn test_cross_template_strict_alpha() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "paired.csv", PAIRED_DATASET);
    let rates = dir.path().join("rates.csv");
    vulnstat().arg("ratios").arg(&dataset).arg(&rates).assert().success();

    vulnstat()
        .arg("cross-template")
        .arg(&rates)
        .args(["--alpha", "0.01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Statistically significant: ❌"));
}

#[test]
fn test_cross_template_invalid_alpha() {
    let dir = TempDir::new().unwrap();
    let rates = write_csv(dir.path(), "rates.csv", "gpt_cwe_loc_b,gpt_cwe_loc_s\n1,0\n");

    vulnstat()
        .arg("cross-template")
        .arg(&rates)
        .args(["--alpha", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("alpha must be in (0, 1)"));
}

#[test]
fn test_cross_model_json() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "CWE-259.csv", SINGLE_DATASET);
    let rates = dir.path().join("CWE-259 - Rate.csv");
    vulnstat()
        .args(["ratios", "--single"])
        .arg(&dataset)
        .arg(&rates)
        .assert()
        .success();

    let output = vulnstat()
        .args(["--format", "json", "cross-model"])
        .arg(&rates)
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["mode"], "cross-model");
    let subjects = parsed["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 3);
    assert_eq!(subjects[0]["subject"], "gpt vs gemini");
    assert_eq!(subjects[2]["subject"], "gemini vs deepseek");
}

#[test]
fn test_cwe_count_selected() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "Baseline.csv", "gpt_cwe_id\n259 295\n0\n259\n");

    vulnstat()
        .arg("cwe-count")
        .arg(&dataset)
        .assert()
        .success()
        .stdout(predicate::str::contains("Column: gpt_cwe_id\n259: 2\n295: 1\n327: 0\n"))
        .stdout(predicate::str::contains("Others: 0\n"))
        .stdout(predicate::str::contains("Total CWE per column gpt_cwe_id: 3\n"));
}

#[test]
fn test_cwe_count_all() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "Baseline.csv", "gpt_cwe_id\n259 295\n0\n259\n");

    vulnstat()
        .args(["cwe-count", "--mode", "all"])
        .arg(&dataset)
        .assert()
        .success()
        .stdout(predicate::str::contains("259: 2\n295: 1\n"))
        .stdout(predicate::str::contains("CWE ordered by ID: [259, 295]"))
        .stdout(predicate::str::contains("Total CWE types: 2"));
}

#[test]
fn test_cwe_frequent_top() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "CWE-ALL.csv", SINGLE_DATASET);

    vulnstat()
        .arg("cwe-frequent")
        .arg(&dataset)
        .args(["--columns", "cwe_id_s", "--top", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ordered list of the most frequent CWE:"))
        .stdout(predicate::str::contains("Top 2 CWE: CWE-259, CWE-798"));
}

#[test]
fn test_normality_output() {
    let dir = TempDir::new().unwrap();
    let rates = write_csv(dir.path(), "rates.csv", "gpt_cwe_loc\n0.1\n0.2\n");

    vulnstat()
        .arg("normality")
        .arg(&rates)
        .assert()
        .success()
        .stdout("{'gpt_cwe_loc': 'Unable to process'}\n");
}

#[test]
fn test_missing_input_fails() {
    vulnstat()
        .args(["normality", "/nonexistent/rates.csv"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_empty_input_fails() {
    let dir = TempDir::new().unwrap();
    let empty = write_csv(dir.path(), "empty.csv", "");

    vulnstat()
        .arg("mean")
        .arg(&empty)
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_debug_logs_to_stderr() {
    let dir = TempDir::new().unwrap();
    let dataset = write_csv(dir.path(), "paired.csv", PAIRED_DATASET);

    vulnstat()
        .arg("--debug")
        .arg("ratios")
        .arg(&dataset)
        .arg(dir.path().join("rates.csv"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ratio columns"));
}

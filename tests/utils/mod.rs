// Shared fixtures for integration tests
//
// Writes small experiment folders in the same shape the analysis expects:
// paired `{model}_{metric}_{b|s}` datasets and single-template datasets.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write `content` to `dir/name` and return the path
pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// GPT improves from 0.04 to 0.01 CWE/LOC on every question
pub const PAIRED_DATASET: &str = "\
question,gpt_cwe_count_b,gpt_loc_b,gpt_cwe_id_b,gpt_cwe_count_s,gpt_loc_s,gpt_cwe_id_s
q1,4,100,259 295,1,100,259
q2,4,100,259,1,100,0
q3,4,100,798,1,100,295
q4,4,100,259,1,100,0
q5,4,100,0,1,100,327
";

/// Three models, one template, varied densities
pub const SINGLE_DATASET: &str = "\
question,gpt_cwe_count_s,gpt_loc_s,gpt_cwe_id_s,gemini_cwe_count_s,gemini_loc_s,gemini_cwe_id_s,deepseek_cwe_count_s,deepseek_loc_s,deepseek_cwe_id_s
q1,1,50,259,3,40,259 798,0,60,0
q2,2,80,295 327,1,90,0,1,70,477
q3,0,30,0,2,20,259 259,2,45,798 259
q4,3,60,259 397 798,4,55,327,1,25,0
q5,1,10,477,0,35,0,3,65,295 295 259
q6,2,40,259 259,5,50,798,0,30,0
";

/// Baseline prompts alone
pub const BASELINE_DATASET: &str = "\
question,gpt_cwe_id,gemini_cwe_id
q1,259 295,0
q2,0,798
q3,259,259 1004
";

/// Lay out one CWE category (paired and single datasets) plus `Baseline.csv`
pub fn experiment_folder(dir: &Path, cwe: u16) {
    write_csv(dir, "Baseline.csv", BASELINE_DATASET);
    write_csv(dir, &format!("Baseline - CWE-{}.csv", cwe), PAIRED_DATASET);
    write_csv(dir, &format!("CWE-{}.csv", cwe), SINGLE_DATASET);
}

// Normality gate for the numeric columns of a dataset
//
// Every count/ratio column is checked with Shapiro-Wilk before choosing a
// test. The study's columns are overwhelmingly non-normal (zero-inflated
// defect densities), which is why the paired comparisons use the Wilcoxon
// signed-rank test rather than a paired t-test.

mod gate;
mod shapiro;

pub use gate::{
    check_normality, check_normality_file, NormalityReport, NormalityVerdict, NORMALITY_ALPHA,
    NORMALITY_KEYWORDS,
};
pub use shapiro::{shapiro_wilk, ShapiroResult, MAX_CALIBRATED_N};

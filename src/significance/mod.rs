// Paired significance testing between prompt templates and between models
//
// Two comparisons are run over the per-question samples of the study:
// - cross-template: a model's baseline prompt against its secure prompt
// - cross-model: one model's defect density against another's
//
// Both use the Wilcoxon signed-rank test, chosen because the normality gate
// rejects normality for almost every column. Effect sizes are banded into
// negligible/small/medium/large; the two modes derive r differently.
//
// References:
// [1] Wilcoxon, F. (1945). Individual comparisons by ranking methods.
//     Biometrics Bulletin, 1(6), 80-83.
// [2] Rosenthal, R. (1991). Meta-analytic procedures for social research.
//     r = z / sqrt(N) as the effect size of a rank test.

mod config;
mod effect_size;
mod tester;
mod wilcoxon;

pub use config::{SignificanceConfig, DEFAULT_EXACT_MAX_N};
pub use effect_size::{effect_size_from_p_value, effect_size_from_statistic, EffectMagnitude};
pub use tester::{
    complete_pairs, wilcoxon_cross_model, wilcoxon_cross_model_file, wilcoxon_cross_template,
    wilcoxon_cross_template_file, ComparisonMode, EffectSizeResult, SignificanceReport,
    SubjectOutcome, SubjectReport,
};
pub use wilcoxon::{exact_cdf, wilcoxon_signed_rank, PValueMethod, WilcoxonResult};

#[cfg(test)]
mod tests;

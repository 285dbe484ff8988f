// Shapiro-Wilk W test for normality
//
// Royston's approximation (Royston 1995, algorithm AS R94): polynomial
// approximations for the a-coefficients and a normalizing transform of W
// for the p-value. Valid for 3 <= n <= 5000.
//
// Reference:
// Royston, P. (1995). Remark AS R94: A remark on algorithm AS 181: The
//     W-test for normality. Applied Statistics, 44(4), 547-551.

use crate::stats::{normal_ppf, normal_sf, Result, StatsError};
use serde::Serialize;

/// Largest sample for which the p-value approximation is calibrated
pub const MAX_CALIBRATED_N: usize = 5000;

const SMALL: f64 = 1e-19;

// Coefficient polynomials for the a-vector
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];

// p-value polynomials: small samples (n <= 11) on n, large samples on ln(n)
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Result of a Shapiro-Wilk test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroResult {
    pub w: f64,
    pub p_value: f64,
}

/// c[0] + c[1]·x + c[2]·x² + …
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Upper half of the antisymmetric coefficient vector (largest first)
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an = n as f64;
    let an25 = an + 0.25;
    let mut a: Vec<f64> = (1..=half)
        .map(|i| normal_ppf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * a.iter().map(|m| m * m).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();
    let a1 = poly(&C1, rsn) - a[0] / ssumm2;

    let (first_scaled, fac) = if n > 5 {
        let a2 = -a[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * a[0] * a[0] - 2.0 * a[1] * a[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * a[0] * a[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    a[0] = a1;
    for coefficient in a.iter_mut().skip(first_scaled) {
        *coefficient = -*coefficient / fac;
    }
    a
}

/// Run the Shapiro-Wilk test on a sample (order does not matter)
///
/// A sample with zero range yields W = 1 and p = 1.
pub fn shapiro_wilk(sample: &[f64]) -> Result<ShapiroResult> {
    let n = sample.len();
    if n < 3 {
        return Err(StatsError::InsufficientData {
            required: 3,
            actual: n,
        });
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }
    if n > MAX_CALIBRATED_N {
        tracing::warn!(
            "Shapiro-Wilk p-value may be inaccurate for n={} (> {})",
            n,
            MAX_CALIBRATED_N
        );
    }

    let mut x = sample.to_vec();
    x.sort_by(f64::total_cmp);

    let range = x[n - 1] - x[0];
    if range < SMALL {
        tracing::warn!("Shapiro-Wilk on a constant sample (n={}), reporting W=1", n);
        return Ok(ShapiroResult {
            w: 1.0,
            p_value: 1.0,
        });
    }

    // Full antisymmetric coefficient vector aligned with the sorted sample
    let half = coefficients(n);
    let mut a_full = vec![0.0; n];
    for (i, &ai) in half.iter().enumerate() {
        a_full[i] = -ai;
        a_full[n - 1 - i] = ai;
    }

    // W is the squared correlation between the coefficients and the
    // range-scaled order statistics.
    let xs: Vec<f64> = x.iter().map(|v| v / range).collect();
    let a_mean = a_full.iter().sum::<f64>() / n as f64;
    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (ai, xi) in a_full.iter().zip(&xs) {
        let da = ai - a_mean;
        let dx = xi - x_mean;
        ssa += da * da;
        ssx += dx * dx;
        sax += da * dx;
    }
    let ssassx = (ssa * ssx).sqrt();
    let w1 = (ssassx - sax) * (ssassx + sax) / (ssa * ssx);
    let w = 1.0 - w1;

    Ok(ShapiroResult {
        w,
        p_value: p_value(w, n),
    })
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        const PI6: f64 = 1.909_859_317_102_74;
        const STQR: f64 = 1.047_197_551_196_6;
        let pw = PI6 * (w.sqrt().asin() - STQR);
        return pw.clamp(0.0, 1.0);
    }

    let an = n as f64;
    let mut w1 = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&G, an);
        if w1 >= gamma {
            return 1e-99;
        }
        w1 = -(gamma - w1).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let xx = an.ln();
        (poly(&C5, xx), poly(&C6, xx).exp())
    };

    normal_sf((w1 - m) / s).clamp(0.0, 1.0)
}

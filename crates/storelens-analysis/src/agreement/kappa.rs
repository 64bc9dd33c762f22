//! Cohen's kappa over rater pairs.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use super::raters::RaterTable;

/// Kappa with its inputs and a normal-approximation 95% interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KappaStats {
    pub kappa: f64,
    pub n: usize,
    /// Observed agreement `po`.
    pub observed: f64,
    /// Chance agreement `pe`.
    pub expected: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

/// `None` when the statistic is undefined: no items, or chance agreement
/// of 1 (both raters constant and identical).
pub fn cohen_kappa(pairs: &[(bool, bool)]) -> Option<KappaStats> {
    let n = pairs.len();
    if n == 0 {
        return None;
    }
    let nf = n as f64;
    let agree = pairs.iter().filter(|(a, b)| a == b).count() as f64;
    let a_yes = pairs.iter().filter(|(a, _)| *a).count() as f64;
    let b_yes = pairs.iter().filter(|(_, b)| *b).count() as f64;

    let po = agree / nf;
    let pe = (a_yes / nf) * (b_yes / nf) + (1.0 - a_yes / nf) * (1.0 - b_yes / nf);
    if (1.0 - pe).abs() < f64::EPSILON {
        return None;
    }
    let kappa = (po - pe) / (1.0 - pe);

    let se = (po * (1.0 - po) / (nf * (1.0 - pe).powi(2))).sqrt();
    let z = Normal::new(0.0, 1.0)
        .map(|d| d.inverse_cdf(0.975))
        .unwrap_or(1.96);
    Some(KappaStats {
        kappa,
        n,
        observed: po,
        expected: pe,
        ci_low: (kappa - z * se).max(-1.0),
        ci_high: (kappa + z * se).min(1.0),
    })
}

/// One row of the agreement table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairAgreement {
    pub rater_a: String,
    pub rater_b: String,
    pub kappa: f64,
    pub n: usize,
    pub observed_agreement: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

/// Kappa for every unordered rater pair, pairs in rater-name order.
/// Fewer than two raters, empty overlaps, and undefined kappas are
/// skipped.
pub fn agreement(table: &RaterTable) -> Vec<PairAgreement> {
    let raters: Vec<&str> = table.raters().collect();
    if raters.len() < 2 {
        tracing::info!(raters = raters.len(), "fewer than two raters, no agreement computed");
        return Vec::new();
    }

    let mut out = Vec::new();
    for (i, a) in raters.iter().enumerate() {
        for b in &raters[i + 1..] {
            let pairs = table.overlap(a, b);
            match cohen_kappa(&pairs) {
                Some(stats) => out.push(PairAgreement {
                    rater_a: a.to_string(),
                    rater_b: b.to_string(),
                    kappa: stats.kappa,
                    n: stats.n,
                    observed_agreement: stats.observed,
                    ci_low: stats.ci_low,
                    ci_high: stats.ci_high,
                }),
                None => tracing::debug!(
                    rater_a = *a,
                    rater_b = *b,
                    overlap = pairs.len(),
                    "agreement undefined, pair skipped"
                ),
            }
        }
    }
    out
}

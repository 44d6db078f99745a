// Accuracy scoring: how closely a chart's reconstructed performance matches
// the real season, as a weighted symmetric percent-difference score.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::chart::Projection;
use crate::engine::rates::NormalizedRates;
use crate::profile::AccuracyWeights;

/// Stat categories the score compares. BTreeMap-keyed so per-category
/// breakdowns serialize in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatCategory {
    Avg,
    Obp,
    Slg,
    #[serde(rename = "h")]
    Hits,
    #[serde(rename = "hr")]
    HomeRuns,
    #[serde(rename = "so")]
    Strikeouts,
}

/// A weighted overall score in [0, 1] plus the unweighted per-category
/// scores behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Accuracy {
    pub overall: f64,
    pub by_category: BTreeMap<StatCategory, f64>,
}

/// Symmetric percent-difference accuracy for one category, clamped to
/// [0, 1]. Two zero values agree perfectly rather than dividing by zero.
pub fn category_accuracy(actual: f64, projected: f64) -> f64 {
    if actual == 0.0 && projected == 0.0 {
        return 1.0;
    }
    let mean = (actual + projected) / 2.0;
    (1.0 - (actual - projected).abs() / mean).clamp(0.0, 1.0)
}

/// Score a projection against the normalized season rates.
pub fn score(projection: &Projection, rates: &NormalizedRates, weights: &AccuracyWeights) -> Accuracy {
    let pairs: [(StatCategory, f64, f64, f64); 6] = [
        (StatCategory::Avg, rates.avg, projection.avg, weights.avg),
        (StatCategory::Obp, rates.obp, projection.obp, weights.obp),
        (StatCategory::Slg, rates.slg, projection.slg, weights.slg),
        (StatCategory::Hits, rates.h, projection.h, weights.h),
        (StatCategory::HomeRuns, rates.hr, projection.hr, weights.hr),
        (StatCategory::Strikeouts, rates.so, projection.so, weights.so),
    ];

    let mut by_category = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (category, actual, projected, weight) in pairs {
        let accuracy = category_accuracy(actual, projected);
        by_category.insert(category, accuracy);
        weighted_sum += accuracy * weight;
        weight_total += weight;
    }

    Accuracy {
        overall: weighted_sum / weight_total,
        by_category,
    }
}

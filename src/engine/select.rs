// Candidate selection: build and score a chart for every (command, outs)
// pair the profile declares, then rank by accuracy.

use serde::Serialize;
use tracing::debug;

use crate::engine::accuracy::{self, Accuracy};
use crate::engine::chart::{self, Candidate, Chart, Projection};
use crate::engine::rates::NormalizedRates;
use crate::engine::CardError;
use crate::profile::ContextProfile;

/// One fully evaluated candidate: its chart, reconstructed performance, and
/// accuracy against the real season.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub chart: Chart,
    pub projection: Projection,
    pub accuracy: Accuracy,
}

/// Evaluate every profile candidate and return them best-first.
///
/// Ties keep profile declaration order, so a profile that lists its
/// preferred conventions first gets them on equal accuracy. Candidates the
/// builder rejects (zero advantages against the baseline) are skipped rather
/// than failing the whole search.
pub fn rank_candidates(
    rates: &NormalizedRates,
    profile: &ContextProfile,
) -> Result<Vec<ScoredCandidate>, CardError> {
    let mut scored = Vec::with_capacity(profile.candidates.len());
    for &candidate in &profile.candidates {
        let built = match chart::build_chart(candidate, rates, &profile.baseline, profile.player_kind) {
            Ok(built) => built,
            Err(CardError::Config(reason)) => {
                debug!(
                    command = candidate.command,
                    outs = candidate.outs,
                    %reason,
                    "skipping unsolvable candidate"
                );
                continue;
            }
            Err(e) => return Err(e),
        };
        let accuracy = accuracy::score(&built.projection, rates, &profile.accuracy_weights);
        scored.push(ScoredCandidate {
            candidate,
            chart: built.chart,
            projection: built.projection,
            accuracy,
        });
    }

    if scored.is_empty() {
        return Err(CardError::Config(
            "no profile candidate is solvable against the baseline".into(),
        ));
    }

    // Stable sort preserves declaration order among equal scores.
    scored.sort_by(|a, b| {
        b.accuracy
            .overall
            .partial_cmp(&a.accuracy.overall)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(scored)
}

/// Pick the candidate at `offset` in the accuracy ranking; offset 0 is the
/// most accurate. Used to deliberately issue a weaker or stronger variant of
/// the same season.
pub fn select_candidate(
    rates: &NormalizedRates,
    profile: &ContextProfile,
    offset: usize,
) -> Result<ScoredCandidate, CardError> {
    let mut ranked = rank_candidates(rates, profile)?;
    if offset >= ranked.len() {
        return Err(CardError::OffsetOutOfRange {
            offset,
            available: ranked.len(),
        });
    }
    Ok(ranked.swap_remove(offset))
}

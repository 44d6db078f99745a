// The card engine: a pure pipeline from one season statline and one profile
// to a finished card. No I/O happens below this module.

pub mod accuracy;
pub mod chart;
pub mod points;
pub mod ranges;
pub mod rates;
pub mod select;

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

use crate::profile::ContextProfile;
use crate::statline::{PlayerKind, SeasonStatline};

pub use accuracy::{Accuracy, StatCategory};
pub use chart::{Candidate, Chart, Outcome, Projection, CHART_SLOTS};
pub use points::{PlayerClass, SeasonProjection};
pub use ranges::SlotRange;
pub use rates::NormalizedRates;
pub use select::ScoredCandidate;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CardError {
    /// The season statline itself is unusable.
    #[error("invalid input: {0}")]
    Input(String),

    /// The profile or engine configuration is inconsistent with the request.
    #[error("configuration error: {0}")]
    Config(String),

    /// A ranking offset past the end of the candidate ranking.
    #[error("ranking offset {offset} out of range, {available} candidates available")]
    OffsetOutOfRange { offset: usize, available: usize },
}

// ---------------------------------------------------------------------------
// Card result
// ---------------------------------------------------------------------------

/// A finished card: the selected chart with rendered ranges, the projected
/// performance behind it, and its point value.
#[derive(Debug, Clone, Serialize)]
pub struct CardResult {
    pub name: String,
    pub set: String,
    pub kind: PlayerKind,
    pub class: PlayerClass,
    pub chart: Chart,
    pub ranges: Vec<SlotRange>,
    pub projected: Projection,
    pub projected_season: SeasonProjection,
    pub points: u32,
    pub accuracy_overall: f64,
    pub accuracy_by_category: BTreeMap<StatCategory, f64>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Build a card for one season. `offset` walks down the accuracy ranking:
/// 0 issues the most accurate chart, 1 the runner-up, and so on.
pub fn build_card(
    statline: &SeasonStatline,
    profile: &ContextProfile,
    kind: PlayerKind,
    offset: usize,
) -> Result<CardResult, CardError> {
    if kind != profile.player_kind {
        return Err(CardError::Config(format!(
            "profile '{}' is for {:?} cards, requested {:?}",
            profile.set, profile.player_kind, kind
        )));
    }

    let rates = rates::normalize(statline, profile.denominator)?;
    let selected = select::select_candidate(&rates, profile, offset)?;
    let ranges = ranges::map_ranges(&selected.chart, &selected.projection, profile);
    let projected_season = points::scale_to_season(&selected.projection, profile.season_pa);
    let class = points::player_class(statline, kind);
    let point_value = points::value_points(statline, &selected.projection, profile)?;

    info!(
        name = %statline.name,
        year = statline.year,
        command = selected.candidate.command,
        outs = selected.candidate.outs,
        points = point_value,
        accuracy = selected.accuracy.overall,
        "built card"
    );

    Ok(CardResult {
        name: statline.name.clone(),
        set: profile.set.clone(),
        kind,
        class,
        chart: selected.chart,
        ranges,
        projected: selected.projection,
        projected_season,
        points: point_value,
        accuracy_overall: selected.accuracy.overall,
        accuracy_by_category: selected.accuracy.by_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_support::{hitter_profile, pitcher_profile};
    use crate::statline::test_support::{make_hitter_statline, make_pitcher_statline};

    #[test]
    fn builds_a_complete_hitter_card() {
        let card = build_card(&make_hitter_statline(), &hitter_profile(), PlayerKind::Hitter, 0).unwrap();
        assert_eq!(card.name, "Test Hitter");
        assert_eq!(card.class, PlayerClass::PositionPlayer);
        assert_eq!(card.chart.slot_total(), CHART_SLOTS);
        assert_eq!(card.ranges.len(), hitter_profile().chart_order.len());
        assert!(card.points >= 10 && card.points % 10 == 0);
        assert!(card.accuracy_overall > 0.0 && card.accuracy_overall <= 1.0);
        assert_eq!(card.accuracy_by_category.len(), 6);
        assert_eq!(card.projected_season.pa, 650);
    }

    #[test]
    fn builds_a_complete_pitcher_card() {
        let card =
            build_card(&make_pitcher_statline(), &pitcher_profile(), PlayerKind::Pitcher, 0).unwrap();
        assert_eq!(card.class, PlayerClass::StartingPitcher);
        assert_eq!(card.chart.single_plus, 0);
        assert_eq!(card.chart.sb, 0);
        assert_eq!(card.chart.slot_total(), CHART_SLOTS);
    }

    #[test]
    fn kind_must_match_profile() {
        let err =
            build_card(&make_hitter_statline(), &pitcher_profile(), PlayerKind::Hitter, 0).unwrap_err();
        assert!(matches!(err, CardError::Config(_)));
    }

    #[test]
    fn offset_selects_a_different_candidate() {
        let statline = make_hitter_statline();
        let profile = hitter_profile();
        let best = build_card(&statline, &profile, PlayerKind::Hitter, 0).unwrap();
        let runner_up = build_card(&statline, &profile, PlayerKind::Hitter, 1).unwrap();
        assert!(runner_up.accuracy_overall <= best.accuracy_overall);
        assert_ne!(
            (best.chart.command, best.chart.outs),
            (runner_up.chart.command, runner_up.chart.outs)
        );
    }
}

// Point valuation: convert a card's projected performance into a single
// cost by percentiling each category against profile ranges and summing the
// weighted results.

use serde::Serialize;

use crate::engine::chart::Projection;
use crate::engine::CardError;
use crate::profile::{ContextProfile, PercentileRange};
use crate::statline::{PlayerKind, Position, SeasonStatline};

/// Broad roster class a card is issued as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerClass {
    PositionPlayer,
    StartingPitcher,
    ReliefPitcher,
}

/// The card's projected performance scaled from the chart denominator to a
/// standard full season.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonProjection {
    pub pa: u32,
    pub h: f64,
    pub bb: f64,
    pub so: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
}

/// Scale per-denominator counts up to `season_pa`; rate stats carry over
/// unchanged.
pub fn scale_to_season(projection: &Projection, season_pa: u32) -> SeasonProjection {
    let factor = season_pa as f64 / projection.denominator as f64;
    SeasonProjection {
        pa: season_pa,
        h: projection.h * factor,
        bb: projection.bb * factor,
        so: projection.so * factor,
        single: projection.single * factor,
        double: projection.double * factor,
        triple: projection.triple * factor,
        hr: projection.hr * factor,
        avg: projection.avg,
        obp: projection.obp,
        slg: projection.slg,
    }
}

/// Classify the card's roster slot.
pub fn player_class(statline: &SeasonStatline, kind: PlayerKind) -> PlayerClass {
    match kind {
        PlayerKind::Hitter => PlayerClass::PositionPlayer,
        PlayerKind::Pitcher => {
            if statline
                .positions
                .iter()
                .any(|p| p.position == Position::Starter)
            {
                PlayerClass::StartingPitcher
            } else {
                PlayerClass::ReliefPitcher
            }
        }
    }
}

/// Where the value sits in a profile range, in [0, 1]. Inverted ranges
/// reward the low end.
fn percentile(range: &PercentileRange, value: f64) -> f64 {
    let p = ((value - range.min) / (range.max - range.min)).clamp(0.0, 1.0);
    if range.invert {
        1.0 - p
    } else {
        p
    }
}

/// Percentile where more is always better, regardless of the range's invert
/// flag (innings and speed on otherwise lower-is-better pitcher profiles).
fn percentile_ascending(range: &PercentileRange, value: f64) -> f64 {
    ((value - range.min) / (range.max - range.min)).clamp(0.0, 1.0)
}

/// Average defensive quality across the card's fielding positions, each as
/// a share of the profile's maximum rating for that position. Designated
/// hitters contribute zero.
fn defense_term(statline: &SeasonStatline, profile: &ContextProfile) -> Result<f64, CardError> {
    let fielding: Vec<_> = statline
        .positions
        .iter()
        .filter(|p| !p.position.is_pitching_role())
        .collect();
    if fielding.is_empty() {
        return Ok(0.0);
    }
    let mut total = 0.0;
    for rating in &fielding {
        if rating.position == Position::DesignatedHitter {
            continue;
        }
        let max = profile.defense_max.get(&rating.position).ok_or_else(|| {
            CardError::Config(format!(
                "profile has no defense maximum for position {}",
                rating.position
            ))
        })?;
        total += (rating.rating / max).clamp(0.0, 1.0);
    }
    Ok(total / fielding.len() as f64)
}

/// Value a card's projected season in points: a weighted sum of category
/// percentiles, rounded to the nearest ten and floored at 10.
pub fn value_points(
    statline: &SeasonStatline,
    projection: &Projection,
    profile: &ContextProfile,
) -> Result<u32, CardError> {
    let ranges = &profile.ranges;
    let weights = &profile.point_weights;

    let mut points = 0.0;
    points += percentile(&ranges.obp, projection.obp) * weights.obp;
    points += percentile(&ranges.avg, projection.avg) * weights.avg;
    points += percentile(&ranges.slg, projection.slg) * weights.slg;

    match profile.player_kind {
        PlayerKind::Pitcher => {
            points += percentile_ascending(&ranges.ip, statline.ip) * weights.speed_or_ip;
        }
        PlayerKind::Hitter => {
            points += percentile_ascending(&ranges.speed, statline.sprint_speed) * weights.speed_or_ip;
            let season_hr = scale_to_season(projection, profile.season_pa).hr;
            points += percentile_ascending(&ranges.hr_rate, season_hr) * weights.hr;
            points += defense_term(statline, profile)? * weights.defense;
        }
    }

    let rounded = ((points / 10.0).round() as u32) * 10;
    Ok(rounded.max(10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_support::{hitter_profile, pitcher_profile};
    use crate::statline::test_support::{make_hitter_statline, make_pitcher_statline};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_projection(avg: f64, obp: f64, slg: f64, hr: f64) -> Projection {
        Projection {
            denominator: 400,
            h: 100.0,
            bb: 40.0,
            so: 80.0,
            single: 70.0,
            double: 20.0,
            triple: 3.0,
            hr,
            avg,
            obp,
            slg,
        }
    }

    #[test]
    fn percentile_clamps_and_inverts() {
        let range = PercentileRange { min: 0.300, max: 0.400, invert: false };
        assert!(approx_eq(percentile(&range, 0.350), 0.5, 1e-12));
        assert!(approx_eq(percentile(&range, 0.250), 0.0, 1e-12));
        assert!(approx_eq(percentile(&range, 0.500), 1.0, 1e-12));

        let inverted = PercentileRange { min: 0.300, max: 0.400, invert: true };
        assert!(approx_eq(percentile(&inverted, 0.300), 1.0, 1e-12));
        assert!(approx_eq(percentile(&inverted, 0.400), 0.0, 1e-12));
        // Ascending terms ignore the invert flag.
        assert!(approx_eq(percentile_ascending(&inverted, 0.375), 0.75, 1e-12));
    }

    #[test]
    fn season_scaling_multiplies_counts_only() {
        let projection = make_projection(0.272, 0.338, 0.460, 12.0);
        let season = scale_to_season(&projection, 650);
        assert_eq!(season.pa, 650);
        assert!(approx_eq(season.hr, 12.0 * 1.625, 1e-10));
        assert!(approx_eq(season.h, 100.0 * 1.625, 1e-10));
        assert!(approx_eq(season.avg, 0.272, 1e-12));
        assert!(approx_eq(season.obp, 0.338, 1e-12));
    }

    #[test]
    fn hitter_points_hand_computed() {
        // obp .338 -> .2533 * 250 = 63.33; avg .272 -> .4476 * 80 = 35.81;
        // slg .460 -> .55 * 150 = 82.5; speed 27 -> .5714 * 60 = 34.29;
        // hr 12/400 -> 19.5/650 -> .39 * 60 = 23.4; defense 4/6 * 80 = 53.33.
        // Sum 292.66 -> 290.
        let profile = hitter_profile();
        let statline = make_hitter_statline();
        let projection = make_projection(0.272, 0.338, 0.460, 12.0);
        let points = value_points(&statline, &projection, &profile).unwrap();
        assert_eq!(points, 290);
    }

    #[test]
    fn pitcher_points_hand_computed() {
        // obp .280 -> 1.0 * 300 = 300; avg .235 -> .75 * 80 = 60;
        // slg .360 -> .8636 * 150 = 129.55; ip 200 -> .7619 * 150 = 114.29.
        // Sum 603.83 -> 600.
        let profile = pitcher_profile();
        let statline = make_pitcher_statline();
        let projection = make_projection(0.235, 0.280, 0.360, 7.0);
        let points = value_points(&statline, &projection, &profile).unwrap();
        assert_eq!(points, 600);
    }

    #[test]
    fn points_floor_at_ten() {
        let profile = hitter_profile();
        let mut statline = make_hitter_statline();
        statline.sprint_speed = 20.0;
        statline.positions.clear();
        let projection = make_projection(0.150, 0.200, 0.250, 0.0);
        let points = value_points(&statline, &projection, &profile).unwrap();
        assert_eq!(points, 10);
    }

    #[test]
    fn points_are_multiples_of_ten() {
        let profile = hitter_profile();
        let statline = make_hitter_statline();
        for hr in [0.0, 3.0, 8.0, 14.0] {
            let projection = make_projection(0.272, 0.338, 0.460, hr);
            let points = value_points(&statline, &projection, &profile).unwrap();
            assert_eq!(points % 10, 0);
            assert!(points >= 10);
        }
    }

    #[test]
    fn missing_defense_maximum_is_config_error() {
        let mut profile = hitter_profile();
        profile.defense_max.remove(&Position::Shortstop);
        let statline = make_hitter_statline();
        let projection = make_projection(0.272, 0.338, 0.460, 10.0);
        let err = value_points(&statline, &projection, &profile).unwrap_err();
        assert!(matches!(err, CardError::Config(_)));
    }

    #[test]
    fn designated_hitter_contributes_no_defense() {
        let profile = hitter_profile();
        let mut statline = make_hitter_statline();
        statline.positions = vec![crate::statline::PositionRating {
            position: Position::DesignatedHitter,
            games: 140,
            rating: 0.0,
        }];
        assert!(approx_eq(defense_term(&statline, &profile).unwrap(), 0.0, 1e-12));
    }

    #[test]
    fn classifies_roster_slots() {
        assert_eq!(
            player_class(&make_hitter_statline(), PlayerKind::Hitter),
            PlayerClass::PositionPlayer
        );
        assert_eq!(
            player_class(&make_pitcher_statline(), PlayerKind::Pitcher),
            PlayerClass::StartingPitcher
        );
        let mut reliever = make_pitcher_statline();
        reliever.positions[0].position = Position::Reliever;
        assert_eq!(
            player_class(&reliever, PlayerKind::Pitcher),
            PlayerClass::ReliefPitcher
        );
    }
}

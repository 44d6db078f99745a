// Rate normalization: rescale a raw season statline to a fixed
// plate-appearance denominator so unequal playing time compares cleanly.

use serde::Serialize;
use tracing::warn;

use crate::engine::CardError;
use crate::statline::SeasonStatline;

/// Ground/air data before this season is unreliable, so the ratio is pinned
/// to an even split.
const RELIABLE_BATTED_BALL_YEAR: u32 = 1941;

/// Every outcome category expressed as a count per `denominator` plate
/// appearances, plus the pass-through ratio and rate inputs.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRates {
    pub denominator: u32,
    /// Real season plate appearances, kept for de-normalization.
    pub pa: f64,
    pub so: f64,
    pub bb: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
    pub sb: f64,
    pub h: f64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub go_ao_ratio: f64,
    pub if_fb_ratio: f64,
}

/// Rescale a season statline to `denominator` plate appearances.
///
/// Sacrifice hits are excluded from the scaling base since they resolve
/// outside the chart. A season with no non-sacrifice plate appearances is
/// degenerate input, not a numeric edge case.
pub fn normalize(statline: &SeasonStatline, denominator: u32) -> Result<NormalizedRates, CardError> {
    if denominator == 0 {
        return Err(CardError::Config("denominator must be greater than 0".into()));
    }
    if statline.pa <= statline.sh {
        return Err(CardError::Input(format!(
            "season for '{}' has {} PA against {} sacrifice hits",
            statline.name, statline.pa, statline.sh
        )));
    }

    let scale = (statline.pa - statline.sh) as f64 / denominator as f64;

    let go_ao_ratio = if statline.year < RELIABLE_BATTED_BALL_YEAR {
        warn!(
            year = statline.year,
            "pre-{} season, pinning ground/air ratio to 1.0", RELIABLE_BATTED_BALL_YEAR
        );
        1.0
    } else {
        statline.go_ao_ratio
    };

    Ok(NormalizedRates {
        denominator,
        pa: statline.pa as f64,
        so: statline.so as f64 / scale,
        bb: statline.bb as f64 / scale,
        single: statline.singles as f64 / scale,
        double: statline.doubles as f64 / scale,
        triple: statline.triples as f64 / scale,
        hr: statline.home_runs as f64 / scale,
        sb: statline.sb as f64 / scale,
        h: statline.h as f64 / scale,
        avg: statline.avg,
        obp: statline.obp,
        slg: statline.slg,
        go_ao_ratio,
        if_fb_ratio: statline.if_fb_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statline::test_support::make_hitter_statline;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn counts_scaled_to_denominator() {
        // 600 PA, no sacrifices: scale = 1.5
        let statline = make_hitter_statline();
        let rates = normalize(&statline, 400).unwrap();
        assert!(approx_eq(rates.so, 120.0 / 1.5, 1e-10));
        assert!(approx_eq(rates.bb, 60.0 / 1.5, 1e-10));
        assert!(approx_eq(rates.hr, 15.0 / 1.5, 1e-10));
        assert!(approx_eq(rates.h, 150.0 / 1.5, 1e-10));
        assert!(approx_eq(rates.pa, 600.0, 1e-10));
    }

    #[test]
    fn rate_stats_pass_through() {
        let statline = make_hitter_statline();
        let rates = normalize(&statline, 400).unwrap();
        assert!(approx_eq(rates.avg, statline.avg, 1e-10));
        assert!(approx_eq(rates.obp, statline.obp, 1e-10));
        assert!(approx_eq(rates.slg, statline.slg, 1e-10));
        assert!(approx_eq(rates.go_ao_ratio, statline.go_ao_ratio, 1e-10));
    }

    #[test]
    fn sacrifice_hits_shrink_the_scaling_base() {
        let mut statline = make_hitter_statline();
        statline.sh = 100;
        // scale = (600-100)/400 = 1.25
        let rates = normalize(&statline, 400).unwrap();
        assert!(approx_eq(rates.so, 120.0 / 1.25, 1e-10));
    }

    #[test]
    fn pre_1941_ground_air_ratio_pinned() {
        let mut statline = make_hitter_statline();
        statline.year = 1927;
        statline.go_ao_ratio = 2.4;
        let rates = normalize(&statline, 400).unwrap();
        assert!(approx_eq(rates.go_ao_ratio, 1.0, 1e-10));
    }

    #[test]
    fn degenerate_season_is_input_error() {
        let mut statline = make_hitter_statline();
        statline.pa = 20;
        statline.sh = 20;
        let err = normalize(&statline, 400).unwrap_err();
        assert!(matches!(err, CardError::Input(_)));
    }

    #[test]
    fn zero_denominator_is_config_error() {
        let statline = make_hitter_statline();
        let err = normalize(&statline, 0).unwrap_err();
        assert!(matches!(err, CardError::Config(_)));
    }
}

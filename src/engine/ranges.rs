// Range mapping: lay a chart's slot counts onto the d20 in the profile's
// category order, producing the printed ranges ("1-4", "20", "21+", "-").

use serde::Serialize;

use crate::engine::chart::{Chart, Outcome, Projection, CHART_SLOTS};
use crate::profile::{ContextProfile, ExtensionRule};

/// Rendered range for a category with no slots.
pub const EMPTY_RANGE: &str = "-";

/// One rendered chart row.
#[derive(Debug, Clone, Serialize)]
pub struct SlotRange {
    pub outcome: Outcome,
    pub range: String,
}

fn span(start: u32, end: u32) -> String {
    if end < start {
        EMPTY_RANGE.to_string()
    } else if end == start {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}

/// Map a chart onto rendered slot ranges.
///
/// Categories are laid out contiguously from slot 1 in the profile's chart
/// order; zero-count categories render as `-` and consume no slots. When the
/// profile carries an extension rule, a home-run category squeezed off the
/// 20-slot chart is placed past slot 20 by the profile's rate ladders (and
/// likewise doubles, when they were squeezed off too); the category that
/// closes out slot 20 stretches to meet the extended range. Extension
/// profiles always render home runs open-ended (`N+`).
pub fn map_ranges(chart: &Chart, projection: &Projection, profile: &ContextProfile) -> Vec<SlotRange> {
    let order = &profile.chart_order;
    let extension = profile.extension.as_ref();

    let double_idx = order.iter().position(|&o| o == Outcome::Double);
    let hr_idx = order.iter().position(|&o| o == Outcome::HomeRun);

    // An extension applies only when the category was squeezed to zero slots
    // and nothing with slots would end up out of order behind it.
    let hr_extended = extension.is_some() && chart.hr == 0 && hr_idx.is_some();
    let double_extended = match (hr_extended, double_idx, hr_idx) {
        (true, Some(d), Some(h)) if d < h => {
            chart.double == 0 && order[d + 1..h].iter().all(|&o| chart.count(o) == 0)
        }
        _ => false,
    };

    let mut double_start = 0;
    let mut hr_start = 0;
    if let Some(ext) = extension {
        if double_extended {
            double_start =
                ExtensionRule::lookup(&ext.double_ladder, projection.double).max(CHART_SLOTS + 1);
        }
        if hr_extended {
            let floor = if double_extended {
                double_start + 1
            } else {
                CHART_SLOTS + 1
            };
            hr_start = ExtensionRule::lookup(&ext.hr_ladder, projection.hr).max(floor);
        }
    }

    let mut ranges = Vec::with_capacity(order.len());
    let mut cursor = 1u32;
    for (i, &outcome) in order.iter().enumerate() {
        let count = chart.count(outcome);

        if hr_extended && outcome == Outcome::HomeRun {
            ranges.push(SlotRange {
                outcome,
                range: format!("{hr_start}+"),
            });
            continue;
        }
        if double_extended && outcome == Outcome::Double {
            ranges.push(SlotRange {
                outcome,
                range: span(double_start, hr_start - 1),
            });
            cursor = hr_start;
            continue;
        }
        if count == 0 {
            ranges.push(SlotRange {
                outcome,
                range: EMPTY_RANGE.to_string(),
            });
            continue;
        }

        let start = cursor;
        let mut end = start + count - 1;
        if hr_extended && end == CHART_SLOTS {
            // Last natural category stretches to meet the extended ranges.
            end = if double_extended && double_idx.map_or(false, |d| i < d) {
                double_start - 1
            } else {
                hr_start - 1
            };
        }
        cursor = end + 1;

        let range = if outcome == Outcome::HomeRun && extension.is_some() {
            format!("{start}+")
        } else {
            span(start, end)
        };
        ranges.push(SlotRange { outcome, range });
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::test_support::{hitter_profile, pitcher_profile};

    fn hitter_chart() -> Chart {
        Chart {
            command: 8,
            outs: 4,
            so: 4,
            gb: 0,
            fb: 0,
            pu: 0,
            bb: 5,
            single: 7,
            single_plus: 0,
            double: 3,
            triple: 0,
            hr: 1,
            sb: 10,
        }
    }

    fn projection(double: f64, hr: f64) -> Projection {
        Projection {
            denominator: 400,
            h: 100.0,
            bb: 40.0,
            so: 80.0,
            single: 70.0,
            double,
            triple: 3.0,
            hr,
            avg: 0.272,
            obp: 0.338,
            slg: 0.460,
        }
    }

    fn range_for(ranges: &[SlotRange], outcome: Outcome) -> &str {
        &ranges
            .iter()
            .find(|r| r.outcome == outcome)
            .unwrap()
            .range
    }

    #[test]
    fn hitter_ranges_follow_chart_order() {
        let profile = hitter_profile();
        let ranges = map_ranges(&hitter_chart(), &projection(20.0, 10.0), &profile);
        assert_eq!(range_for(&ranges, Outcome::Strikeout), "1-4");
        assert_eq!(range_for(&ranges, Outcome::GroundOut), EMPTY_RANGE);
        assert_eq!(range_for(&ranges, Outcome::FlyOut), EMPTY_RANGE);
        assert_eq!(range_for(&ranges, Outcome::Walk), "5-9");
        assert_eq!(range_for(&ranges, Outcome::Single), "10-16");
        assert_eq!(range_for(&ranges, Outcome::SinglePlus), EMPTY_RANGE);
        assert_eq!(range_for(&ranges, Outcome::Double), "17-19");
        assert_eq!(range_for(&ranges, Outcome::Triple), EMPTY_RANGE);
        // No extension rule on the hitter profile: a closed single slot.
        assert_eq!(range_for(&ranges, Outcome::HomeRun), "20");
    }

    #[test]
    fn single_slot_category_renders_bare_number() {
        assert_eq!(span(7, 7), "7");
        assert_eq!(span(1, 4), "1-4");
        assert_eq!(span(5, 4), EMPTY_RANGE);
    }

    #[test]
    fn extension_profile_renders_home_runs_open_ended() {
        let profile = pitcher_profile();
        let chart = Chart {
            command: 4,
            outs: 16,
            so: 6,
            gb: 5,
            fb: 4,
            pu: 1,
            bb: 1,
            single: 1,
            single_plus: 0,
            double: 1,
            triple: 0,
            hr: 1,
            sb: 0,
        };
        let ranges = map_ranges(&chart, &projection(19.5, 7.3), &profile);
        assert_eq!(range_for(&ranges, Outcome::HomeRun), "20+");
    }

    #[test]
    fn squeezed_home_run_lands_on_ladder_slot() {
        let profile = pitcher_profile();
        // Doubles keep a natural slot at 20; only home runs are squeezed off.
        let chart = Chart {
            command: 4,
            outs: 16,
            so: 6,
            gb: 5,
            fb: 4,
            pu: 1,
            bb: 1,
            single: 2,
            single_plus: 0,
            double: 1,
            triple: 0,
            hr: 0,
            sb: 0,
        };
        // hr rate 7.3 is above the 2.5 breakpoint: start 21
        let ranges = map_ranges(&chart, &projection(19.5, 7.3), &profile);
        assert_eq!(range_for(&ranges, Outcome::Single), "18-19");
        assert_eq!(range_for(&ranges, Outcome::Double), "20");
        assert_eq!(range_for(&ranges, Outcome::HomeRun), "21+");
        assert_eq!(range_for(&ranges, Outcome::Triple), EMPTY_RANGE);
    }

    #[test]
    fn squeezed_doubles_and_home_runs_both_extend() {
        let profile = pitcher_profile();
        let chart = Chart {
            command: 4,
            outs: 16,
            so: 6,
            gb: 5,
            fb: 4,
            pu: 1,
            bb: 2,
            single: 2,
            single_plus: 0,
            double: 0,
            triple: 0,
            hr: 0,
            sb: 0,
        };
        // double rate 5 -> ladder 22; hr rate 0.8 -> ladder 23
        let ranges = map_ranges(&chart, &projection(5.0, 0.8), &profile);
        // Singles close slot 20 and stretch to meet the extended doubles.
        assert_eq!(range_for(&ranges, Outcome::Single), "19-21");
        assert_eq!(range_for(&ranges, Outcome::Double), "22");
        assert_eq!(range_for(&ranges, Outcome::HomeRun), "23+");
    }

    #[test]
    fn extended_doubles_always_get_a_slot() {
        let profile = pitcher_profile();
        let chart = Chart {
            command: 4,
            outs: 16,
            so: 6,
            gb: 5,
            fb: 4,
            pu: 1,
            bb: 2,
            single: 2,
            single_plus: 0,
            double: 0,
            triple: 0,
            hr: 0,
            sb: 0,
        };
        // Both ladders resolve to 21: doubles keep 21, home runs pushed to 22.
        let ranges = map_ranges(&chart, &projection(12.0, 3.0), &profile);
        assert_eq!(range_for(&ranges, Outcome::Double), "21");
        assert_eq!(range_for(&ranges, Outcome::HomeRun), "22+");
    }

    #[test]
    fn ranges_are_contiguous_from_slot_one() {
        let profile = hitter_profile();
        let ranges = map_ranges(&hitter_chart(), &projection(20.0, 10.0), &profile);
        let mut expected_start = 1u32;
        for slot_range in &ranges {
            if slot_range.range == EMPTY_RANGE {
                continue;
            }
            let (start, end) = match slot_range.range.split_once('-') {
                Some((s, e)) => (s.parse::<u32>().unwrap(), e.parse::<u32>().unwrap()),
                None => {
                    let v = slot_range.range.trim_end_matches('+').parse::<u32>().unwrap();
                    (v, v)
                }
            };
            assert_eq!(start, expected_start, "gap before {}", slot_range.outcome);
            expected_start = end + 1;
        }
        assert_eq!(expected_start, CHART_SLOTS + 1);
    }
}

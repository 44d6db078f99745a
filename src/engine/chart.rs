// Chart construction: solve a 20-slot outcome distribution for one
// (command, outs) candidate against the profile's baseline opponent chart.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::engine::rates::NormalizedRates;
use crate::engine::CardError;
use crate::statline::PlayerKind;

/// The resolution space is always 20 slots; advantages are counted out of it.
pub const CHART_SLOTS: u32 = 20;

/// The per-category solve is exact when rates are expressed per 400 PA
/// (20 slots x 20 advantages); other denominators scale by `denom / 400`.
const REFERENCE_DENOMINATOR: f64 = 400.0;

// ---------------------------------------------------------------------------
// Outcome categories
// ---------------------------------------------------------------------------

/// Chart outcome categories. A fixed enum rather than string keys so adding
/// a category is a compile-time exhaustiveness change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Popup,
    Strikeout,
    GroundOut,
    FlyOut,
    Walk,
    Single,
    SinglePlus,
    Double,
    Triple,
    HomeRun,
}

impl Outcome {
    /// Parse a chart-order label ("SO", "1B+", ...) into an Outcome.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PU" => Some(Outcome::Popup),
            "SO" => Some(Outcome::Strikeout),
            "GB" => Some(Outcome::GroundOut),
            "FB" => Some(Outcome::FlyOut),
            "BB" => Some(Outcome::Walk),
            "1B" => Some(Outcome::Single),
            "1B+" => Some(Outcome::SinglePlus),
            "2B" => Some(Outcome::Double),
            "3B" => Some(Outcome::Triple),
            "HR" => Some(Outcome::HomeRun),
            _ => None,
        }
    }

    /// Display label used on rendered charts.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Popup => "PU",
            Outcome::Strikeout => "SO",
            Outcome::GroundOut => "GB",
            Outcome::FlyOut => "FB",
            Outcome::Walk => "BB",
            Outcome::Single => "1B",
            Outcome::SinglePlus => "1B+",
            Outcome::Double => "2B",
            Outcome::Triple => "3B",
            Outcome::HomeRun => "HR",
        }
    }

    /// All outcome categories, in canonical chart order.
    pub const ALL: [Outcome; 10] = [
        Outcome::Popup,
        Outcome::Strikeout,
        Outcome::GroundOut,
        Outcome::FlyOut,
        Outcome::Walk,
        Outcome::Single,
        Outcome::SinglePlus,
        Outcome::Double,
        Outcome::Triple,
        Outcome::HomeRun,
    ];
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Candidate and baseline types
// ---------------------------------------------------------------------------

/// A (command, outs) pair under evaluation. Command is a hitter's on-base
/// rating or a pitcher's control rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub command: u32,
    pub outs: u32,
}

/// The fixed opponent chart a card is solved against. Counts are fractional
/// slot averages over the opponent pool, so they are f64 rather than integer
/// slot counts.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineChart {
    pub command: u32,
    pub outs: u32,
    pub so: f64,
    pub gb: f64,
    pub fb: f64,
    pub pu: f64,
    pub bb: f64,
    pub single: f64,
    pub single_plus: f64,
    pub double: f64,
    pub triple: f64,
    pub hr: f64,
}

impl BaselineChart {
    fn count(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Popup => self.pu,
            Outcome::Strikeout => self.so,
            Outcome::GroundOut => self.gb,
            Outcome::FlyOut => self.fb,
            Outcome::Walk => self.bb,
            Outcome::Single => self.single,
            Outcome::SinglePlus => self.single_plus,
            Outcome::Double => self.double,
            Outcome::Triple => self.triple,
            Outcome::HomeRun => self.hr,
        }
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// A finished 20-slot chart. Stolen bases are tracked alongside but sit
/// outside the 20-slot budget.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub command: u32,
    pub outs: u32,
    pub so: u32,
    pub gb: u32,
    pub fb: u32,
    pub pu: u32,
    pub bb: u32,
    pub single: u32,
    pub single_plus: u32,
    pub double: u32,
    pub triple: u32,
    pub hr: u32,
    pub sb: u32,
}

impl Chart {
    pub fn count(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Popup => self.pu,
            Outcome::Strikeout => self.so,
            Outcome::GroundOut => self.gb,
            Outcome::FlyOut => self.fb,
            Outcome::Walk => self.bb,
            Outcome::Single => self.single,
            Outcome::SinglePlus => self.single_plus,
            Outcome::Double => self.double,
            Outcome::Triple => self.triple,
            Outcome::HomeRun => self.hr,
        }
    }

    /// Sum of every slot-occupying category (stolen bases excluded).
    pub fn slot_total(&self) -> u32 {
        Outcome::ALL.iter().map(|&o| self.count(o)).sum()
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Per-denominator-PA performance reconstructed from a chart via the
/// advantage-weighted identity `occ = my_count*my_adv + opp_count*opp_adv`.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub denominator: u32,
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

/// A chart plus its reconstructed performance, as produced by the builder.
#[derive(Debug, Clone, Serialize)]
pub struct BuiltChart {
    pub chart: Chart,
    pub projection: Projection,
}

// ---------------------------------------------------------------------------
// Advantage split
// ---------------------------------------------------------------------------

/// Number of the 20 resolution slots the player's own chart controls.
///
/// Hitters win the advantage when their on-base rating beats the roll plus
/// the opponent's control, so their share is `command - opp_command`.
/// Pitchers control everything the opposing on-base rating does not reach:
/// `20 - (opp_command - control)`. Clamped to [0, 20].
pub fn advantages_per_20(command: u32, opponent_command: u32, kind: PlayerKind) -> f64 {
    let diff = command as f64 - opponent_command as f64;
    let mine = match kind {
        PlayerKind::Hitter => diff,
        PlayerKind::Pitcher => CHART_SLOTS as f64 + diff,
    };
    mine.clamp(0.0, CHART_SLOTS as f64)
}

/// Round half up, floored at zero.
fn round_count(x: f64) -> u32 {
    if x <= 0.0 {
        0
    } else {
        (x + 0.5).floor() as u32
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Construct the chart for one candidate and reconstruct its projected
/// per-denominator performance.
///
/// Fails with `CardError::Config` only when the candidate/baseline command
/// combination leaves the player zero advantages, which makes the solve
/// undefined; every other step is total over well-formed input.
pub fn build_chart(
    candidate: Candidate,
    rates: &NormalizedRates,
    baseline: &BaselineChart,
    kind: PlayerKind,
) -> Result<BuiltChart, CardError> {
    let my_adv = advantages_per_20(candidate.command, baseline.command, kind);
    if my_adv <= 0.0 {
        return Err(CardError::Config(format!(
            "candidate command {} yields no advantages against baseline command {}",
            candidate.command, baseline.command
        )));
    }
    let opp_adv = CHART_SLOTS as f64 - my_adv;
    let denom_factor = rates.denominator as f64 / REFERENCE_DENOMINATOR;

    // Solve `rate = (my_adv*my + opp_adv*opp) * denom_factor` for my count.
    let solve =
        |rate: f64, outcome: Outcome| (rate / denom_factor - opp_adv * baseline.count(outcome)) / my_adv;

    let outs = candidate.outs;

    let so_raw = solve(rates.so, Outcome::Strikeout).min(outs as f64);
    let so = round_count(so_raw).min(outs);

    let mut bb = round_count(solve(rates.bb, Outcome::Walk));
    let double = round_count(solve(rates.double, Outcome::Double));
    let triple = round_count(solve(rates.triple, Outcome::Triple));
    let hr = round_count(solve(rates.hr, Outcome::HomeRun));

    // Advantage saturation guard: one runaway category (walks, in practice)
    // must not starve the rest of the 20-slot budget.
    let assigned = outs + bb + double + triple + hr;
    if assigned > CHART_SLOTS {
        let overflow = assigned - CHART_SLOTS;
        let reduced = bb.saturating_sub(overflow);
        warn!(
            command = candidate.command,
            outs, bb, reduced, "walk count overflows the slot budget, reducing"
        );
        bb = reduced;
    }

    // Split non-strikeout outs by the ground/air ratio; pitchers carve
    // popups out of the air outs by the infield-fly ratio.
    let non_so = outs - so;
    let gb = round_count(non_so as f64 * rates.go_ao_ratio / (1.0 + rates.go_ao_ratio)).min(non_so);
    let air = non_so - gb;
    let (pu, fb) = match kind {
        PlayerKind::Pitcher => {
            let pu = round_count(air as f64 * rates.if_fb_ratio).min(air);
            (pu, air - pu)
        }
        PlayerKind::Hitter => (0, air),
    };

    // Whatever the fixed categories leave over becomes singles; hitters
    // carve out single-plus slots from their stolen-base rate.
    let used = outs + bb + double + triple + hr;
    let remaining = CHART_SLOTS.saturating_sub(used);
    let (single, single_plus) = match kind {
        PlayerKind::Hitter => {
            let plus = ((rates.sb / 10.0).floor() as u32).min(remaining);
            (remaining - plus, plus)
        }
        PlayerKind::Pitcher => (remaining, 0),
    };

    // Stolen bases sit outside the slot budget: de-normalize the rate by the
    // share of the real season the denominator represents.
    let sb = match kind {
        PlayerKind::Hitter => round_count(rates.sb / (rates.denominator as f64 / rates.pa)),
        PlayerKind::Pitcher => 0,
    };

    let chart = Chart {
        command: candidate.command,
        outs,
        so,
        gb,
        fb,
        pu,
        bb,
        single,
        single_plus,
        double,
        triple,
        hr,
        sb,
    };

    let projection = project(&chart, baseline, my_adv, rates.denominator);

    Ok(BuiltChart { chart, projection })
}

/// Reconstruct per-denominator performance from a finished chart.
fn project(chart: &Chart, baseline: &BaselineChart, my_adv: f64, denominator: u32) -> Projection {
    let opp_adv = CHART_SLOTS as f64 - my_adv;
    let denom_factor = denominator as f64 / REFERENCE_DENOMINATOR;
    let occ = |mine: u32, outcome: Outcome| {
        (my_adv * mine as f64 + opp_adv * baseline.count(outcome)) * denom_factor
    };

    let singles = occ(chart.single, Outcome::Single) + occ(chart.single_plus, Outcome::SinglePlus);
    let doubles = occ(chart.double, Outcome::Double);
    let triples = occ(chart.triple, Outcome::Triple);
    let hr = occ(chart.hr, Outcome::HomeRun);
    let bb = occ(chart.bb, Outcome::Walk);
    let so = occ(chart.so, Outcome::Strikeout);

    let h = singles + doubles + triples + hr;
    let pa = denominator as f64;
    let ab = pa - bb;
    let avg = if ab > 0.0 { h / ab } else { 0.0 };
    let obp = (h + bb) / pa;
    let slg = if ab > 0.0 {
        (singles + 2.0 * doubles + 3.0 * triples + 4.0 * hr) / ab
    } else {
        0.0
    };

    Projection {
        denominator,
        h,
        bb,
        so,
        single: singles,
        double: doubles,
        triple: triples,
        hr,
        avg,
        obp,
        slg,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Set-profile loading and validation. A profile is the versioned, read-only
// configuration bundle (candidate list, baseline opponent chart, weights,
// percentile ranges, chart ordering) that parameterizes the card engine
// without changing its logic.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::chart::{BaselineChart, Candidate, Outcome};
use crate::statline::{PlayerKind, Position};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse profile {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },
}

fn validation(field: &str, message: impl Into<String>) -> ProfileError {
    ProfileError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Weight and range tables
// ---------------------------------------------------------------------------

/// Per-category weights for the accuracy score. Hits, on-base, and slugging
/// are typically weighted several times above the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct AccuracyWeights {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub h: f64,
    pub hr: f64,
    pub so: f64,
}

/// Point-value weights: how many points a full percentile in each category
/// is worth.
#[derive(Debug, Clone, Deserialize)]
pub struct PointWeights {
    pub obp: f64,
    pub avg: f64,
    pub slg: f64,
    pub speed_or_ip: f64,
    pub hr: f64,
    pub defense: f64,
}

/// Min/max bounds a stat is percentiled against. `invert` flips the
/// orientation (pitcher profiles mark rate stats where lower is better).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PercentileRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub invert: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PercentileRanges {
    pub obp: PercentileRange,
    pub avg: PercentileRange,
    pub slg: PercentileRange,
    pub hr_rate: PercentileRange,
    pub speed: PercentileRange,
    pub ip: PercentileRange,
}

// ---------------------------------------------------------------------------
// Chart extension ladders
// ---------------------------------------------------------------------------

/// One breakpoint of an extension ladder: rates at or above `min_rate`
/// place the category's range start at `start`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LadderStep {
    pub min_rate: f64,
    pub start: u32,
}

/// Profile-declared thresholds for extending a chart past slot 20. The
/// breakpoints are published-set approximations and deliberately stay data,
/// not formulas.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionRule {
    pub hr_ladder: Vec<LadderStep>,
    pub double_ladder: Vec<LadderStep>,
}

impl ExtensionRule {
    /// Resolve a ladder against a per-denominator rate: first step whose
    /// `min_rate` the rate reaches wins. Validation guarantees the last
    /// step is a catch-all at 0.0.
    pub fn lookup(ladder: &[LadderStep], rate: f64) -> u32 {
        ladder
            .iter()
            .find(|step| rate >= step.min_rate)
            .or_else(|| ladder.last())
            .map(|step| step.start)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// The assembled profile
// ---------------------------------------------------------------------------

/// Immutable configuration for one set and player kind. Supplied externally;
/// the engine never derives or mutates it.
#[derive(Debug, Clone)]
pub struct ContextProfile {
    pub set: String,
    pub player_kind: PlayerKind,
    /// Plate-appearance base every rate is normalized to.
    pub denominator: u32,
    /// Standard full-season PA used when scaling projections for valuation.
    pub season_pa: u32,
    pub candidates: Vec<Candidate>,
    pub baseline: BaselineChart,
    pub accuracy_weights: AccuracyWeights,
    pub point_weights: PointWeights,
    pub ranges: PercentileRanges,
    pub defense_max: HashMap<Position, f64>,
    pub chart_order: Vec<Outcome>,
    pub extension: Option<ExtensionRule>,
}

// ---------------------------------------------------------------------------
// Raw TOML file structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProfileFile {
    profile: ProfileSection,
    baseline: BaselineChart,
    #[serde(default)]
    candidates: Vec<Candidate>,
    accuracy_weights: AccuracyWeights,
    point_weights: PointWeights,
    ranges: PercentileRanges,
    #[serde(default)]
    defense_max: HashMap<String, f64>,
    extension: Option<ExtensionRule>,
}

#[derive(Debug, Deserialize)]
struct ProfileSection {
    set: String,
    player_kind: PlayerKind,
    denominator: u32,
    season_pa: u32,
    chart_order: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate a profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<ContextProfile, ProfileError> {
    let text = std::fs::read_to_string(path).map_err(|_| ProfileError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    parse_profile(&text, path)
}

/// Parse and validate a profile from TOML text (used by tests and embedded
/// profiles).
pub fn profile_from_str(text: &str) -> Result<ContextProfile, ProfileError> {
    parse_profile(text, Path::new("<inline>"))
}

fn parse_profile(text: &str, path: &Path) -> Result<ContextProfile, ProfileError> {
    let file: ProfileFile = toml::from_str(text).map_err(|e| ProfileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    assemble(file)
}

fn assemble(file: ProfileFile) -> Result<ContextProfile, ProfileError> {
    let mut chart_order = Vec::with_capacity(file.profile.chart_order.len());
    for label in &file.profile.chart_order {
        let outcome = Outcome::from_label(label)
            .ok_or_else(|| validation("profile.chart_order", format!("unknown outcome label '{label}'")))?;
        chart_order.push(outcome);
    }

    let mut defense_max = HashMap::with_capacity(file.defense_max.len());
    for (key, value) in &file.defense_max {
        let position = Position::from_label(key)
            .ok_or_else(|| validation("defense_max", format!("unknown position label '{key}'")))?;
        defense_max.insert(position, *value);
    }

    let profile = ContextProfile {
        set: file.profile.set,
        player_kind: file.profile.player_kind,
        denominator: file.profile.denominator,
        season_pa: file.profile.season_pa,
        candidates: file.candidates,
        baseline: file.baseline,
        accuracy_weights: file.accuracy_weights,
        point_weights: file.point_weights,
        ranges: file.ranges,
        defense_max,
        chart_order,
        extension: file.extension,
    };

    validate(&profile)?;

    Ok(profile)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Outcome categories a hitter chart order must cover so every slot the
/// builder can assign has a rendered range.
const HITTER_REQUIRED: &[Outcome] = &[
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

const PITCHER_REQUIRED: &[Outcome] = &[
    Outcome::Popup,
    Outcome::Strikeout,
    Outcome::GroundOut,
    Outcome::FlyOut,
    Outcome::Walk,
    Outcome::Single,
    Outcome::Double,
    Outcome::Triple,
    Outcome::HomeRun,
];

fn validate(profile: &ContextProfile) -> Result<(), ProfileError> {
    if profile.denominator == 0 {
        return Err(validation("profile.denominator", "must be greater than 0"));
    }
    if profile.season_pa == 0 {
        return Err(validation("profile.season_pa", "must be greater than 0"));
    }
    if profile.candidates.is_empty() {
        return Err(validation("candidates", "at least one (command, outs) pair is required"));
    }
    for candidate in &profile.candidates {
        if candidate.outs > 20 {
            return Err(validation(
                "candidates",
                format!("outs {} exceeds the 20-slot chart", candidate.outs),
            ));
        }
    }

    // Accuracy weights must all be positive: a zero weight silently drops a
    // category from the score.
    let aw = &profile.accuracy_weights;
    let accuracy_fields: &[(&str, f64)] = &[
        ("accuracy_weights.avg", aw.avg),
        ("accuracy_weights.obp", aw.obp),
        ("accuracy_weights.slg", aw.slg),
        ("accuracy_weights.h", aw.h),
        ("accuracy_weights.hr", aw.hr),
        ("accuracy_weights.so", aw.so),
    ];
    for (name, value) in accuracy_fields {
        if !value.is_finite() || *value <= 0.0 {
            return Err(validation(name, format!("must be > 0, got {value}")));
        }
    }

    // Point weights may be zero (a pitcher profile has no defense term) but
    // never negative.
    let pw = &profile.point_weights;
    let point_fields: &[(&str, f64)] = &[
        ("point_weights.obp", pw.obp),
        ("point_weights.avg", pw.avg),
        ("point_weights.slg", pw.slg),
        ("point_weights.speed_or_ip", pw.speed_or_ip),
        ("point_weights.hr", pw.hr),
        ("point_weights.defense", pw.defense),
    ];
    for (name, value) in point_fields {
        if !value.is_finite() || *value < 0.0 {
            return Err(validation(name, format!("must be >= 0, got {value}")));
        }
    }

    let r = &profile.ranges;
    let range_fields: &[(&str, PercentileRange)] = &[
        ("ranges.obp", r.obp),
        ("ranges.avg", r.avg),
        ("ranges.slg", r.slg),
        ("ranges.hr_rate", r.hr_rate),
        ("ranges.speed", r.speed),
        ("ranges.ip", r.ip),
    ];
    for (name, range) in range_fields {
        if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
            return Err(validation(
                name,
                format!("min must be below max, got [{}, {}]", range.min, range.max),
            ));
        }
    }

    for (position, max) in &profile.defense_max {
        if !max.is_finite() || *max <= 0.0 {
            return Err(validation(
                "defense_max",
                format!("maximum for {position} must be > 0, got {max}"),
            ));
        }
    }

    validate_chart_order(profile)?;

    if let Some(extension) = &profile.extension {
        // Every extended start must sit past the 20-slot chart; a lower
        // start could never be reached.
        validate_ladder("extension.hr_ladder", &extension.hr_ladder, 21)?;
        validate_ladder("extension.double_ladder", &extension.double_ladder, 21)?;
    }

    Ok(())
}

fn validate_chart_order(profile: &ContextProfile) -> Result<(), ProfileError> {
    let order = &profile.chart_order;
    for (i, outcome) in order.iter().enumerate() {
        if order[..i].contains(outcome) {
            return Err(validation(
                "profile.chart_order",
                format!("duplicate outcome '{outcome}'"),
            ));
        }
    }
    let required = match profile.player_kind {
        PlayerKind::Hitter => HITTER_REQUIRED,
        PlayerKind::Pitcher => PITCHER_REQUIRED,
    };
    for outcome in required {
        if !order.contains(outcome) {
            return Err(validation(
                "profile.chart_order",
                format!("missing required outcome '{outcome}'"),
            ));
        }
    }
    Ok(())
}

fn validate_ladder(field: &str, ladder: &[LadderStep], min_start: u32) -> Result<(), ProfileError> {
    if ladder.is_empty() {
        return Err(validation(field, "must declare at least one step"));
    }
    match ladder.last() {
        Some(last) if last.min_rate == 0.0 => {}
        _ => {
            return Err(validation(
                field,
                "last step must be a catch-all with min_rate = 0.0",
            ))
        }
    }
    for window in ladder.windows(2) {
        if window[1].min_rate >= window[0].min_rate {
            return Err(validation(field, "steps must be in descending min_rate order"));
        }
    }
    for step in ladder {
        if step.start < min_start {
            return Err(validation(
                field,
                format!("start slot {} is below the minimum {min_start}", step.start),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Test fixtures shared across the crate's unit tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

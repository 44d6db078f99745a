// Season statline input: the immutable record the card pipeline consumes,
// plus CSV loading for file-backed statline providers.
//
// The core is agnostic to how a statline was obtained (stats API, cache,
// hand-entered file); this module only defines the required fields and a
// CSV reader for them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Player kind and positions
// ---------------------------------------------------------------------------

/// Which side of the resolution a card is solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Hitter,
    Pitcher,
}

/// Positions a card can carry. Pitchers use the starter/reliever roles;
/// everything else is a fielding position with a defensive rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    Infield,
    LeftRightField,
    CenterField,
    Outfield,
    DesignatedHitter,
    Starter,
    Reliever,
}

impl Position {
    /// Parse a position label as it appears in statline files and profile
    /// defense tables.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "C" | "CA" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::Shortstop),
            "IF" => Some(Position::Infield),
            "LF/RF" | "LFRF" => Some(Position::LeftRightField),
            "CF" => Some(Position::CenterField),
            "OF" => Some(Position::Outfield),
            "DH" => Some(Position::DesignatedHitter),
            "STARTER" | "SP" => Some(Position::Starter),
            "RELIEVER" | "RP" => Some(Position::Reliever),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::Shortstop => "SS",
            Position::Infield => "IF",
            Position::LeftRightField => "LF/RF",
            Position::CenterField => "CF",
            Position::Outfield => "OF",
            Position::DesignatedHitter => "DH",
            Position::Starter => "STARTER",
            Position::Reliever => "RELIEVER",
        }
    }

    /// Whether this is a pitching role rather than a fielding position.
    pub fn is_pitching_role(&self) -> bool {
        matches!(self, Position::Starter | Position::Reliever)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One assigned position with its appearance count and defensive rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRating {
    pub position: Position,
    pub games: u32,
    pub rating: f64,
}

// ---------------------------------------------------------------------------
// SeasonStatline
// ---------------------------------------------------------------------------

/// One season of real statistics. Created once per evaluation, never mutated.
///
/// Pitcher seasons use PA as batters faced; `singles`..`home_runs` are the
/// hits allowed split. Hitter-only fields are zero for pitchers and vice
/// versa.
#[derive(Debug, Clone, Serialize)]
pub struct SeasonStatline {
    pub name: String,
    pub year: u32,
    pub pa: u32,
    pub ab: u32,
    pub h: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub bb: u32,
    pub so: u32,
    pub sb: u32,
    pub sh: u32,
    pub go_ao_ratio: f64,
    pub if_fb_ratio: f64,
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    // pitchers
    pub ip: f64,
    pub games_started: u32,
    pub saves: u32,
    pub wins: u32,
    // hitters
    pub sprint_speed: f64,
    pub positions: Vec<PositionRating>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StatlineError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Statline CSV row. Counting stats are f64 so multi-year aggregates with
/// fractional averages parse; extra columns are absorbed by the flatten map.
/// POS encodes assigned positions as `LABEL:games:rating` triples joined
/// with `;` (e.g. `SS:140:5;2B:20:3`).
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawStatline {
    Name: String,
    Year: u32,
    PA: f64,
    AB: f64,
    H: f64,
    #[serde(rename = "1B")]
    B1: f64,
    #[serde(rename = "2B")]
    B2: f64,
    #[serde(rename = "3B")]
    B3: f64,
    HR: f64,
    BB: f64,
    #[serde(alias = "K")]
    SO: f64,
    SB: f64,
    #[serde(default)]
    SH: f64,
    #[serde(rename = "GO_AO")]
    GO_AO: f64,
    #[serde(rename = "IF_FB", default)]
    IF_FB: f64,
    #[serde(alias = "BA")]
    AVG: f64,
    OBP: f64,
    SLG: f64,
    #[serde(default)]
    IP: f64,
    #[serde(default)]
    GS: f64,
    #[serde(default)]
    SV: f64,
    #[serde(default)]
    W: f64,
    #[serde(default)]
    SPD: f64,
    #[serde(default)]
    POS: String,
    /// Absorb any extra columns the provider includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns true if all given f64 values are finite (not NaN or Infinity).
fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Parse a `LABEL:games:rating` triple list. Unknown labels or malformed
/// segments invalidate the whole row so a typo never silently drops a
/// position from the valuation.
fn parse_positions(field: &str) -> Option<Vec<PositionRating>> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    let mut out = Vec::new();
    for segment in trimmed.split(';') {
        let mut parts = segment.trim().split(':');
        let position = Position::from_label(parts.next()?)?;
        let games = parts.next()?.trim().parse::<u32>().ok()?;
        let rating = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() || !rating.is_finite() {
            return None;
        }
        out.push(PositionRating {
            position,
            games,
            rating,
        });
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_statlines_from_reader<R: Read>(rdr: R) -> Result<Vec<SeasonStatline>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut statlines = Vec::new();
    for result in reader.deserialize::<RawStatline>() {
        match result {
            Ok(raw) => {
                let counts = [
                    raw.PA, raw.AB, raw.H, raw.B1, raw.B2, raw.B3, raw.HR, raw.BB, raw.SO,
                    raw.SB, raw.SH, raw.GS, raw.SV, raw.W,
                ];
                if !all_finite(&counts)
                    || !all_finite(&[raw.GO_AO, raw.IF_FB, raw.AVG, raw.OBP, raw.SLG, raw.IP, raw.SPD])
                {
                    warn!("skipping statline '{}': non-finite value", raw.Name.trim());
                    continue;
                }
                if counts.iter().any(|v| *v < 0.0) {
                    warn!("skipping statline '{}': negative counting stat", raw.Name.trim());
                    continue;
                }
                let Some(positions) = parse_positions(&raw.POS) else {
                    warn!(
                        "skipping statline '{}': malformed POS field '{}'",
                        raw.Name.trim(),
                        raw.POS
                    );
                    continue;
                };
                statlines.push(SeasonStatline {
                    name: raw.Name.trim().to_string(),
                    year: raw.Year,
                    pa: raw.PA.round() as u32,
                    ab: raw.AB.round() as u32,
                    h: raw.H.round() as u32,
                    singles: raw.B1.round() as u32,
                    doubles: raw.B2.round() as u32,
                    triples: raw.B3.round() as u32,
                    home_runs: raw.HR.round() as u32,
                    bb: raw.BB.round() as u32,
                    so: raw.SO.round() as u32,
                    sb: raw.SB.round() as u32,
                    sh: raw.SH.round() as u32,
                    go_ao_ratio: raw.GO_AO,
                    if_fb_ratio: raw.IF_FB,
                    avg: raw.AVG,
                    obp: raw.OBP,
                    slg: raw.SLG,
                    ip: raw.IP,
                    games_started: raw.GS.round() as u32,
                    saves: raw.SV.round() as u32,
                    wins: raw.W.round() as u32,
                    sprint_speed: raw.SPD,
                    positions,
                });
            }
            Err(e) => {
                warn!("skipping malformed statline row: {}", e);
            }
        }
    }
    Ok(statlines)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load season statlines from a CSV file. Malformed rows are skipped with a
/// warning; an entirely empty result is a validation error.
pub fn load_statlines(path: &Path) -> Result<Vec<SeasonStatline>, StatlineError> {
    let file = std::fs::File::open(path).map_err(|e| StatlineError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let statlines = load_statlines_from_reader(file).map_err(|e| StatlineError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if statlines.is_empty() {
        return Err(StatlineError::Validation(
            "statline CSV produced zero valid rows".into(),
        ));
    }
    Ok(statlines)
}

// ---------------------------------------------------------------------------
// Test fixtures shared across the crate's unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// The reference hitter season: 600 PA, 150 H (100/30/5/15), 60 BB,
    /// 120 SO, 10 SB.
    pub fn make_hitter_statline() -> SeasonStatline {
        SeasonStatline {
            name: "Test Hitter".into(),
            year: 2004,
            pa: 600,
            ab: 540,
            h: 150,
            singles: 100,
            doubles: 30,
            triples: 5,
            home_runs: 15,
            bb: 60,
            so: 120,
            sb: 10,
            sh: 0,
            go_ao_ratio: 1.0,
            if_fb_ratio: 0.0,
            avg: 0.272,
            obp: 0.338,
            slg: 0.460,
            ip: 0.0,
            games_started: 0,
            saves: 0,
            wins: 0,
            sprint_speed: 27.0,
            positions: vec![PositionRating {
                position: Position::Shortstop,
                games: 140,
                rating: 4.0,
            }],
        }
    }

    /// A durable starting pitcher season: 820 batters faced over 200 IP.
    pub fn make_pitcher_statline() -> SeasonStatline {
        SeasonStatline {
            name: "Test Pitcher".into(),
            year: 2004,
            pa: 820,
            ab: 760,
            h: 180,
            singles: 120,
            doubles: 40,
            triples: 5,
            home_runs: 15,
            bb: 50,
            so: 220,
            sb: 0,
            sh: 0,
            go_ao_ratio: 1.2,
            if_fb_ratio: 0.2,
            avg: 0.237,
            obp: 0.281,
            slg: 0.362,
            ip: 200.0,
            games_started: 32,
            saves: 0,
            wins: 15,
            sprint_speed: 0.0,
            positions: vec![PositionRating {
                position: Position::Starter,
                games: 32,
                rating: 0.0,
            }],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

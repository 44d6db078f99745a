// Card generator entry point.
//
// Flow:
// 1. Initialize tracing (log to stderr, JSON result goes to stdout)
// 2. Load the set profile
// 3. Load the statline CSV and pick the requested player
// 4. Build the card at the requested ranking offset
// 5. Print the card as JSON

use cardsmith::engine;
use cardsmith::profile;
use cardsmith::statline;

use anyhow::{bail, Context};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing on stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!(
            "usage: {} <profile.toml> <statlines.csv> [player-name] [offset]",
            args.first().map(String::as_str).unwrap_or("cardsmith")
        );
    }
    let profile_path = Path::new(&args[1]);
    let statline_path = Path::new(&args[2]);
    let player_name = args.get(3).map(String::as_str);
    let offset: usize = match args.get(4) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid ranking offset '{raw}'"))?,
        None => 0,
    };

    // 2. Load the set profile
    let profile = profile::load_profile(profile_path)
        .with_context(|| format!("failed to load profile {}", profile_path.display()))?;
    info!(
        "Profile loaded: set={}, kind={:?}, {} candidates",
        profile.set,
        profile.player_kind,
        profile.candidates.len()
    );

    // 3. Load statlines and pick the player
    let statlines = statline::load_statlines(statline_path)
        .with_context(|| format!("failed to load statlines {}", statline_path.display()))?;
    info!("Loaded {} statlines", statlines.len());

    let season = match player_name {
        Some(name) => statlines
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .with_context(|| format!("no statline for player '{name}'"))?,
        None => &statlines[0],
    };

    // 4. Build the card
    let card = engine::build_card(season, &profile, profile.player_kind, offset)
        .with_context(|| format!("failed to build card for '{}'", season.name))?;

    // 5. Print it
    let json = serde_json::to_string_pretty(&card).context("failed to serialize card")?;
    println!("{json}");

    Ok(())
}

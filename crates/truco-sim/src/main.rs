use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::Level;

use truco_sim::logging::init_logging;
use truco_sim::runner::{PolicyKind, SimConfig, run_matches};

/// Deterministic policy-vs-policy match simulator for Truco.
#[derive(Debug, Parser)]
#[command(
    name = "truco-sim",
    author,
    version,
    about = "Deterministic Truco match simulator"
)]
struct Cli {
    /// Number of matches to play.
    #[arg(long, default_value_t = 100)]
    matches: usize,

    /// Table size (2, 4 or 6 seats, alternating teams).
    #[arg(long, default_value_t = 2)]
    players: u8,

    /// Match target score (15 or 30 in standard play).
    #[arg(long, default_value_t = 30)]
    target: u8,

    /// Seed for the per-match seed stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Policy for team A (even seats): heuristic or random.
    #[arg(long, default_value = "heuristic")]
    team_a: PolicyKind,

    /// Policy for team B (odd seats): heuristic or random.
    #[arg(long, default_value = "random")]
    team_b: PolicyKind,

    /// Write per-match JSONL reports here instead of stdout.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Log level for stderr diagnostics (RUST_LOG overrides).
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = SimConfig {
        matches: cli.matches,
        players: cli.players,
        target: cli.target,
        seed: cli.seed,
        team_a: cli.team_a,
        team_b: cli.team_b,
    };

    let mut writer: Box<dyn Write> = match cli.out.as_ref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating report file at {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let summary = run_matches(&config, &mut writer)?;
    writer.flush()?;

    eprintln!(
        "Simulation complete: {} matches over {} rounds: team A ({}) {} wins, team B ({}) {} wins",
        summary.matches_played,
        summary.rounds_total,
        config.team_a,
        summary.wins[0],
        config.team_b,
        summary.wins[1],
    );

    Ok(())
}

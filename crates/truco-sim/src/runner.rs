use std::fmt;
use std::io::Write;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use truco_bot::{HeuristicPolicy, Policy, PolicyContext, RandomPolicy};
use truco_core::game::match_state::MatchState;
use truco_core::game::observer::{ActionRecord, ActionSink, NullSink, RoundSession};
use truco_core::model::round::RoundError;
use truco_core::model::seat::{Seat, TABLE_SIZES};
use truco_core::model::team::TeamId;

/// Which bot sits on a team. Both seats of a team run the same policy
/// kind, each with its own RNG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Heuristic,
    Random,
}

impl PolicyKind {
    fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Heuristic => Box::new(HeuristicPolicy::new()),
            PolicyKind::Random => Box::new(RandomPolicy::with_seed(seed)),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heuristic" => Ok(PolicyKind::Heuristic),
            "random" => Ok(PolicyKind::Random),
            other => Err(RunnerError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PolicyKind::Heuristic => "heuristic",
            PolicyKind::Random => "random",
        };
        write!(f, "{label}")
    }
}

/// One simulation run: `matches` seeded matches between two team policies.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub matches: usize,
    pub players: u8,
    pub target: u8,
    pub seed: u64,
    pub team_a: PolicyKind,
    pub team_b: PolicyKind,
}

impl SimConfig {
    fn validate(&self) -> Result<(), RunnerError> {
        if self.matches == 0 {
            return Err(RunnerError::NoMatches);
        }
        if !TABLE_SIZES.contains(&self.players) {
            return Err(RunnerError::InvalidTableSize {
                players: self.players,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("unknown policy '{0}' (expected 'heuristic' or 'random')")]
    UnknownPolicy(String),
    #[error("table size {players} is not supported (expected 2, 4 or 6)")]
    InvalidTableSize { players: u8 },
    #[error("number of matches must be greater than zero")]
    NoMatches,
    #[error("round rejected an action from {seat}: {source}")]
    Round {
        seat: Seat,
        #[source]
        source: RoundError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One JSONL row per finished match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub match_index: usize,
    pub seed: u64,
    pub rounds: u32,
    pub winner: TeamId,
    pub score_a: u8,
    pub score_b: u8,
    pub actions: u64,
    pub policy_a: String,
    pub policy_b: String,
}

/// Aggregate totals returned after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSummary {
    pub matches_played: usize,
    pub wins: [usize; 2],
    pub rounds_total: u32,
}

/// Counts accepted actions; the per-match `actions` column comes from here.
#[derive(Debug, Default)]
struct ActionCounter {
    accepted: u64,
}

impl ActionSink for ActionCounter {
    fn record(&mut self, _record: &ActionRecord) {
        self.accepted += 1;
    }
}

/// Run every configured match, streaming one JSON report line per match.
pub fn run_matches(config: &SimConfig, writer: &mut dyn Write) -> Result<SimSummary, RunnerError> {
    config.validate()?;

    let mut seed_stream = StdRng::seed_from_u64(config.seed);
    let mut summary = SimSummary {
        matches_played: 0,
        wins: [0, 0],
        rounds_total: 0,
    };

    for match_index in 0..config.matches {
        let match_seed = seed_stream.next_u64();
        let report = play_match(config, match_index, match_seed)?;

        serde_json::to_writer(&mut *writer, &report)?;
        writer.write_all(b"\n")?;

        summary.matches_played += 1;
        summary.wins[report.winner.index()] += 1;
        summary.rounds_total += report.rounds;

        event!(
            target: "truco_sim::match",
            Level::INFO,
            match_index,
            seed = match_seed,
            winner = %report.winner,
            rounds = report.rounds,
            score_a = report.score_a,
            score_b = report.score_b
        );
    }

    Ok(summary)
}

fn play_match(
    config: &SimConfig,
    match_index: usize,
    match_seed: u64,
) -> Result<MatchReport, RunnerError> {
    let mut state = MatchState::with_seed(config.players, config.target, match_seed);
    let mut policies: Vec<Box<dyn Policy>> = (0..config.players)
        .map(|index| {
            let kind = match Seat::new(index).team() {
                TeamId::A => config.team_a,
                TeamId::B => config.team_b,
            };
            kind.build(match_seed.wrapping_add(index as u64))
        })
        .collect();

    let mut rounds = 0u32;
    let mut sink = ActionCounter::default();
    let mut observer = NullSink;

    let winner = loop {
        if let Some(winner) = state.match_winner() {
            break winner;
        }

        while state.round().outcome().is_none() {
            let seat = state.round().expected_actor();
            let legal = state.round().legal_actions(seat);
            let action = {
                let ctx = PolicyContext {
                    seat,
                    round: state.round(),
                    legal: &legal,
                };
                policies[seat.index()].choose(&ctx)
            };

            let mut session = RoundSession::new(state.round_mut(), &mut sink, &mut observer);
            session
                .submit(seat, action)
                .map_err(|source| RunnerError::Round { seat, source })?;
        }

        if let Some(outcome) = state.finish_round_and_start_next() {
            rounds += 1;
            event!(
                target: "truco_sim::round",
                Level::DEBUG,
                match_index,
                round = rounds,
                trick_winner = %outcome.trick_winner,
                trick_points = outcome.trick_points,
                envido_points = outcome.envido_points
            );
        }
    };

    let scores = state.scores();
    Ok(MatchReport {
        match_index,
        seed: match_seed,
        rounds,
        winner,
        score_a: scores.score(TeamId::A),
        score_b: scores.score(TeamId::B),
        actions: sink.accepted,
        policy_a: config.team_a.to_string(),
        policy_b: config.team_b.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{PolicyKind, RunnerError, SimConfig, run_matches};

    fn config() -> SimConfig {
        SimConfig {
            matches: 2,
            players: 2,
            target: 15,
            seed: 7,
            team_a: PolicyKind::Heuristic,
            team_b: PolicyKind::Random,
        }
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            "heuristic".parse::<PolicyKind>().unwrap(),
            PolicyKind::Heuristic
        );
        assert_eq!("random".parse::<PolicyKind>().unwrap(), PolicyKind::Random);
        assert!(matches!(
            "alphazero".parse::<PolicyKind>(),
            Err(RunnerError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn rejects_bad_table_sizes() {
        let mut cfg = config();
        cfg.players = 3;
        let mut out = Vec::new();
        assert!(matches!(
            run_matches(&cfg, &mut out),
            Err(RunnerError::InvalidTableSize { players: 3 })
        ));
    }

    #[test]
    fn runs_to_completion_and_reports_every_match() {
        let cfg = config();
        let mut out = Vec::new();
        let summary = run_matches(&cfg, &mut out).unwrap();

        assert_eq!(summary.matches_played, 2);
        assert_eq!(summary.wins[0] + summary.wins[1], 2);
        assert!(summary.rounds_total >= 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let row: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(row["rounds"].as_u64().unwrap() >= 1);
            let best = row["score_a"].as_u64().unwrap().max(row["score_b"].as_u64().unwrap());
            assert!(best >= 15);
            assert_eq!(row["policy_a"], "heuristic");
            assert_eq!(row["policy_b"], "random");
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_rows() {
        let cfg = config();
        let mut first = Vec::new();
        let mut second = Vec::new();
        run_matches(&cfg, &mut first).unwrap();
        run_matches(&cfg, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn four_player_tables_also_finish() {
        let mut cfg = config();
        cfg.players = 4;
        cfg.matches = 1;
        let mut out = Vec::new();
        let summary = run_matches(&cfg, &mut out).unwrap();
        assert_eq!(summary.matches_played, 1);
    }
}

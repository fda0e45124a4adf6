use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TeamId {
    A = 0,
    B = 1,
}

impl TeamId {
    pub const BOTH: [TeamId; 2] = [TeamId::A, TeamId::B];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn other(self) -> TeamId {
        match self {
            TeamId::A => TeamId::B,
            TeamId::B => TeamId::A,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TeamId::A => "team A",
            TeamId::B => "team B",
        };
        f.write_str(label)
    }
}

/// Cumulative match score for the two teams plus the match target.
/// Recomputed state like falta payouts reads from here; round play never
/// mutates it mid-round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores {
    totals: [u8; 2],
    target: u8,
}

impl TeamScores {
    pub const fn new(target: u8) -> Self {
        Self {
            totals: [0; 2],
            target,
        }
    }

    pub const fn with_totals(target: u8, totals: [u8; 2]) -> Self {
        Self { totals, target }
    }

    pub const fn target(self) -> u8 {
        self.target
    }

    pub const fn score(self, team: TeamId) -> u8 {
        self.totals[team.index()]
    }

    pub const fn totals(self) -> [u8; 2] {
        self.totals
    }

    pub fn add(&mut self, team: TeamId, points: u8) {
        self.totals[team.index()] = self.totals[team.index()].saturating_add(points);
    }

    pub fn leader(self) -> Option<TeamId> {
        match self.totals[0].cmp(&self.totals[1]) {
            core::cmp::Ordering::Greater => Some(TeamId::A),
            core::cmp::Ordering::Less => Some(TeamId::B),
            core::cmp::Ordering::Equal => None,
        }
    }

    pub fn match_winner(self) -> Option<TeamId> {
        TeamId::BOTH
            .iter()
            .copied()
            .find(|team| self.score(*team) >= self.target)
    }

    pub fn points_to_win(self, team: TeamId) -> u8 {
        self.target.saturating_sub(self.score(team))
    }

    /// Falta Envido payout: whatever the better-placed team still needs to
    /// close out the match, never less than one point.
    pub fn falta_payout(self) -> u8 {
        let best = self.totals[0].max(self.totals[1]);
        self.target.saturating_sub(best).max(1)
    }
}

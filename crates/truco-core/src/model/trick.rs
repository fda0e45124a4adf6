use crate::model::card::Card;
use crate::model::seat::Seat;
use crate::model::team::TeamId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One "mano" of cards: a single play from every seat, in table order.
#[derive(Debug, Clone)]
pub struct Trick {
    leader: Seat,
    players: u8,
    plays: Vec<Play>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: Seat,
    pub card: Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrickOutcome {
    Won(TeamId),
    Parda,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrickError {
    TrickComplete,
    OutOfTurn { expected: Seat, actual: Seat },
    AlreadyPlayed(Seat),
}

impl fmt::Display for TrickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrickError::TrickComplete => write!(f, "trick already complete"),
            TrickError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            TrickError::AlreadyPlayed(seat) => {
                write!(f, "{seat} has already played this trick")
            }
        }
    }
}

impl std::error::Error for TrickError {}

impl Trick {
    pub fn new(leader: Seat, players: u8) -> Self {
        Self {
            leader,
            players,
            plays: Vec::with_capacity(players as usize),
        }
    }

    pub fn leader(&self) -> Seat {
        self.leader
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == self.players as usize
    }

    pub fn expected_seat(&self) -> Seat {
        self.plays
            .last()
            .map(|play| play.seat.next(self.players))
            .unwrap_or(self.leader)
    }

    pub fn play(&mut self, seat: Seat, card: Card) -> Result<(), TrickError> {
        if self.is_complete() {
            return Err(TrickError::TrickComplete);
        }

        if self.plays.iter().any(|play| play.seat == seat) {
            return Err(TrickError::AlreadyPlayed(seat));
        }

        let expected = self.expected_seat();
        if expected != seat {
            return Err(TrickError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        self.plays.push(Play { seat, card });
        Ok(())
    }

    /// Resolves a complete trick. Ties between plays of one team still win
    /// for that team; a cross-team tie on the first trick goes to mano's
    /// team if mano is among the tied plays, and is a parda otherwise.
    pub fn outcome(&self, mano: Seat, is_first_trick: bool) -> Option<TrickOutcome> {
        if !self.is_complete() {
            return None;
        }

        let top = self.plays.iter().map(|p| p.card.strength()).max()?;
        let tied: Vec<&Play> = self
            .plays
            .iter()
            .filter(|p| p.card.strength() == top)
            .collect();

        let first_team = tied[0].seat.team();
        if tied.iter().all(|p| p.seat.team() == first_team) {
            return Some(TrickOutcome::Won(first_team));
        }

        if is_first_trick && tied.iter().any(|p| p.seat == mano) {
            return Some(TrickOutcome::Won(mano.team()));
        }

        Some(TrickOutcome::Parda)
    }

    /// The seat that leads the next trick: the strongest play of the winning
    /// team, or the player who led a tied trick.
    pub fn next_leader(&self, mano: Seat, is_first_trick: bool) -> Option<Seat> {
        match self.outcome(mano, is_first_trick)? {
            TrickOutcome::Parda => Some(self.leader),
            TrickOutcome::Won(team) => {
                let top = self.plays.iter().map(|p| p.card.strength()).max()?;
                self.plays
                    .iter()
                    .find(|p| p.card.strength() == top && p.seat.team() == team)
                    .map(|p| p.seat)
            }
        }
    }
}

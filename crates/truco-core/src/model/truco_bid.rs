use crate::model::seat::Seat;
use crate::model::team::TeamId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Stake levels for the trick contest. Each level is worth one point more
/// than the previous accepted level when declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrucoLevel {
    Truco,
    ReTruco,
    ValeCuatro,
}

impl TrucoLevel {
    pub const fn accepted_points(self) -> u8 {
        match self {
            TrucoLevel::Truco => 2,
            TrucoLevel::ReTruco => 3,
            TrucoLevel::ValeCuatro => 4,
        }
    }

    pub const fn declined_points(self) -> u8 {
        self.accepted_points() - 1
    }

    pub const fn next(self) -> Option<TrucoLevel> {
        match self {
            TrucoLevel::Truco => Some(TrucoLevel::ReTruco),
            TrucoLevel::ReTruco => Some(TrucoLevel::ValeCuatro),
            TrucoLevel::ValeCuatro => None,
        }
    }
}

impl fmt::Display for TrucoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrucoLevel::Truco => "truco",
            TrucoLevel::ReTruco => "retruco",
            TrucoLevel::ValeCuatro => "vale cuatro",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrucoResolution {
    NotCalled,
    PendingResponse,
    Accepted,
    DeclinedResolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrucoError {
    NoCallPending,
    NotRespondingTeam { expected: TeamId, actual: TeamId },
    AwaitingOpponentResponse,
    SameTeamCannotReRaise,
    NoFurtherLevel,
    AlreadyResolved,
}

impl fmt::Display for TrucoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrucoError::NoCallPending => write!(f, "no truco call is awaiting a response"),
            TrucoError::NotRespondingTeam { expected, actual } => {
                write!(f, "{expected} must respond to the truco, not {actual}")
            }
            TrucoError::AwaitingOpponentResponse => {
                write!(f, "cannot call truco while awaiting the opponent's response")
            }
            TrucoError::SameTeamCannotReRaise => {
                write!(f, "only the opposing team may raise an accepted truco")
            }
            TrucoError::NoFurtherLevel => write!(f, "vale cuatro cannot be raised"),
            TrucoError::AlreadyResolved => write!(f, "truco has already been resolved"),
        }
    }
}

impl std::error::Error for TrucoError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrucoCallRecord {
    pub seat: Seat,
    pub level: TrucoLevel,
}

/// The truco bid state machine. Escalation alternates between teams: a
/// pending call may be answered with the next level, and an accepted level
/// may only be raised by the team that accepted it.
#[derive(Debug, Clone)]
pub struct TrucoState {
    calls: Vec<TrucoCallRecord>,
    resolution: TrucoResolution,
    pending_from: Option<TeamId>,
    accepted_level: Option<TrucoLevel>,
    winner: Option<TeamId>,
    points: u8,
}

impl TrucoState {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            resolution: TrucoResolution::NotCalled,
            pending_from: None,
            accepted_level: None,
            winner: None,
            points: 0,
        }
    }

    pub fn resolution(&self) -> TrucoResolution {
        self.resolution
    }

    pub fn calls(&self) -> &[TrucoCallRecord] {
        &self.calls
    }

    pub fn pending_from(&self) -> Option<TeamId> {
        self.pending_from
    }

    pub fn pending_level(&self) -> Option<TrucoLevel> {
        if self.is_pending() {
            self.calls.last().map(|record| record.level)
        } else {
            None
        }
    }

    pub fn accepted_level(&self) -> Option<TrucoLevel> {
        self.accepted_level
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.resolution, TrucoResolution::PendingResponse)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.resolution, TrucoResolution::Accepted)
    }

    pub fn is_declined(&self) -> bool {
        matches!(self.resolution, TrucoResolution::DeclinedResolved)
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    pub fn points(&self) -> u8 {
        self.points
    }

    pub fn last_caller(&self) -> Option<Seat> {
        self.calls.last().map(|record| record.seat)
    }

    /// The round's current at-stake value from the trick contest.
    pub fn stake(&self) -> u8 {
        self.accepted_level
            .map(TrucoLevel::accepted_points)
            .unwrap_or(1)
    }

    /// Points the opposing team takes if this team walks away now: the
    /// value a decline of the most recent call would have awarded, one if
    /// nothing was ever called.
    pub fn concession_points(&self) -> u8 {
        self.calls
            .last()
            .map(|record| record.level.declined_points().max(1))
            .unwrap_or(1)
    }

    fn next_level(&self) -> Result<TrucoLevel, TrucoError> {
        match self.calls.last() {
            None => Ok(TrucoLevel::Truco),
            Some(record) => record.level.next().ok_or(TrucoError::NoFurtherLevel),
        }
    }

    pub fn may_call(&self, team: TeamId) -> bool {
        match self.resolution {
            TrucoResolution::NotCalled => true,
            TrucoResolution::PendingResponse => self.pending_from == Some(team),
            TrucoResolution::Accepted => {
                // Only the team that did not make the accepted call may raise.
                self.calls.last().map(|record| record.seat.team()) != Some(team)
                    && self.next_level_exists()
            }
            TrucoResolution::DeclinedResolved => false,
        }
    }

    fn next_level_exists(&self) -> bool {
        self.calls
            .last()
            .map(|record| record.level.next().is_some())
            .unwrap_or(true)
    }

    /// Puts the next level on the table: an opening call, a counter-raise
    /// in response to a pending call, or a raise of an accepted level by
    /// the other team.
    pub fn call(&mut self, seat: Seat) -> Result<TrucoLevel, TrucoError> {
        let team = seat.team();
        match self.resolution {
            TrucoResolution::DeclinedResolved => return Err(TrucoError::AlreadyResolved),
            TrucoResolution::PendingResponse if self.pending_from != Some(team) => {
                return Err(TrucoError::AwaitingOpponentResponse);
            }
            TrucoResolution::Accepted
                if self.calls.last().map(|record| record.seat.team()) == Some(team) =>
            {
                return Err(TrucoError::SameTeamCannotReRaise);
            }
            _ => {}
        }

        let level = self.next_level()?;
        self.calls.push(TrucoCallRecord { seat, level });
        self.pending_from = Some(team.other());
        self.resolution = TrucoResolution::PendingResponse;
        Ok(level)
    }

    /// Locks the pending level in as the round's at-stake value.
    pub fn accept(&mut self, team: TeamId) -> Result<TrucoLevel, TrucoError> {
        self.require_responder(team)?;
        let level = self
            .calls
            .last()
            .map(|record| record.level)
            .ok_or(TrucoError::NoCallPending)?;
        self.accepted_level = Some(level);
        self.pending_from = None;
        self.resolution = TrucoResolution::Accepted;
        Ok(level)
    }

    /// Ends the round: the calling team takes the value of the previous
    /// accepted level, one if nothing was ever accepted.
    pub fn decline(&mut self, team: TeamId) -> Result<(TeamId, u8), TrucoError> {
        self.require_responder(team)?;
        let winner = self
            .calls
            .last()
            .map(|record| record.seat.team())
            .ok_or(TrucoError::NoCallPending)?;
        let points = self
            .accepted_level
            .map(TrucoLevel::accepted_points)
            .unwrap_or(1);
        self.pending_from = None;
        self.resolution = TrucoResolution::DeclinedResolved;
        self.winner = Some(winner);
        self.points = points;
        Ok((winner, points))
    }

    fn require_responder(&self, team: TeamId) -> Result<(), TrucoError> {
        match self.pending_from {
            Some(expected) if expected == team => Ok(()),
            Some(expected) => Err(TrucoError::NotRespondingTeam {
                expected,
                actual: team,
            }),
            None => Err(TrucoError::NoCallPending),
        }
    }
}

impl Default for TrucoState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{TrucoError, TrucoLevel, TrucoState};
    use crate::model::seat::Seat;
    use crate::model::team::TeamId;

    fn seat(i: u8) -> Seat {
        Seat::new(i)
    }

    #[test]
    fn levels_escalate_to_vale_cuatro() {
        assert_eq!(TrucoLevel::Truco.next(), Some(TrucoLevel::ReTruco));
        assert_eq!(TrucoLevel::ReTruco.next(), Some(TrucoLevel::ValeCuatro));
        assert_eq!(TrucoLevel::ValeCuatro.next(), None);
        assert_eq!(TrucoLevel::ValeCuatro.accepted_points(), 4);
        assert_eq!(TrucoLevel::ValeCuatro.declined_points(), 3);
    }

    #[test]
    fn counter_raise_is_a_legal_response() {
        let mut state = TrucoState::new();
        assert_eq!(state.call(seat(0)).unwrap(), TrucoLevel::Truco);
        // Team B answers truco with retruco instead of quiero.
        assert_eq!(state.call(seat(1)).unwrap(), TrucoLevel::ReTruco);
        assert_eq!(state.pending_from(), Some(TeamId::A));
        let level = state.accept(TeamId::A).unwrap();
        assert_eq!(level, TrucoLevel::ReTruco);
        assert_eq!(state.stake(), 3);
    }

    #[test]
    fn calling_team_cannot_call_again_while_pending() {
        let mut state = TrucoState::new();
        state.call(seat(0)).unwrap();
        assert_eq!(
            state.call(seat(2)),
            Err(TrucoError::AwaitingOpponentResponse)
        );
    }

    #[test]
    fn only_the_other_team_raises_an_accepted_level() {
        let mut state = TrucoState::new();
        state.call(seat(0)).unwrap();
        state.accept(TeamId::B).unwrap();
        assert!(!state.may_call(TeamId::A));
        assert!(state.may_call(TeamId::B));
        assert_eq!(state.call(seat(0)), Err(TrucoError::SameTeamCannotReRaise));
        assert_eq!(state.call(seat(1)).unwrap(), TrucoLevel::ReTruco);
    }

    #[test]
    fn decline_awards_previous_accepted_value() {
        let mut state = TrucoState::new();
        state.call(seat(0)).unwrap();
        state.accept(TeamId::B).unwrap();
        state.call(seat(1)).unwrap();
        let (winner, points) = state.decline(TeamId::A).unwrap();
        assert_eq!(winner, TeamId::B);
        assert_eq!(points, 2);
        assert!(state.is_declined());
    }

    #[test]
    fn declining_an_opening_truco_is_worth_one() {
        let mut state = TrucoState::new();
        state.call(seat(1)).unwrap();
        let (winner, points) = state.decline(TeamId::A).unwrap();
        assert_eq!(winner, TeamId::B);
        assert_eq!(points, 1);
    }

    #[test]
    fn vale_cuatro_cannot_be_raised() {
        let mut state = TrucoState::new();
        state.call(seat(0)).unwrap();
        state.call(seat(1)).unwrap();
        state.call(seat(0)).unwrap();
        state.accept(TeamId::B).unwrap();
        assert!(!state.may_call(TeamId::B));
        assert_eq!(state.call(seat(1)), Err(TrucoError::NoFurtherLevel));
    }

    #[test]
    fn concession_points_follow_the_most_recent_call() {
        let mut state = TrucoState::new();
        assert_eq!(state.concession_points(), 1);
        state.call(seat(0)).unwrap();
        assert_eq!(state.concession_points(), 1);
        // Walking away from an accepted truco forfeits what declining the
        // call would have: one point, not the accepted stake.
        state.accept(TeamId::B).unwrap();
        assert_eq!(state.concession_points(), 1);
        state.call(seat(1)).unwrap();
        assert_eq!(state.concession_points(), 2);
        state.accept(TeamId::A).unwrap();
        assert_eq!(state.concession_points(), 2);
    }
}

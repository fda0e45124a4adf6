use crate::model::seat::Seat;
use crate::model::team::TeamId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A single envido utterance. Chains of these normalize to an
/// [`EnvidoKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvidoCall {
    Envido,
    RealEnvido,
    FaltaEnvido,
}

/// The eleven legal call chains. Envido may be repeated once, Real Envido
/// tops any envido chain, Falta Envido tops everything and ends the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvidoKind {
    Envido,
    EnvidoEnvido,
    RealEnvido,
    EnvidoRealEnvido,
    EnvidoEnvidoRealEnvido,
    FaltaEnvido,
    EnvidoFaltaEnvido,
    EnvidoEnvidoFaltaEnvido,
    RealEnvidoFaltaEnvido,
    EnvidoRealEnvidoFaltaEnvido,
    EnvidoEnvidoRealEnvidoFaltaEnvido,
}

impl EnvidoKind {
    /// Normalizes `call` on top of the current chain; `None` when the
    /// escalation is illegal (e.g. plain Envido after Real Envido).
    pub const fn apply(current: Option<EnvidoKind>, call: EnvidoCall) -> Option<EnvidoKind> {
        use EnvidoCall as C;
        use EnvidoKind as K;
        match (current, call) {
            (None, C::Envido) => Some(K::Envido),
            (None, C::RealEnvido) => Some(K::RealEnvido),
            (None, C::FaltaEnvido) => Some(K::FaltaEnvido),
            (Some(K::Envido), C::Envido) => Some(K::EnvidoEnvido),
            (Some(K::Envido), C::RealEnvido) => Some(K::EnvidoRealEnvido),
            (Some(K::Envido), C::FaltaEnvido) => Some(K::EnvidoFaltaEnvido),
            (Some(K::EnvidoEnvido), C::RealEnvido) => Some(K::EnvidoEnvidoRealEnvido),
            (Some(K::EnvidoEnvido), C::FaltaEnvido) => Some(K::EnvidoEnvidoFaltaEnvido),
            (Some(K::RealEnvido), C::FaltaEnvido) => Some(K::RealEnvidoFaltaEnvido),
            (Some(K::EnvidoRealEnvido), C::FaltaEnvido) => Some(K::EnvidoRealEnvidoFaltaEnvido),
            (Some(K::EnvidoEnvidoRealEnvido), C::FaltaEnvido) => {
                Some(K::EnvidoEnvidoRealEnvidoFaltaEnvido)
            }
            _ => None,
        }
    }

    pub const fn ends_in_falta(self) -> bool {
        matches!(
            self,
            EnvidoKind::FaltaEnvido
                | EnvidoKind::EnvidoFaltaEnvido
                | EnvidoKind::EnvidoEnvidoFaltaEnvido
                | EnvidoKind::RealEnvidoFaltaEnvido
                | EnvidoKind::EnvidoRealEnvidoFaltaEnvido
                | EnvidoKind::EnvidoEnvidoRealEnvidoFaltaEnvido
        )
    }

    /// Points when accepted. Falta chains take the payout computed from the
    /// match score instead.
    pub const fn accepted_points(self, falta: u8) -> u8 {
        match self {
            EnvidoKind::Envido => 2,
            EnvidoKind::EnvidoEnvido => 4,
            EnvidoKind::RealEnvido => 3,
            EnvidoKind::EnvidoRealEnvido => 5,
            EnvidoKind::EnvidoEnvidoRealEnvido => 7,
            _ => falta,
        }
    }

    /// Points when declined: the accepted value of the chain before its
    /// last call, one for an opening call.
    pub const fn declined_points(self) -> u8 {
        match self {
            EnvidoKind::Envido | EnvidoKind::RealEnvido | EnvidoKind::FaltaEnvido => 1,
            EnvidoKind::EnvidoEnvido
            | EnvidoKind::EnvidoRealEnvido
            | EnvidoKind::EnvidoFaltaEnvido => 2,
            EnvidoKind::RealEnvidoFaltaEnvido => 3,
            EnvidoKind::EnvidoEnvidoRealEnvido | EnvidoKind::EnvidoEnvidoFaltaEnvido => 4,
            EnvidoKind::EnvidoRealEnvidoFaltaEnvido => 5,
            EnvidoKind::EnvidoEnvidoRealEnvidoFaltaEnvido => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvidoResolution {
    NotCalled,
    PendingResponse,
    Declaring,
    DeclinedResolved,
    Resolved,
}

/// What a player says during the point-declaration sub-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declaration {
    Points(u8),
    Pass,
    SonBuenas,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvidoError {
    WindowClosed,
    NoCallPending,
    NotRespondingTeam { expected: TeamId, actual: TeamId },
    CannotRaiseOwnCall,
    IllegalEscalation { call: EnvidoCall },
    NotDeclaring,
    DeclarationOutOfTurn { expected: Seat, actual: Seat },
    SonBuenasUnavailable,
    AlreadyResolved,
}

impl fmt::Display for EnvidoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvidoError::WindowClosed => write!(f, "envido can no longer be called this round"),
            EnvidoError::NoCallPending => write!(f, "no envido call is awaiting a response"),
            EnvidoError::NotRespondingTeam { expected, actual } => {
                write!(f, "{expected} must respond to the envido, not {actual}")
            }
            EnvidoError::CannotRaiseOwnCall => {
                write!(f, "a team cannot raise its own unanswered envido")
            }
            EnvidoError::IllegalEscalation { call } => {
                write!(f, "{call:?} does not escalate the current envido chain")
            }
            EnvidoError::NotDeclaring => write!(f, "envido is not in the declaration phase"),
            EnvidoError::DeclarationOutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to declare but got {actual}")
            }
            EnvidoError::SonBuenasUnavailable => {
                write!(f, "son buenas requires an opposing value on the table")
            }
            EnvidoError::AlreadyResolved => write!(f, "envido has already been resolved"),
        }
    }
}

impl std::error::Error for EnvidoError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvidoCallRecord {
    pub seat: Seat,
    pub call: EnvidoCall,
    pub kind: EnvidoKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestDeclaration {
    pub value: u8,
    pub team: TeamId,
    pub seat: Seat,
}

/// The point-declaration sub-machine. Who speaks next is a pure function
/// of the per-team unspoken seat lists and the current best value; no
/// scanning of play history.
#[derive(Debug, Clone)]
pub struct DeclarationState {
    unspoken: [Vec<Seat>; 2],
    best: Option<BestDeclaration>,
    turn: Seat,
    mano_team: TeamId,
    initiative: TeamId,
}

impl DeclarationState {
    pub fn new(mano: Seat, players: u8, initiative: TeamId) -> Self {
        let order = Seat::order_from(mano, players);
        let mut unspoken: [Vec<Seat>; 2] = [Vec::new(), Vec::new()];
        for seat in order {
            unspoken[seat.team().index()].push(seat);
        }
        Self {
            unspoken,
            best: None,
            turn: mano,
            mano_team: mano.team(),
            initiative,
        }
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn best(&self) -> Option<BestDeclaration> {
        self.best
    }

    fn takes_lead(&self, value: u8, team: TeamId) -> bool {
        match self.best {
            None => true,
            Some(best) => {
                value > best.value
                    || (value == best.value && team == self.mano_team && best.team != self.mano_team)
            }
        }
    }

    fn pop_unspoken(&mut self, seat: Seat) {
        let list = &mut self.unspoken[seat.team().index()];
        if let Some(index) = list.iter().position(|s| *s == seat) {
            list.remove(index);
        }
    }

    fn first_unspoken(&self, team: TeamId) -> Option<Seat> {
        self.unspoken[team.index()].first().copied()
    }

    /// Applies one declaration. Returns the winning team once the
    /// sub-machine resolves.
    pub fn declare(
        &mut self,
        seat: Seat,
        declaration: Declaration,
    ) -> Result<Option<TeamId>, EnvidoError> {
        if seat != self.turn {
            return Err(EnvidoError::DeclarationOutOfTurn {
                expected: self.turn,
                actual: seat,
            });
        }

        let team = seat.team();

        match declaration {
            Declaration::SonBuenas => match self.best {
                Some(best) if best.team != team => {
                    self.pop_unspoken(seat);
                    Ok(Some(best.team))
                }
                _ => Err(EnvidoError::SonBuenasUnavailable),
            },
            Declaration::Points(value) if self.takes_lead(value, team) => {
                self.pop_unspoken(seat);
                self.best = Some(BestDeclaration { value, team, seat });
                match self.first_unspoken(team.other()) {
                    Some(next) => {
                        self.turn = next;
                        Ok(None)
                    }
                    None => Ok(Some(team)),
                }
            }
            // A pass or a non-improving value keeps the word within the
            // declarer's own team.
            Declaration::Points(_) | Declaration::Pass => {
                self.pop_unspoken(seat);
                if let Some(next) = self.first_unspoken(team) {
                    self.turn = next;
                    return Ok(None);
                }
                if let Some(best) = self.best {
                    return Ok(Some(best.team));
                }
                if let Some(next) = self.first_unspoken(team.other()) {
                    self.turn = next;
                    return Ok(None);
                }
                // Seat exhaustion with nothing declared: fall back to the
                // team holding initiative.
                Ok(Some(self.initiative))
            }
        }
    }
}

/// The envido bid state machine.
#[derive(Debug, Clone)]
pub struct EnvidoState {
    chain: Vec<EnvidoCallRecord>,
    resolution: EnvidoResolution,
    pending_from: Option<TeamId>,
    window_open: bool,
    declaration: Option<DeclarationState>,
    winner: Option<TeamId>,
    points: u8,
}

impl EnvidoState {
    pub fn new() -> Self {
        Self {
            chain: Vec::new(),
            resolution: EnvidoResolution::NotCalled,
            pending_from: None,
            window_open: true,
            declaration: None,
            winner: None,
            points: 0,
        }
    }

    pub fn resolution(&self) -> EnvidoResolution {
        self.resolution
    }

    pub fn chain(&self) -> &[EnvidoCallRecord] {
        &self.chain
    }

    pub fn kind(&self) -> Option<EnvidoKind> {
        self.chain.last().map(|record| record.kind)
    }

    pub fn pending_from(&self) -> Option<TeamId> {
        self.pending_from
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.resolution, EnvidoResolution::PendingResponse)
    }

    pub fn is_declaring(&self) -> bool {
        matches!(self.resolution, EnvidoResolution::Declaring)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(
            self.resolution,
            EnvidoResolution::DeclinedResolved | EnvidoResolution::Resolved
        )
    }

    pub fn window_open(&self) -> bool {
        self.window_open
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    pub fn points(&self) -> u8 {
        self.points
    }

    pub fn declaration(&self) -> Option<&DeclarationState> {
        self.declaration.as_ref()
    }

    pub fn last_caller(&self) -> Option<Seat> {
        self.chain.last().map(|record| record.seat)
    }

    /// Permanently closes the calling window. Fired once a first-trick card
    /// lands beyond the opening seat, once trick 0 completes, or once Truco
    /// is accepted.
    pub fn close_window(&mut self) {
        self.window_open = false;
    }

    /// Whether `team` may currently put a call on the table: either nothing
    /// has been called yet, or it is answering the opposing team's call
    /// with a raise.
    pub fn may_call(&self, team: TeamId) -> bool {
        self.window_open
            && match self.resolution {
                EnvidoResolution::NotCalled => true,
                EnvidoResolution::PendingResponse => self.pending_from == Some(team),
                _ => false,
            }
    }

    pub fn call(&mut self, seat: Seat, call: EnvidoCall) -> Result<EnvidoKind, EnvidoError> {
        if self.is_resolved() || self.is_declaring() {
            return Err(EnvidoError::AlreadyResolved);
        }
        if !self.window_open {
            return Err(EnvidoError::WindowClosed);
        }

        let team = seat.team();
        if self.is_pending() && self.pending_from != Some(team) {
            return Err(EnvidoError::CannotRaiseOwnCall);
        }

        let kind = EnvidoKind::apply(self.kind(), call)
            .ok_or(EnvidoError::IllegalEscalation { call })?;

        self.chain.push(EnvidoCallRecord { seat, call, kind });
        self.pending_from = Some(team.other());
        self.resolution = EnvidoResolution::PendingResponse;
        Ok(kind)
    }

    /// Accepts the pending chain at `stake` points (falta already resolved
    /// by the caller) and opens the declaration sub-phase from mano.
    pub fn accept(&mut self, team: TeamId, stake: u8, mano: Seat, players: u8) -> Result<(), EnvidoError> {
        self.require_responder(team)?;
        let initiative = self
            .chain
            .last()
            .map(|record| record.seat.team())
            .unwrap_or(team.other());
        self.points = stake;
        self.pending_from = None;
        self.resolution = EnvidoResolution::Declaring;
        self.declaration = Some(DeclarationState::new(mano, players, initiative));
        Ok(())
    }

    /// Declines the pending chain: the last caller's team takes the
    /// declined value of the final call.
    pub fn decline(&mut self, team: TeamId) -> Result<(TeamId, u8), EnvidoError> {
        self.require_responder(team)?;
        let record = self.chain.last().copied().ok_or(EnvidoError::NoCallPending)?;
        let winner = record.seat.team();
        let points = record.kind.declined_points();
        self.pending_from = None;
        self.resolution = EnvidoResolution::DeclinedResolved;
        self.winner = Some(winner);
        self.points = points;
        Ok((winner, points))
    }

    /// Routes one declaration into the sub-machine; returns the winner and
    /// the points at stake once resolved.
    pub fn declare(
        &mut self,
        seat: Seat,
        declaration: Declaration,
    ) -> Result<Option<(TeamId, u8)>, EnvidoError> {
        let state = self
            .declaration
            .as_mut()
            .ok_or(EnvidoError::NotDeclaring)?;
        match state.declare(seat, declaration)? {
            Some(winner) => {
                self.resolution = EnvidoResolution::Resolved;
                self.winner = Some(winner);
                Ok(Some((winner, self.points)))
            }
            None => Ok(None),
        }
    }

    pub fn declaration_turn(&self) -> Option<Seat> {
        self.declaration.as_ref().map(|state| state.turn())
    }

    fn require_responder(&self, team: TeamId) -> Result<(), EnvidoError> {
        match self.pending_from {
            Some(expected) if expected == team => Ok(()),
            Some(expected) => Err(EnvidoError::NotRespondingTeam {
                expected,
                actual: team,
            }),
            None => Err(EnvidoError::NoCallPending),
        }
    }
}

impl Default for EnvidoState {
    fn default() -> Self {
        Self::new()
    }
}

use crate::model::action::{BidResponse, PlayerAction};
use crate::model::card::Card;
use crate::model::deck::{Deck, DeckError};
use crate::model::envido::{
    Declaration, EnvidoCall, EnvidoError, EnvidoKind, EnvidoState,
};
use crate::model::hand::{Hand, envido_total};
use crate::model::seat::Seat;
use crate::model::team::{TeamId, TeamScores};
use crate::model::trick::{Trick, TrickError, TrickOutcome};
use crate::model::truco_bid::{TrucoError, TrucoLevel, TrucoState};
use core::fmt;
use serde::{Deserialize, Serialize};

/// One round of Truco: three dealt cards per seat, up to three tricks, and
/// the two interleaved bid protocols. All cross-protocol effects flow
/// through this coordinator; the protocols never touch each other.
#[derive(Debug, Clone)]
pub struct RoundState {
    players: u8,
    mano: Seat,
    hands: Vec<Hand>,
    dealt: Vec<Vec<Card>>,
    played: Vec<Vec<Card>>,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    turn: Seat,
    interrupted_turn: Option<Seat>,
    envido_primero: bool,
    envido: EnvidoState,
    truco: TrucoState,
    scores: TeamScores,
    outcome: Option<RoundOutcome>,
    in_progress: bool,
}

/// Final score readout for a finished round. Trick points and envido
/// points are independent awards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub trick_winner: TeamId,
    pub trick_points: u8,
    pub envido_winner: Option<TeamId>,
    pub envido_points: u8,
}

impl RoundOutcome {
    pub fn points_for(&self, team: TeamId) -> u8 {
        let mut points = 0;
        if self.trick_winner == team {
            points += self.trick_points;
        }
        if self.envido_winner == Some(team) {
            points += self.envido_points;
        }
        points
    }
}

/// Emitted after every accepted transition, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    CardPlayed { seat: Seat, card: Card },
    TrickResolved { trick: u8, outcome: TrickOutcome, next_leader: Option<Seat> },
    EnvidoCalled { seat: Seat, kind: EnvidoKind },
    EnvidoAccepted { stake: u8 },
    EnvidoDeclined { winner: TeamId, points: u8 },
    PointsDeclared { seat: Seat, declaration: Declaration },
    EnvidoResolved { winner: TeamId, points: u8 },
    TrucoCalled { seat: Seat, level: TrucoLevel },
    TrucoAccepted { level: TrucoLevel, stake: u8 },
    TrucoDeclined { winner: TeamId, points: u8 },
    WentToDeck { seat: Seat },
    RoundResolved { outcome: RoundOutcome },
}

/// Rejection reasons. Every arm leaves the round untouched; `kind()`
/// separates bad moves from protocol misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    RoundOver,
    EngineBusy,
    UnknownSeat(Seat),
    OutOfTurn { expected: Seat, actual: Seat },
    CardNotInHand(Card),
    BidResponsePending,
    NotPieInitiative(Seat),
    WrongPoints { declared: u8, actual: u8 },
    Envido(EnvidoError),
    Truco(TrucoError),
    Trick(TrickError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundErrorKind {
    IllegalMove,
    ProtocolViolation,
}

impl RoundError {
    pub fn kind(&self) -> RoundErrorKind {
        match self {
            RoundError::UnknownSeat(_)
            | RoundError::OutOfTurn { .. }
            | RoundError::CardNotInHand(_)
            | RoundError::NotPieInitiative(_)
            | RoundError::WrongPoints { .. }
            | RoundError::Trick(_)
            | RoundError::Envido(EnvidoError::DeclarationOutOfTurn { .. }) => {
                RoundErrorKind::IllegalMove
            }
            _ => RoundErrorKind::ProtocolViolation,
        }
    }
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::RoundOver => write!(f, "the round is already resolved"),
            RoundError::EngineBusy => write!(f, "the round is already being advanced"),
            RoundError::UnknownSeat(seat) => write!(f, "{seat} is not at this table"),
            RoundError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to act but got {actual}")
            }
            RoundError::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            RoundError::BidResponsePending => {
                write!(f, "a bid is awaiting its response")
            }
            RoundError::NotPieInitiative(seat) => {
                write!(f, "{seat} does not hold envido initiative for their team")
            }
            RoundError::WrongPoints { declared, actual } => {
                write!(f, "declared {declared} points but the cards total {actual}")
            }
            RoundError::Envido(err) => write!(f, "{err}"),
            RoundError::Truco(err) => write!(f, "{err}"),
            RoundError::Trick(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RoundError {}

impl From<EnvidoError> for RoundError {
    fn from(err: EnvidoError) -> Self {
        RoundError::Envido(err)
    }
}

impl From<TrucoError> for RoundError {
    fn from(err: TrucoError) -> Self {
        RoundError::Truco(err)
    }
}

impl RoundState {
    /// Deals a fresh round: three cards to every seat in order from mano.
    pub fn deal(
        deck: &mut Deck,
        mano: Seat,
        players: u8,
        scores: TeamScores,
    ) -> Result<Self, DeckError> {
        let mut dealt = vec![Vec::new(); players as usize];
        for seat in Seat::order_from(mano, players) {
            dealt[seat.index()] = deck.deal(3)?;
        }
        Ok(Self::from_deal(dealt, mano, players, scores))
    }

    /// Builds a round from fixed hands, indexed by seat. Used by tests and
    /// by deterministic replays.
    pub fn from_hands(
        hands: Vec<[Card; 3]>,
        mano: Seat,
        scores: TeamScores,
    ) -> Self {
        let players = hands.len() as u8;
        let dealt = hands.into_iter().map(|cards| cards.to_vec()).collect();
        Self::from_deal(dealt, mano, players, scores)
    }

    fn from_deal(dealt: Vec<Vec<Card>>, mano: Seat, players: u8, scores: TeamScores) -> Self {
        let hands = dealt
            .iter()
            .map(|cards| Hand::with_cards(cards.clone()))
            .collect();
        Self {
            players,
            mano,
            hands,
            dealt,
            played: vec![Vec::new(); players as usize],
            current_trick: Trick::new(mano, players),
            trick_history: Vec::new(),
            turn: mano,
            interrupted_turn: None,
            envido_primero: false,
            envido: EnvidoState::new(),
            truco: TrucoState::new(),
            scores,
            outcome: None,
            in_progress: false,
        }
    }

    pub fn players(&self) -> u8 {
        self.players
    }

    pub fn mano(&self) -> Seat {
        self.mano
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn hand(&self, seat: Seat) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn dealt(&self, seat: Seat) -> &[Card] {
        &self.dealt[seat.index()]
    }

    pub fn played(&self, seat: Seat) -> &[Card] {
        &self.played[seat.index()]
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    pub fn trick_number(&self) -> u8 {
        self.trick_history.len() as u8
    }

    pub fn envido(&self) -> &EnvidoState {
        &self.envido
    }

    pub fn truco(&self) -> &TrucoState {
        &self.truco
    }

    pub fn scores(&self) -> TeamScores {
        self.scores
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn interrupted_turn(&self) -> Option<Seat> {
        self.interrupted_turn
    }

    /// Envido total of the cards dealt to `seat`, independent of what has
    /// been played since.
    pub fn envido_total(&self, seat: Seat) -> u8 {
        envido_total(&self.dealt[seat.index()])
    }

    /// Trick wins per team plus the parda count, over resolved tricks.
    pub fn trick_tally(&self) -> ([u8; 2], u8) {
        let mut wins = [0u8; 2];
        let mut pardas = 0u8;
        for (index, trick) in self.trick_history.iter().enumerate() {
            match trick.outcome(self.mano, index == 0) {
                Some(TrickOutcome::Won(team)) => wins[team.index()] += 1,
                Some(TrickOutcome::Parda) => pardas += 1,
                None => {}
            }
        }
        (wins, pardas)
    }

    /// Who must act next under the scheduling priority: envido declaration,
    /// envido response, truco response, then the normal play turn. Bid
    /// responses are spoken for a team by its pie.
    pub fn expected_actor(&self) -> Seat {
        if let Some(seat) = self.envido.declaration_turn() {
            return seat;
        }
        if let Some(team) = self.envido.pending_from() {
            return Seat::pie_of(team, self.mano, self.players);
        }
        if let Some(team) = self.truco.pending_from() {
            return Seat::pie_of(team, self.mano, self.players);
        }
        self.turn
    }

    /// Validates and applies one externally submitted action. Rejected
    /// actions mutate nothing; accepted ones return the transitions they
    /// caused, in order.
    pub fn apply(
        &mut self,
        seat: Seat,
        action: PlayerAction,
    ) -> Result<Vec<RoundEvent>, RoundError> {
        if self.outcome.is_some() {
            return Err(RoundError::RoundOver);
        }
        if seat.index() >= self.players as usize {
            return Err(RoundError::UnknownSeat(seat));
        }
        if self.in_progress {
            return Err(RoundError::EngineBusy);
        }
        self.in_progress = true;
        let result = self.apply_inner(seat, action);
        self.in_progress = false;
        result
    }

    fn apply_inner(
        &mut self,
        seat: Seat,
        action: PlayerAction,
    ) -> Result<Vec<RoundEvent>, RoundError> {
        match action {
            PlayerAction::PlayCard(card) => self.play_card(seat, card),
            PlayerAction::CallEnvido(call) => self.call_envido(seat, call),
            PlayerAction::RespondEnvido(response) => self.respond_envido(seat, response),
            PlayerAction::Declare(declaration) => self.declare(seat, declaration),
            PlayerAction::CallTruco => self.call_truco(seat),
            PlayerAction::RespondTruco(response) => self.respond_truco(seat, response),
            PlayerAction::GoToDeck => self.go_to_deck(seat),
        }
    }

    fn bid_pending(&self) -> bool {
        self.envido.is_pending() || self.envido.is_declaring() || self.truco.is_pending()
    }

    fn play_card(&mut self, seat: Seat, card: Card) -> Result<Vec<RoundEvent>, RoundError> {
        if self.bid_pending() {
            return Err(RoundError::BidResponsePending);
        }
        if seat != self.turn {
            return Err(RoundError::OutOfTurn {
                expected: self.turn,
                actual: seat,
            });
        }
        if !self.hands[seat.index()].contains(card) {
            return Err(RoundError::CardNotInHand(card));
        }

        self.current_trick.play(seat, card).map_err(RoundError::Trick)?;
        self.hands[seat.index()].remove(card);
        self.played[seat.index()].push(card);

        let mut events = vec![RoundEvent::CardPlayed { seat, card }];

        // Envido lives only until a first-trick card lands beyond the
        // opening seat.
        if self.trick_history.is_empty() && self.current_trick.plays().len() >= 2 {
            self.envido.close_window();
        }

        if self.current_trick.is_complete() {
            self.resolve_trick(&mut events);
        } else {
            self.turn = self.current_trick.expected_seat();
        }

        Ok(events)
    }

    fn resolve_trick(&mut self, events: &mut Vec<RoundEvent>) {
        let is_first = self.trick_history.is_empty();
        let outcome = self
            .current_trick
            .outcome(self.mano, is_first)
            .expect("complete trick resolves");
        let next_leader = self.current_trick.next_leader(self.mano, is_first);
        let trick_number = self.trick_number();

        let finished = std::mem::replace(
            &mut self.current_trick,
            Trick::new(next_leader.unwrap_or(self.mano), self.players),
        );
        self.trick_history.push(finished);
        self.envido.close_window();

        events.push(RoundEvent::TrickResolved {
            trick: trick_number,
            outcome,
            next_leader,
        });

        if let Some(winner) = self.trick_contest_winner() {
            self.finish(winner, self.truco.stake(), events);
        } else if let Some(leader) = next_leader {
            self.turn = leader;
        }
    }

    /// The round's trick-contest winner, if decided: two trick wins take it
    /// outright; after three tricks the higher count wins and mano's team
    /// breaks even splits (including all pardas).
    fn trick_contest_winner(&self) -> Option<TeamId> {
        let (wins, _) = self.trick_tally();
        if let Some(team) = TeamId::BOTH.iter().copied().find(|t| wins[t.index()] >= 2) {
            return Some(team);
        }
        if self.trick_history.len() < 3 {
            return None;
        }
        Some(match wins[0].cmp(&wins[1]) {
            core::cmp::Ordering::Greater => TeamId::A,
            core::cmp::Ordering::Less => TeamId::B,
            core::cmp::Ordering::Equal => self.mano.team(),
        })
    }

    fn finish(&mut self, trick_winner: TeamId, trick_points: u8, events: &mut Vec<RoundEvent>) {
        let outcome = RoundOutcome {
            trick_winner,
            trick_points,
            envido_winner: self.envido.winner(),
            envido_points: if self.envido.winner().is_some() {
                self.envido.points()
            } else {
                0
            },
        };
        self.outcome = Some(outcome);
        events.push(RoundEvent::RoundResolved { outcome });
    }

    fn call_envido(&mut self, seat: Seat, call: EnvidoCall) -> Result<Vec<RoundEvent>, RoundError> {
        if self.envido.is_declaring() {
            return Err(RoundError::BidResponsePending);
        }

        let team = seat.team();
        if self.truco.is_pending() {
            // "Envido primero": the team facing a truco call may still open
            // the envido, deferring the truco response until it resolves.
            if self.envido.kind().is_some() && !self.envido.is_pending() {
                return Err(RoundError::Envido(EnvidoError::AlreadyResolved));
            }
            if !self.envido.is_pending() && self.truco.pending_from() != Some(team) {
                return Err(RoundError::BidResponsePending);
            }
        }

        // Opening escalation initiative belongs to the team's pie in team
        // play; responses and Falta Envido are open to any seat.
        let opening = self.envido.kind().is_none();
        if opening
            && self.players >= 4
            && call != EnvidoCall::FaltaEnvido
            && seat != Seat::pie_of(team, self.mano, self.players)
        {
            return Err(RoundError::NotPieInitiative(seat));
        }

        let was_truco_pending = self.truco.is_pending();
        let kind = self.envido.call(seat, call)?;
        if opening && was_truco_pending {
            self.envido_primero = true;
        }
        if self.interrupted_turn.is_none() && !was_truco_pending {
            self.interrupted_turn = Some(self.turn);
        }

        Ok(vec![RoundEvent::EnvidoCalled { seat, kind }])
    }

    fn respond_envido(
        &mut self,
        seat: Seat,
        response: BidResponse,
    ) -> Result<Vec<RoundEvent>, RoundError> {
        let team = seat.team();
        match response {
            BidResponse::Quiero => {
                let kind = self.envido.kind().ok_or(EnvidoError::NoCallPending)?;
                let stake = if kind.ends_in_falta() {
                    kind.accepted_points(self.scores.falta_payout())
                } else {
                    kind.accepted_points(0)
                };
                self.envido.accept(team, stake, self.mano, self.players)?;
                Ok(vec![RoundEvent::EnvidoAccepted { stake }])
            }
            BidResponse::NoQuiero => {
                let (winner, points) = self.envido.decline(team)?;
                let mut events = vec![RoundEvent::EnvidoDeclined { winner, points }];
                self.after_envido_resolved(&mut events);
                Ok(events)
            }
        }
    }

    fn declare(
        &mut self,
        seat: Seat,
        declaration: Declaration,
    ) -> Result<Vec<RoundEvent>, RoundError> {
        if let Declaration::Points(declared) = declaration {
            // Declarations are checked against the dealt cards; the engine
            // does not adjudicate bluffs after the fact.
            if let Some(turn) = self.envido.declaration_turn() {
                let actual = self.envido_total(seat);
                if turn == seat && declared != actual {
                    return Err(RoundError::WrongPoints { declared, actual });
                }
            }
        }

        let resolved = self.envido.declare(seat, declaration)?;
        let mut events = vec![RoundEvent::PointsDeclared { seat, declaration }];
        if let Some((winner, points)) = resolved {
            events.push(RoundEvent::EnvidoResolved { winner, points });
            self.after_envido_resolved(&mut events);
        }
        Ok(events)
    }

    fn after_envido_resolved(&mut self, _events: &mut [RoundEvent]) {
        if self.envido_primero {
            // Control returns to the deferred truco response; the turn
            // stays parked until that bid resolves too.
            self.envido_primero = false;
            return;
        }
        self.restore_turn(self.envido.last_caller());
    }

    fn call_truco(&mut self, seat: Seat) -> Result<Vec<RoundEvent>, RoundError> {
        if self.envido.is_pending() || self.envido.is_declaring() {
            return Err(RoundError::BidResponsePending);
        }

        let was_pending = self.truco.is_pending();
        let level = self.truco.call(seat)?;
        if self.interrupted_turn.is_none() && !was_pending {
            self.interrupted_turn = Some(self.turn);
        }
        Ok(vec![RoundEvent::TrucoCalled { seat, level }])
    }

    fn respond_truco(
        &mut self,
        seat: Seat,
        response: BidResponse,
    ) -> Result<Vec<RoundEvent>, RoundError> {
        if self.envido.is_pending() || self.envido.is_declaring() {
            return Err(RoundError::BidResponsePending);
        }

        let team = seat.team();
        match response {
            BidResponse::Quiero => {
                let level = self.truco.accept(team)?;
                // An accepted truco permanently closes the envido window.
                self.envido.close_window();
                self.restore_turn(self.truco.last_caller());
                Ok(vec![RoundEvent::TrucoAccepted {
                    level,
                    stake: self.truco.stake(),
                }])
            }
            BidResponse::NoQuiero => {
                let (winner, points) = self.truco.decline(team)?;
                let mut events = vec![RoundEvent::TrucoDeclined { winner, points }];
                self.finish(winner, points, &mut events);
                Ok(events)
            }
        }
    }

    fn go_to_deck(&mut self, seat: Seat) -> Result<Vec<RoundEvent>, RoundError> {
        let winner = seat.team().other();
        let points = self.truco.concession_points();
        let mut events = vec![RoundEvent::WentToDeck { seat }];
        self.finish(winner, points, &mut events);
        Ok(events)
    }

    fn restore_turn(&mut self, fallback: Option<Seat>) {
        if let Some(seat) = self.interrupted_turn.take() {
            self.turn = seat;
        } else if let Some(seat) = fallback {
            self.turn = seat;
        }
    }

    /// The full legal-action set for `seat`, mirroring exactly what
    /// `apply` would accept. Callers treat submitted moves as untrusted;
    /// this is the surface they are validated against.
    pub fn legal_actions(&self, seat: Seat) -> Vec<PlayerAction> {
        let mut actions = Vec::new();
        if self.outcome.is_some() {
            return actions;
        }

        let team = seat.team();

        if self.envido.is_declaring() {
            if self.envido.declaration_turn() == Some(seat) {
                actions.push(PlayerAction::Declare(Declaration::Points(
                    self.envido_total(seat),
                )));
                actions.push(PlayerAction::Declare(Declaration::Pass));
                if let Some(state) = self.envido.declaration() {
                    if state.best().is_some_and(|best| best.team != team) {
                        actions.push(PlayerAction::Declare(Declaration::SonBuenas));
                    }
                }
            }
            actions.push(PlayerAction::GoToDeck);
            return actions;
        }

        if self.envido.is_pending() {
            if self.envido.pending_from() == Some(team) {
                actions.push(PlayerAction::RespondEnvido(BidResponse::Quiero));
                actions.push(PlayerAction::RespondEnvido(BidResponse::NoQuiero));
                for call in [
                    EnvidoCall::Envido,
                    EnvidoCall::RealEnvido,
                    EnvidoCall::FaltaEnvido,
                ] {
                    if EnvidoKind::apply(self.envido.kind(), call).is_some() {
                        actions.push(PlayerAction::CallEnvido(call));
                    }
                }
            }
            actions.push(PlayerAction::GoToDeck);
            return actions;
        }

        if self.truco.is_pending() {
            if self.truco.pending_from() == Some(team) {
                actions.push(PlayerAction::RespondTruco(BidResponse::Quiero));
                actions.push(PlayerAction::RespondTruco(BidResponse::NoQuiero));
                if self.truco.may_call(team)
                    && self
                        .truco
                        .pending_level()
                        .and_then(TrucoLevel::next)
                        .is_some()
                {
                    actions.push(PlayerAction::CallTruco);
                }
                self.push_envido_calls(seat, &mut actions);
            }
            actions.push(PlayerAction::GoToDeck);
            return actions;
        }

        if seat == self.turn {
            for card in self.hands[seat.index()].iter() {
                actions.push(PlayerAction::PlayCard(*card));
            }
        }
        self.push_envido_calls(seat, &mut actions);
        if self.truco.may_call(team) {
            actions.push(PlayerAction::CallTruco);
        }
        actions.push(PlayerAction::GoToDeck);
        actions
    }

    fn push_envido_calls(&self, seat: Seat, actions: &mut Vec<PlayerAction>) {
        let team = seat.team();
        if !self.envido.may_call(team) {
            return;
        }
        if self.truco.is_pending() && self.envido.kind().is_some() {
            return;
        }
        let opening = self.envido.kind().is_none();
        let is_pie = self.players < 4 || seat == Seat::pie_of(team, self.mano, self.players);
        for call in [
            EnvidoCall::Envido,
            EnvidoCall::RealEnvido,
            EnvidoCall::FaltaEnvido,
        ] {
            if EnvidoKind::apply(self.envido.kind(), call).is_none() {
                continue;
            }
            if opening && call != EnvidoCall::FaltaEnvido && !is_pie {
                continue;
            }
            actions.push(PlayerAction::CallEnvido(call));
        }
    }
}

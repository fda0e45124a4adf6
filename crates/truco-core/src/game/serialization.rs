use crate::game::match_state::MatchState;
use crate::model::card::Card;
use crate::model::envido::EnvidoResolution;
use crate::model::round::{RoundOutcome, RoundState};
use crate::model::seat::Seat;
use crate::model::team::{TeamId, TeamScores};
use crate::model::trick::Play;
use crate::model::truco_bid::{TrucoLevel, TrucoResolution};
use serde::{Deserialize, Serialize};

/// Bid-protocol summary carried in notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvidoSnapshot {
    pub resolution: EnvidoResolution,
    pub pending_from: Option<TeamId>,
    pub declaration_turn: Option<Seat>,
    pub window_open: bool,
    pub winner: Option<TeamId>,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrucoSnapshot {
    pub resolution: TrucoResolution,
    pub pending_from: Option<TeamId>,
    pub pending_level: Option<TrucoLevel>,
    pub accepted_level: Option<TrucoLevel>,
    pub stake: u8,
}

/// Full observer-facing view of a round: enough to rebuild the legal-move
/// set for any seat without replaying the action history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub players: u8,
    pub mano: Seat,
    pub turn: Seat,
    pub expected_actor: Seat,
    pub trick_number: u8,
    pub hands: Vec<Vec<Card>>,
    pub played: Vec<Vec<Card>>,
    pub current_trick: Vec<Play>,
    pub tricks: Vec<Vec<Play>>,
    pub envido: EnvidoSnapshot,
    pub truco: TrucoSnapshot,
    pub outcome: Option<RoundOutcome>,
}

impl RoundSnapshot {
    pub fn capture(round: &RoundState) -> Self {
        let players = round.players();
        RoundSnapshot {
            players,
            mano: round.mano(),
            turn: round.turn(),
            expected_actor: round.expected_actor(),
            trick_number: round.trick_number(),
            hands: (0..players)
                .map(|i| round.hand(Seat::new(i)).cards().to_vec())
                .collect(),
            played: (0..players)
                .map(|i| round.played(Seat::new(i)).to_vec())
                .collect(),
            current_trick: round.current_trick().plays().to_vec(),
            tricks: round
                .trick_history()
                .iter()
                .map(|trick| trick.plays().to_vec())
                .collect(),
            envido: EnvidoSnapshot {
                resolution: round.envido().resolution(),
                pending_from: round.envido().pending_from(),
                declaration_turn: round.envido().declaration_turn(),
                window_open: round.envido().window_open(),
                winner: round.envido().winner(),
                points: round.envido().points(),
            },
            truco: TrucoSnapshot {
                resolution: round.truco().resolution(),
                pending_from: round.truco().pending_from(),
                pending_level: round.truco().pending_level(),
                accepted_level: round.truco().accepted_level(),
                stake: round.truco().stake(),
            },
            outcome: round.outcome(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Match-level persistence: a match restores from its seed and round
/// number by replaying the shuffle stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub seed: u64,
    pub round_number: u32,
    pub players: u8,
    pub target: u8,
    pub scores: [u8; 2],
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        MatchSnapshot {
            seed: state.seed(),
            round_number: state.round_number(),
            players: state.players(),
            target: state.scores().target(),
            scores: state.scores().totals(),
        }
    }

    pub fn restore(self) -> MatchState {
        MatchState::with_seed_round_totals(
            self.seed,
            self.round_number,
            self.players,
            TeamScores::with_totals(self.target, self.scores),
        )
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchSnapshot, RoundSnapshot};
    use crate::game::match_state::MatchState;
    use crate::model::action::PlayerAction;
    use crate::model::envido::{EnvidoCall, EnvidoResolution};
    use crate::model::seat::Seat;
    use crate::model::team::TeamId;

    #[test]
    fn round_snapshot_reflects_pending_bids() {
        let mut state = MatchState::with_seed(2, 30, 5);
        state
            .round_mut()
            .apply(Seat::new(1), PlayerAction::CallEnvido(EnvidoCall::Envido))
            .unwrap();
        let snapshot = RoundSnapshot::capture(state.round());
        assert_eq!(snapshot.envido.resolution, EnvidoResolution::PendingResponse);
        assert_eq!(snapshot.envido.pending_from, Some(TeamId::A));
        assert_eq!(snapshot.expected_actor, Seat::new(0));
        assert_eq!(snapshot.truco.stake, 1);
        assert_eq!(snapshot.hands.len(), 2);
    }

    #[test]
    fn round_snapshot_serializes_to_json() {
        let state = MatchState::with_seed(2, 30, 5);
        let json = RoundSnapshot::capture(state.round()).to_json().unwrap();
        assert!(json.contains("\"mano\""));
        assert!(json.contains("\"envido\""));
    }

    #[test]
    fn match_snapshot_roundtrip_restores_the_deal() {
        let state = MatchState::with_seed(2, 30, 123);
        let json = MatchSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"seed\": 123"));

        let restored = MatchSnapshot::from_json(&json).unwrap().restore();
        assert_eq!(restored.seed(), 123);
        assert_eq!(restored.scores(), state.scores());
        assert_eq!(
            restored.round().hand(Seat::new(1)).cards(),
            state.round().hand(Seat::new(1)).cards()
        );
    }
}

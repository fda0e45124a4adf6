use crate::model::card::Card;
use crate::model::envido::{Declaration, EnvidoCall};
use serde::{Deserialize, Serialize};

/// Accept or refuse a pending bid. Raising instead is expressed through
/// the corresponding call action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidResponse {
    Quiero,
    NoQuiero,
}

/// Everything an external actor can submit to a round. Every variant is
/// re-validated by the engine before it mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    PlayCard(Card),
    CallEnvido(EnvidoCall),
    RespondEnvido(BidResponse),
    Declare(Declaration),
    CallTruco,
    RespondTruco(BidResponse),
    GoToDeck,
}

impl PlayerAction {
    pub const fn is_bid(self) -> bool {
        matches!(
            self,
            PlayerAction::CallEnvido(_) | PlayerAction::CallTruco
        )
    }
}

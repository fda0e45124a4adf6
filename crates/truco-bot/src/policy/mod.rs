mod heuristic;
mod random;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

use truco_core::model::action::PlayerAction;
use truco_core::model::round::RoundState;
use truco_core::model::seat::Seat;

/// Context handed to a policy for one decision. `legal` is the engine's
/// own legal-action set for this seat; whatever the policy returns is
/// re-validated by the engine before it is applied.
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub round: &'a RoundState,
    pub legal: &'a [PlayerAction],
}

/// One capability interface for every kind of participant: human adapters
/// and machine agents implement the same trait, and the engine never asks
/// which is which.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Pick one action from the legal set.
    fn choose(&mut self, ctx: &PolicyContext) -> PlayerAction;
}

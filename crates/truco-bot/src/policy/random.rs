use super::{Policy, PolicyContext};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use truco_core::model::action::PlayerAction;

/// Uniform choice over the legal set. Useful as a baseline opponent and
/// for shaking out validation gaps; it never volunteers a concession
/// unless nothing else is legal.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> PlayerAction {
        let candidates: Vec<PlayerAction> = ctx
            .legal
            .iter()
            .copied()
            .filter(|action| !matches!(action, PlayerAction::GoToDeck))
            .collect();
        candidates
            .choose(&mut self.rng)
            .copied()
            .or_else(|| ctx.legal.first().copied())
            .unwrap_or(PlayerAction::GoToDeck)
    }
}

#[cfg(test)]
mod tests {
    use super::RandomPolicy;
    use crate::policy::{Policy, PolicyContext};
    use truco_core::model::action::PlayerAction;
    use truco_core::model::card::Card;
    use truco_core::model::rank::Rank;
    use truco_core::model::round::RoundState;
    use truco_core::model::seat::Seat;
    use truco_core::model::suit::Suit;
    use truco_core::model::team::TeamScores;

    fn round() -> RoundState {
        RoundState::from_hands(
            vec![
                [
                    Card::new(Rank::Ace, Suit::Swords),
                    Card::new(Rank::Three, Suit::Coins),
                    Card::new(Rank::Four, Suit::Cups),
                ],
                [
                    Card::new(Rank::Five, Suit::Clubs),
                    Card::new(Rank::Six, Suit::Coins),
                    Card::new(Rank::Ten, Suit::Cups),
                ],
            ],
            Seat::new(0),
            TeamScores::new(30),
        )
    }

    #[test]
    fn chooses_only_legal_actions_and_avoids_conceding() {
        let round = round();
        let legal = round.legal_actions(Seat::new(0));
        let mut policy = RandomPolicy::with_seed(11);
        for _ in 0..50 {
            let action = policy.choose(&PolicyContext {
                seat: Seat::new(0),
                round: &round,
                legal: &legal,
            });
            assert!(legal.contains(&action));
            assert_ne!(action, PlayerAction::GoToDeck);
        }
    }

    #[test]
    fn falls_back_to_the_only_available_action() {
        let legal = vec![PlayerAction::GoToDeck];
        let round = round();
        let mut policy = RandomPolicy::with_seed(3);
        let action = policy.choose(&PolicyContext {
            seat: Seat::new(1),
            round: &round,
            legal: &legal,
        });
        assert_eq!(action, PlayerAction::GoToDeck);
    }
}

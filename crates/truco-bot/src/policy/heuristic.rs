use super::{Policy, PolicyContext};
use tracing::{Level, event};
use truco_core::model::action::{BidResponse, PlayerAction};
use truco_core::model::card::Card;
use truco_core::model::envido::{Declaration, EnvidoCall};

/// Threshold-driven rule policy: bids on strong envido totals and matador
/// hands, answers bids from the same thresholds, and spends cards
/// frugally.
pub struct HeuristicPolicy {
    envido_call_threshold: u8,
    envido_accept_threshold: u8,
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self {
            envido_call_threshold: 27,
            envido_accept_threshold: 25,
        }
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> PlayerAction {
        let action = self.decide(ctx);
        event!(
            Level::DEBUG,
            seat = %ctx.seat,
            ?action,
            envido_total = ctx.round.envido_total(ctx.seat),
            "heuristic decision"
        );
        action
    }
}

impl HeuristicPolicy {
    fn decide(&self, ctx: &PolicyContext) -> PlayerAction {
        if let Some(action) = self.declaration_move(ctx) {
            return action;
        }
        if let Some(action) = self.envido_response(ctx) {
            return action;
        }
        if let Some(action) = self.truco_response(ctx) {
            return action;
        }
        if let Some(action) = self.opening_bid(ctx) {
            return action;
        }
        if let Some(action) = self.card_play(ctx) {
            return action;
        }
        // Whatever the engine still allows; conceding comes last.
        ctx.legal
            .iter()
            .copied()
            .find(|action| !matches!(action, PlayerAction::GoToDeck))
            .unwrap_or(PlayerAction::GoToDeck)
    }

    fn declaration_move(&self, ctx: &PolicyContext) -> Option<PlayerAction> {
        let points = ctx.legal.iter().copied().find_map(|action| match action {
            PlayerAction::Declare(Declaration::Points(value)) => Some(value),
            _ => None,
        })?;

        let opposing_best = ctx
            .round
            .envido()
            .declaration()
            .and_then(|state| state.best())
            .filter(|best| best.team != ctx.seat.team())
            .map(|best| best.value);

        // Concede quietly when the table already beats us.
        if let Some(best) = opposing_best {
            if best >= points {
                let concede = ctx
                    .legal
                    .iter()
                    .copied()
                    .find(|action| {
                        matches!(action, PlayerAction::Declare(Declaration::SonBuenas))
                    })
                    .unwrap_or(PlayerAction::Declare(Declaration::Pass));
                return Some(concede);
            }
        }
        Some(PlayerAction::Declare(Declaration::Points(points)))
    }

    fn envido_response(&self, ctx: &PolicyContext) -> Option<PlayerAction> {
        if !ctx
            .legal
            .contains(&PlayerAction::RespondEnvido(BidResponse::Quiero))
        {
            return None;
        }
        let total = ctx.round.envido_total(ctx.seat);
        let raise = PlayerAction::CallEnvido(EnvidoCall::RealEnvido);
        if total >= 31 && ctx.legal.contains(&raise) {
            return Some(raise);
        }
        if total >= self.envido_accept_threshold {
            return Some(PlayerAction::RespondEnvido(BidResponse::Quiero));
        }
        Some(PlayerAction::RespondEnvido(BidResponse::NoQuiero))
    }

    fn truco_response(&self, ctx: &PolicyContext) -> Option<PlayerAction> {
        if !ctx
            .legal
            .contains(&PlayerAction::RespondTruco(BidResponse::Quiero))
        {
            return None;
        }
        let strengths = self.strengths(ctx);
        let top = strengths.first().copied().unwrap_or(0);
        let second = strengths.get(1).copied().unwrap_or(0);
        if top >= 13 && second >= 9 && ctx.legal.contains(&PlayerAction::CallTruco) {
            return Some(PlayerAction::CallTruco);
        }
        if top >= 11 || (top >= 9 && second >= 8) {
            return Some(PlayerAction::RespondTruco(BidResponse::Quiero));
        }
        Some(PlayerAction::RespondTruco(BidResponse::NoQuiero))
    }

    fn opening_bid(&self, ctx: &PolicyContext) -> Option<PlayerAction> {
        let total = ctx.round.envido_total(ctx.seat);
        if total >= 30 {
            let call = PlayerAction::CallEnvido(EnvidoCall::RealEnvido);
            if ctx.legal.contains(&call) {
                return Some(call);
            }
        }
        if total >= self.envido_call_threshold {
            let call = PlayerAction::CallEnvido(EnvidoCall::Envido);
            if ctx.legal.contains(&call) {
                return Some(call);
            }
        }

        let strengths = self.strengths(ctx);
        let top = strengths.first().copied().unwrap_or(0);
        let second = strengths.get(1).copied().unwrap_or(0);
        if top >= 12 && second >= 10 && ctx.legal.contains(&PlayerAction::CallTruco) {
            return Some(PlayerAction::CallTruco);
        }
        None
    }

    fn card_play(&self, ctx: &PolicyContext) -> Option<PlayerAction> {
        let mut playable: Vec<Card> = ctx
            .legal
            .iter()
            .copied()
            .filter_map(|action| match action {
                PlayerAction::PlayCard(card) => Some(card),
                _ => None,
            })
            .collect();
        if playable.is_empty() {
            return None;
        }
        playable.sort_by_key(|card| card.strength());

        let table_best = ctx
            .round
            .current_trick()
            .plays()
            .iter()
            .map(|play| play.card.strength())
            .max();

        let card = match table_best {
            // Leading: put our strongest card out.
            None => *playable.last().unwrap_or(&playable[0]),
            Some(best) => playable
                .iter()
                .copied()
                // Cheapest card that takes the trick, else dump the lowest.
                .find(|card| card.strength() > best)
                .unwrap_or(playable[0]),
        };
        Some(PlayerAction::PlayCard(card))
    }

    fn strengths(&self, ctx: &PolicyContext) -> Vec<u8> {
        let mut strengths: Vec<u8> = ctx
            .round
            .hand(ctx.seat)
            .iter()
            .map(|card| card.strength())
            .collect();
        strengths.sort_unstable_by(|a, b| b.cmp(a));
        strengths
    }
}

#[cfg(test)]
mod tests {
    use super::HeuristicPolicy;
    use crate::policy::{Policy, PolicyContext};
    use truco_core::model::action::{BidResponse, PlayerAction};
    use truco_core::model::card::Card;
    use truco_core::model::envido::{Declaration, EnvidoCall};
    use truco_core::model::rank::Rank;
    use truco_core::model::round::RoundState;
    use truco_core::model::seat::Seat;
    use truco_core::model::suit::Suit;
    use truco_core::model::team::TeamScores;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Seat 0: 33 envido and both matadors. Seat 1: nothing.
    fn lopsided_round() -> RoundState {
        RoundState::from_hands(
            vec![
                [
                    card(Rank::Seven, Suit::Swords),
                    card(Rank::Six, Suit::Swords),
                    card(Rank::Ace, Suit::Swords),
                ],
                [
                    card(Rank::Four, Suit::Clubs),
                    card(Rank::Five, Suit::Coins),
                    card(Rank::Ten, Suit::Cups),
                ],
            ],
            Seat::new(0),
            TeamScores::new(30),
        )
    }

    fn choose(round: &RoundState, seat: Seat) -> PlayerAction {
        let legal = round.legal_actions(seat);
        HeuristicPolicy::new().choose(&PolicyContext {
            seat,
            round,
            legal: &legal,
        })
    }

    #[test]
    fn strong_envido_hand_opens_with_real_envido() {
        let round = lopsided_round();
        assert_eq!(round.envido_total(Seat::new(0)), 33);
        assert_eq!(
            choose(&round, Seat::new(0)),
            PlayerAction::CallEnvido(EnvidoCall::RealEnvido)
        );
    }

    #[test]
    fn weak_hand_declines_an_envido() {
        let mut round = lopsided_round();
        round
            .apply(Seat::new(0), PlayerAction::CallEnvido(EnvidoCall::Envido))
            .unwrap();
        assert_eq!(
            choose(&round, Seat::new(1)),
            PlayerAction::RespondEnvido(BidResponse::NoQuiero)
        );
    }

    #[test]
    fn weak_hand_refuses_a_truco() {
        let mut round = lopsided_round();
        round.apply(Seat::new(0), PlayerAction::CallTruco).unwrap();
        assert_eq!(
            choose(&round, Seat::new(1)),
            PlayerAction::RespondTruco(BidResponse::NoQuiero)
        );
    }

    #[test]
    fn beaten_declarer_says_son_buenas() {
        let mut round = lopsided_round();
        round
            .apply(Seat::new(1), PlayerAction::CallEnvido(EnvidoCall::Envido))
            .unwrap();
        round
            .apply(Seat::new(0), PlayerAction::RespondEnvido(BidResponse::Quiero))
            .unwrap();
        round
            .apply(Seat::new(0), PlayerAction::Declare(Declaration::Points(33)))
            .unwrap();
        assert_eq!(
            choose(&round, Seat::new(1)),
            PlayerAction::Declare(Declaration::SonBuenas)
        );
    }

    #[test]
    fn responder_plays_the_cheapest_winning_card() {
        let mut round = RoundState::from_hands(
            vec![
                [
                    card(Rank::Five, Suit::Coins),
                    card(Rank::Four, Suit::Clubs),
                    card(Rank::Ten, Suit::Cups),
                ],
                [
                    card(Rank::Ace, Suit::Clubs),
                    card(Rank::Eleven, Suit::Coins),
                    card(Rank::Twelve, Suit::Swords),
                ],
            ],
            Seat::new(0),
            TeamScores::new(30),
        );
        round
            .apply(
                Seat::new(0),
                PlayerAction::PlayCard(card(Rank::Ten, Suit::Cups)),
            )
            .unwrap();
        // The eleven beats a ten; no need to spend the matador.
        assert_eq!(
            choose(&round, Seat::new(1)),
            PlayerAction::PlayCard(card(Rank::Eleven, Suit::Coins))
        );
    }
}

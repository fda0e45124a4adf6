use crate::model::deck::Deck;
use crate::model::round::{RoundOutcome, RoundState};
use crate::model::seat::Seat;
use crate::model::team::{TeamId, TeamScores};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// The match-level collaborator: keeps the cumulative score, rotates mano,
/// and deals a fresh round from a seeded shuffle stream so any round can be
/// reproduced from (seed, round number).
#[derive(Debug, Clone)]
pub struct MatchState {
    scores: TeamScores,
    round_number: u32,
    players: u8,
    current_round: RoundState,
    rng: StdRng,
    seed: u64,
}

impl MatchState {
    pub fn new(players: u8, target: u8) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(players, target, seed)
    }

    pub fn with_seed(players: u8, target: u8, seed: u64) -> Self {
        Self::with_seed_round_totals(seed, 1, players, TeamScores::new(target))
    }

    pub fn with_seed_round_totals(
        seed: u64,
        round_number: u32,
        players: u8,
        scores: TeamScores,
    ) -> Self {
        let normalized_round = round_number.max(1);
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 1..normalized_round {
            let _ = Deck::shuffled(&mut rng);
        }

        let mut deck = Deck::shuffled(&mut rng);
        let mano = Self::mano_for_round(normalized_round, players);
        let current_round = RoundState::deal(&mut deck, mano, players, scores)
            .expect("forty cards cover up to six seats");

        Self {
            scores,
            round_number: normalized_round,
            players,
            current_round,
            rng,
            seed,
        }
    }

    /// Mano advances one seat per round.
    fn mano_for_round(round_number: u32, players: u8) -> Seat {
        Seat::new(((round_number - 1) % players as u32) as u8)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> u8 {
        self.players
    }

    pub fn scores(&self) -> TeamScores {
        self.scores
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn round_mut(&mut self) -> &mut RoundState {
        &mut self.current_round
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn mano(&self) -> Seat {
        self.current_round.mano()
    }

    pub fn match_winner(&self) -> Option<TeamId> {
        self.scores.match_winner()
    }

    /// Books the finished round's points and deals the next one. Returns
    /// the outcome that was applied, or `None` while the round is live.
    pub fn finish_round_and_start_next(&mut self) -> Option<RoundOutcome> {
        let outcome = self.current_round.outcome()?;
        for team in TeamId::BOTH {
            self.scores.add(team, outcome.points_for(team));
        }

        self.round_number += 1;
        let mano = Self::mano_for_round(self.round_number, self.players);
        let mut deck = Deck::shuffled(&mut self.rng);
        self.current_round = RoundState::deal(&mut deck, mano, self.players, self.scores)
            .expect("forty cards cover up to six seats");
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::MatchState;
    use crate::model::action::PlayerAction;
    use crate::model::seat::Seat;
    use crate::model::team::TeamId;

    #[test]
    fn new_match_deals_three_cards_per_seat() {
        let state = MatchState::with_seed(4, 30, 7);
        for index in 0..4 {
            assert_eq!(state.round().hand(Seat::new(index)).len(), 3);
        }
        assert_eq!(state.round_number(), 1);
        assert_eq!(state.mano(), Seat::new(0));
    }

    #[test]
    fn seed_replays_the_same_deal() {
        let state_a = MatchState::with_seed(2, 30, 42);
        let state_b = MatchState::with_seed(2, 30, 42);
        assert_eq!(
            state_a.round().hand(Seat::new(0)).cards(),
            state_b.round().hand(Seat::new(0)).cards()
        );
    }

    #[test]
    fn finishing_a_live_round_is_a_no_op() {
        let mut state = MatchState::with_seed(2, 30, 1);
        assert!(state.finish_round_and_start_next().is_none());
        assert_eq!(state.round_number(), 1);
    }

    #[test]
    fn finished_round_books_points_and_rotates_mano() {
        let mut state = MatchState::with_seed(2, 30, 1);
        // Seat 1 concedes; team A books the default point.
        state
            .round_mut()
            .apply(Seat::new(1), PlayerAction::GoToDeck)
            .unwrap();
        let outcome = state.finish_round_and_start_next().unwrap();
        assert_eq!(outcome.trick_winner, TeamId::A);
        assert_eq!(state.scores().score(TeamId::A), 1);
        assert_eq!(state.round_number(), 2);
        assert_eq!(state.mano(), Seat::new(1));
        assert_eq!(state.round().hand(Seat::new(0)).len(), 3);
    }

    #[test]
    fn restored_round_number_replays_the_shuffle_stream() {
        let mut state = MatchState::with_seed(2, 30, 99);
        state
            .round_mut()
            .apply(Seat::new(1), PlayerAction::GoToDeck)
            .unwrap();
        state.finish_round_and_start_next();

        let restored =
            MatchState::with_seed_round_totals(99, state.round_number(), 2, state.scores());
        assert_eq!(
            restored.round().hand(Seat::new(0)).cards(),
            state.round().hand(Seat::new(0)).cards()
        );
        assert_eq!(restored.mano(), state.mano());
    }
}

use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    InsufficientCards { requested: usize, remaining: usize },
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::InsufficientCards {
                requested,
                remaining,
            } => write!(
                f,
                "requested {requested} cards but only {remaining} remain in the deck"
            ),
        }
    }
}

impl std::error::Error for DeckError {}

impl Deck {
    /// The fixed 40-card Spanish deck: 4 suits by 10 ranks, no 8s or 9s.
    pub fn spanish() -> Self {
        let mut cards = Vec::with_capacity(40);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::spanish();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes `n` cards from the top. Under-supply is a caller bug in this
    /// game (3 cards per player never exceeds 40) and is reported, not
    /// papered over.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.cards.len() {
            return Err(DeckError::InsufficientCards {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.split_off(self.cards.len() - n))
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::{Deck, DeckError};
    use std::collections::HashSet;

    #[test]
    fn spanish_deck_has_40_unique_cards() {
        let deck = Deck::spanish();
        assert_eq!(deck.cards().len(), 40);
        let distinct: HashSet<_> = deck.cards().iter().map(|c| (c.suit, c.rank)).collect();
        assert_eq!(distinct.len(), 40);
    }

    #[test]
    fn exactly_two_matadors_exist() {
        let deck = Deck::spanish();
        let matadors = deck.cards().iter().filter(|c| c.is_matador()).count();
        assert_eq!(matadors, 2);
        assert_eq!(deck.cards().iter().filter(|c| c.strength() == 14).count(), 1);
        assert_eq!(deck.cards().iter().filter(|c| c.strength() == 13).count(), 1);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn deal_removes_from_the_top() {
        let mut deck = Deck::shuffled_with_seed(7);
        let before = deck.remaining();
        let cards = deck.deal(3).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(deck.remaining(), before - 3);
        for card in &cards {
            assert!(!deck.cards().contains(card));
        }
    }

    #[test]
    fn overdrawing_reports_insufficient_cards() {
        let mut deck = Deck::spanish();
        deck.deal(39).unwrap();
        assert_eq!(
            deck.deal(3),
            Err(DeckError::InsufficientCards {
                requested: 3,
                remaining: 1
            })
        );
    }
}

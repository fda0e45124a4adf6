use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Trick-comparison strength on the canonical Truco ladder (1..=14,
    /// higher wins). Only four cards are suit-dependent: the two matadors
    /// (ace of swords, ace of clubs) and the two true sevens (swords, coins).
    pub const fn strength(self) -> u8 {
        match (self.rank, self.suit) {
            (Rank::Ace, Suit::Swords) => 14,
            (Rank::Ace, Suit::Clubs) => 13,
            (Rank::Seven, Suit::Swords) => 12,
            (Rank::Seven, Suit::Coins) => 11,
            (Rank::Three, _) => 10,
            (Rank::Two, _) => 9,
            (Rank::Ace, _) => 8,
            (Rank::Twelve, _) => 7,
            (Rank::Eleven, _) => 6,
            (Rank::Ten, _) => 5,
            (Rank::Seven, _) => 4,
            (Rank::Six, _) => 3,
            (Rank::Five, _) => 2,
            (Rank::Four, _) => 1,
        }
    }

    /// Envido contribution: face value for 1-7 (false sevens included), 0
    /// for the face cards.
    pub const fn envido_value(self) -> u8 {
        self.rank.envido_value()
    }

    pub const fn is_matador(self) -> bool {
        self.strength() >= 13
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn matador_aces_top_the_ladder() {
        assert_eq!(Card::new(Rank::Ace, Suit::Swords).strength(), 14);
        assert_eq!(Card::new(Rank::Ace, Suit::Clubs).strength(), 13);
        assert!(Card::new(Rank::Ace, Suit::Swords).is_matador());
        assert!(!Card::new(Rank::Ace, Suit::Coins).is_matador());
    }

    #[test]
    fn true_sevens_outrank_threes() {
        let seven_swords = Card::new(Rank::Seven, Suit::Swords);
        let seven_cups = Card::new(Rank::Seven, Suit::Cups);
        let three = Card::new(Rank::Three, Suit::Coins);
        assert!(seven_swords.strength() > three.strength());
        assert!(seven_cups.strength() < three.strength());
    }

    #[test]
    fn false_aces_sit_between_twos_and_twelves() {
        let false_ace = Card::new(Rank::Ace, Suit::Cups);
        assert!(false_ace.strength() < Card::new(Rank::Two, Suit::Swords).strength());
        assert!(false_ace.strength() > Card::new(Rank::Twelve, Suit::Swords).strength());
    }

    #[test]
    fn envido_value_follows_rank() {
        assert_eq!(Card::new(Rank::Seven, Suit::Cups).envido_value(), 7);
        assert_eq!(Card::new(Rank::Twelve, Suit::Swords).envido_value(), 0);
    }

    #[test]
    fn display_is_rank_then_suit() {
        assert_eq!(Card::new(Rank::Seven, Suit::Coins).to_string(), "7O");
    }
}

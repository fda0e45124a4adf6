use crate::model::card::Card;

/// The three cards a player holds, shrinking as they are played.
#[derive(Debug, Clone, Default)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards };
        hand.sort();
        hand
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
        self.sort();
    }

    pub fn remove(&mut self, card: Card) -> bool {
        if let Some(index) = self.cards.iter().position(|&c| c == card) {
            self.cards.remove(index);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| b.strength().cmp(&a.strength()));
    }
}

/// Envido total for a set of dealt cards: two cards of one suit score 20
/// plus their combined face values; without a pair, the best single face
/// value stands alone.
pub fn envido_total(cards: &[Card]) -> u8 {
    let mut best = 0u8;
    for (i, a) in cards.iter().enumerate() {
        for b in cards.iter().skip(i + 1) {
            if a.suit == b.suit {
                best = best.max(20 + a.envido_value() + b.envido_value());
            }
        }
    }
    if best == 0 {
        best = cards.iter().map(|c| c.envido_value()).max().unwrap_or(0);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{Hand, envido_total};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn add_and_remove_cards() {
        let mut hand = Hand::new();
        let card = Card::new(Rank::Three, Suit::Clubs);
        hand.add(card);
        assert!(hand.contains(card));
        assert!(hand.remove(card));
        assert!(!hand.contains(card));
    }

    #[test]
    fn cards_sort_strongest_first() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Four, Suit::Cups),
            Card::new(Rank::Ace, Suit::Swords),
            Card::new(Rank::Three, Suit::Coins),
        ]);
        assert_eq!(hand.cards()[0], Card::new(Rank::Ace, Suit::Swords));
        assert_eq!(hand.cards()[2], Card::new(Rank::Four, Suit::Cups));
    }

    #[test]
    fn envido_pairs_score_twenty_plus_faces() {
        let cards = [
            Card::new(Rank::Seven, Suit::Coins),
            Card::new(Rank::Six, Suit::Coins),
            Card::new(Rank::Twelve, Suit::Clubs),
        ];
        assert_eq!(envido_total(&cards), 33);
    }

    #[test]
    fn envido_three_of_a_suit_keeps_the_best_pair() {
        let cards = [
            Card::new(Rank::Seven, Suit::Cups),
            Card::new(Rank::Five, Suit::Cups),
            Card::new(Rank::Two, Suit::Cups),
        ];
        assert_eq!(envido_total(&cards), 32);
    }

    #[test]
    fn envido_face_card_pair_scores_twenty() {
        let cards = [
            Card::new(Rank::Twelve, Suit::Swords),
            Card::new(Rank::Eleven, Suit::Swords),
            Card::new(Rank::Four, Suit::Clubs),
        ];
        assert_eq!(envido_total(&cards), 20);
    }

    #[test]
    fn envido_without_a_pair_is_the_best_face_value() {
        let cards = [
            Card::new(Rank::Seven, Suit::Cups),
            Card::new(Rank::Five, Suit::Coins),
            Card::new(Rank::Twelve, Suit::Clubs),
        ];
        assert_eq!(envido_total(&cards), 7);
    }
}

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Swords = 0,
    Clubs = 1,
    Coins = 2,
    Cups = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Swords, Suit::Clubs, Suit::Coins, Suit::Cups];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Suit::Swords),
            1 => Some(Suit::Clubs),
            2 => Some(Suit::Coins),
            3 => Some(Suit::Cups),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Suit::Swords => "E",
            Suit::Clubs => "B",
            Suit::Coins => "O",
            Suit::Cups => "C",
        };
        f.write_str(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::Suit;

    #[test]
    fn display_uses_spanish_initials() {
        assert_eq!(Suit::Swords.to_string(), "E");
        assert_eq!(Suit::Coins.to_string(), "O");
    }

    #[test]
    fn from_index_maps_valid_values() {
        assert_eq!(Suit::from_index(1), Some(Suit::Clubs));
        assert_eq!(Suit::from_index(4), None);
    }
}

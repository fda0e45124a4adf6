use core::fmt;
use serde::{Deserialize, Serialize};

/// Spanish-deck ranks used in Truco. There are no 8s or 9s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Ten = 10,
    Eleven = 11,
    Twelve = 12,
}

impl Rank {
    pub const ORDERED: [Rank; 10] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Ten,
        Rank::Eleven,
        Rank::Twelve,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::Ace),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Eleven),
            12 => Some(Rank::Twelve),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Face cards carry no envido value; number cards count face value.
    pub const fn envido_value(self) -> u8 {
        match self {
            Rank::Ten | Rank::Eleven | Rank::Twelve => 0,
            other => other as u8,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

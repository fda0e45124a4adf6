use crate::model::team::TeamId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A chair at the table. Tables seat 2, 4 or 6 players with teams
/// alternating around the circle, so a seat's parity fixes its team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seat(u8);

/// Legal table sizes for a two-team match.
pub const TABLE_SIZES: [u8; 3] = [2, 4, 6];

impl Seat {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn team(self) -> TeamId {
        if self.0 % 2 == 0 { TeamId::A } else { TeamId::B }
    }

    pub const fn next(self, players: u8) -> Seat {
        Seat((self.0 + 1) % players)
    }

    /// Seats in play order starting from `first`, wrapping the table once.
    pub fn order_from(first: Seat, players: u8) -> Vec<Seat> {
        (0..players)
            .map(|offset| Seat((first.0 + offset) % players))
            .collect()
    }

    /// The "pie" of a team: its member who acts last in the round order,
    /// the seat that holds envido initiative for that team.
    pub fn pie_of(team: TeamId, mano: Seat, players: u8) -> Seat {
        Self::order_from(mano, players)
            .into_iter()
            .rev()
            .find(|seat| seat.team() == team)
            .unwrap_or(mano)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Seat;
    use crate::model::team::TeamId;

    #[test]
    fn parity_assigns_teams() {
        assert_eq!(Seat::new(0).team(), TeamId::A);
        assert_eq!(Seat::new(1).team(), TeamId::B);
        assert_eq!(Seat::new(2).team(), TeamId::A);
    }

    #[test]
    fn next_wraps_around_the_table() {
        assert_eq!(Seat::new(3).next(4), Seat::new(0));
        assert_eq!(Seat::new(1).next(2), Seat::new(0));
    }

    #[test]
    fn order_from_starts_at_mano() {
        let order = Seat::order_from(Seat::new(2), 4);
        assert_eq!(
            order,
            vec![Seat::new(2), Seat::new(3), Seat::new(0), Seat::new(1)]
        );
    }

    #[test]
    fn pie_is_the_last_teammate_in_round_order() {
        // Mano at seat 1 on a 4-player table: order 1, 2, 3, 0.
        assert_eq!(Seat::pie_of(TeamId::B, Seat::new(1), 4), Seat::new(3));
        assert_eq!(Seat::pie_of(TeamId::A, Seat::new(1), 4), Seat::new(0));
    }

    #[test]
    fn heads_up_pie_is_the_player_itself() {
        assert_eq!(Seat::pie_of(TeamId::A, Seat::new(0), 2), Seat::new(0));
        assert_eq!(Seat::pie_of(TeamId::B, Seat::new(0), 2), Seat::new(1));
    }
}

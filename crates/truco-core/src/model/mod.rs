pub mod action;
pub mod card;
pub mod deck;
pub mod envido;
pub mod hand;
pub mod rank;
pub mod round;
pub mod seat;
pub mod suit;
pub mod team;
pub mod trick;
pub mod truco_bid;

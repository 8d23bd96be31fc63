pub mod countdown;
pub mod game;
pub mod topics;

pub use game::{Game, GameStatus, Transition};

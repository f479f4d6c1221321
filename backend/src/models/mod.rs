pub mod game;
pub mod score;
pub mod user;

pub use game::{Game, GameHistory, GameSnapshot};
pub use score::Score;
pub use user::{User, UserRank};

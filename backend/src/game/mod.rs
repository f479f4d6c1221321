// Game rules: the per-game state machine, scoring and ranking

pub mod engine;
pub mod ranking;
pub mod scorer;

pub use engine::{Ending, GameState, MoveRecord, RevealTracker, RuleError, DEFAULT_MAX_TRIES};
pub use ranking::{Ranking, RankingUpdate};
pub use scorer::{ScoreResult, Scorer};

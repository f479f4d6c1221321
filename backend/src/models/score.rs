use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::game::ScoreResult;

/// Immutable record written once per finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Score {
    pub score_id: Uuid,
    /// The finished game; unique, so recording a score twice is a no-op
    pub game_id: Uuid,
    pub user_id: i64,
    pub user_name: String,
    pub date: NaiveDate,
    pub won: bool,
    pub wrong_guesses: i32,
    pub points: i32,
}

impl Score {
    pub fn new(game_id: Uuid, user_id: i64, user_name: &str, date: NaiveDate, result: &ScoreResult) -> Self {
        Self {
            score_id: Uuid::new_v4(),
            game_id,
            user_id,
            user_name: user_name.to_string(),
            date,
            won: result.won,
            wrong_guesses: result.wrong_guesses,
            points: result.points,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    /// Unique player name
    pub name: String,
    pub email: String,
    /// Mean points over every finished game
    pub ranking_score: i32,
    pub completed_games: i32,
    pub created_at: DateTime<Utc>,
}

/// Entry of the global user ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRank {
    pub user_name: String,
    pub ranking_score: i32,
    pub completed_games: i32,
}

impl User {
    pub fn new(user_id: i64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            email: email.into(),
            ranking_score: 0,
            completed_games: 0,
            created_at: Utc::now(),
        }
    }

    pub fn to_rank(&self) -> UserRank {
        UserRank {
            user_name: self.name.clone(),
            ranking_score: self.ranking_score,
            completed_games: self.completed_games,
        }
    }
}

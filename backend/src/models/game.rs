use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{GameState, MoveRecord};

/// A stored game: rule state plus identity and ownership
#[derive(Debug, Clone)]
pub struct Game {
    pub game_id: Uuid,
    pub user_id: i64,
    pub state: GameState,
    pub created_at: DateTime<Utc>,
}

/// Client-facing view of a game. Never carries the hidden word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: Uuid,
    pub user_name: String,
    pub tries_remaining: u32,
    pub game_over: bool,
    pub game_deleted: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameHistory {
    pub game_id: Uuid,
    pub move_history: Vec<MoveRecord>,
}

impl Game {
    pub fn new(user_id: i64, state: GameState) -> Self {
        Self {
            game_id: Uuid::new_v4(),
            user_id,
            state,
            created_at: Utc::now(),
        }
    }

    pub fn to_snapshot(&self, user_name: &str, message: impl Into<String>) -> GameSnapshot {
        GameSnapshot {
            game_id: self.game_id,
            user_name: user_name.to_string(),
            tries_remaining: self.state.tries_remaining,
            game_over: self.state.game_over,
            game_deleted: self.state.game_deleted,
            message: message.into(),
        }
    }

    pub fn to_history(&self) -> GameHistory {
        GameHistory {
            game_id: self.game_id,
            move_history: self.state.move_history.clone(),
        }
    }
}

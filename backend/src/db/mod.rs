use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    game::RankingUpdate,
    models::{Game, Score, User},
};

pub mod memory;
pub mod queries;

pub use memory::MemoryStore;

pub async fn create_pool(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Persistence for users, games and scores.
///
/// Implementations store records independently; there are no cross-record
/// transactions. Writes to one game must not be issued concurrently.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a user, returning `None` if the name is taken
    async fn create_user(&self, name: &str, email: &str) -> Result<Option<User>>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;
    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    /// All users, highest ranking score first
    async fn list_users_by_ranking(&self) -> Result<Vec<User>>;
    async fn update_user_ranking(&self, user_id: i64, update: RankingUpdate) -> Result<()>;
    async fn users_with_active_games(&self) -> Result<Vec<User>>;

    async fn insert_game(&self, game: &Game) -> Result<()>;
    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>>;
    async fn save_game(&self, game: &Game) -> Result<()>;
    /// Games of one user that are neither finished nor deleted
    async fn list_active_games_for_user(&self, user_id: i64) -> Result<Vec<Game>>;
    /// `tries_remaining` of every unfinished game
    async fn active_tries_remaining(&self) -> Result<Vec<i32>>;

    /// Record a score. Idempotent per game.
    async fn insert_score(&self, score: &Score) -> Result<()>;
    async fn list_scores(&self) -> Result<Vec<Score>>;
    async fn list_user_scores(&self, user_id: i64) -> Result<Vec<Score>>;
    /// Winning scores ordered by points descending
    async fn list_winning_scores(&self, limit: Option<usize>) -> Result<Vec<Score>>;
}

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameStore for PgStore {
    async fn create_user(&self, name: &str, email: &str) -> Result<Option<User>> {
        Ok(queries::create_user(&self.pool, name, email).await?)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(queries::get_user(&self.pool, user_id).await?)
    }

    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(queries::get_user_by_name(&self.pool, name).await?)
    }

    async fn list_users_by_ranking(&self) -> Result<Vec<User>> {
        Ok(queries::list_users_by_ranking(&self.pool).await?)
    }

    async fn update_user_ranking(&self, user_id: i64, update: RankingUpdate) -> Result<()> {
        Ok(queries::update_user_ranking(&self.pool, user_id, update).await?)
    }

    async fn users_with_active_games(&self) -> Result<Vec<User>> {
        Ok(queries::users_with_active_games(&self.pool).await?)
    }

    async fn insert_game(&self, game: &Game) -> Result<()> {
        Ok(queries::insert_game(&self.pool, game).await?)
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        Ok(queries::get_game(&self.pool, game_id).await?)
    }

    async fn save_game(&self, game: &Game) -> Result<()> {
        Ok(queries::save_game(&self.pool, game).await?)
    }

    async fn list_active_games_for_user(&self, user_id: i64) -> Result<Vec<Game>> {
        Ok(queries::list_active_games_for_user(&self.pool, user_id).await?)
    }

    async fn active_tries_remaining(&self) -> Result<Vec<i32>> {
        Ok(queries::active_tries_remaining(&self.pool).await?)
    }

    async fn insert_score(&self, score: &Score) -> Result<()> {
        Ok(queries::insert_score(&self.pool, score).await?)
    }

    async fn list_scores(&self) -> Result<Vec<Score>> {
        Ok(queries::list_scores(&self.pool).await?)
    }

    async fn list_user_scores(&self, user_id: i64) -> Result<Vec<Score>> {
        Ok(queries::list_user_scores(&self.pool, user_id).await?)
    }

    async fn list_winning_scores(&self, limit: Option<usize>) -> Result<Vec<Score>> {
        let limit = limit.map(|n| n as i64);
        Ok(queries::list_winning_scores(&self.pool, limit).await?)
    }
}

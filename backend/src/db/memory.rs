use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::GameStore;
use crate::{
    game::RankingUpdate,
    models::{Game, Score, User},
};

/// In-process store used when no database is configured, and by tests
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<i64, User>,
    /// Index from user name to user_id; owns name uniqueness
    user_name_index: DashMap<String, i64>,
    games: DashMap<Uuid, Game>,
    /// Scores keyed by game_id, so each game is scored at most once
    scores: DashMap<Uuid, Score>,
    next_user_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_scores<F>(&self, filter: F) -> Vec<Score>
    where
        F: Fn(&Score) -> bool,
    {
        let mut scores: Vec<Score> = self
            .scores
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        scores.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.user_name.cmp(&b.user_name)));
        scores
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn create_user(&self, name: &str, email: &str) -> Result<Option<User>> {
        match self.user_name_index.entry(name.to_string()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let user_id = self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
                let user = User::new(user_id, name, email);
                self.users.insert(user_id, user.clone());
                slot.insert(user_id);
                Ok(Some(user))
            }
        }
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let Some(user_id) = self.user_name_index.get(name).map(|id| *id) else {
            return Ok(None);
        };
        self.get_user(user_id).await
    }

    async fn list_users_by_ranking(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| {
            b.ranking_score
                .cmp(&a.ranking_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(users)
    }

    async fn update_user_ranking(&self, user_id: i64, update: RankingUpdate) -> Result<()> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| anyhow::anyhow!("user {} does not exist", user_id))?;
        user.ranking_score = update.ranking_score;
        user.completed_games = update.completed_games;
        Ok(())
    }

    async fn users_with_active_games(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| !u.email.is_empty())
            .filter(|u| {
                self.games
                    .iter()
                    .any(|g| g.user_id == u.user_id && !g.state.game_over)
            })
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn insert_game(&self, game: &Game) -> Result<()> {
        self.games.insert(game.game_id, game.clone());
        Ok(())
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        Ok(self.games.get(&game_id).map(|g| g.clone()))
    }

    async fn save_game(&self, game: &Game) -> Result<()> {
        let mut stored = self
            .games
            .get_mut(&game.game_id)
            .ok_or_else(|| anyhow::anyhow!("game {} does not exist", game.game_id))?;
        *stored = game.clone();
        Ok(())
    }

    async fn list_active_games_for_user(&self, user_id: i64) -> Result<Vec<Game>> {
        let mut games: Vec<Game> = self
            .games
            .iter()
            .filter(|g| g.user_id == user_id && !g.state.game_over && !g.state.game_deleted)
            .map(|g| g.clone())
            .collect();
        games.sort_by_key(|g| g.created_at);
        Ok(games)
    }

    async fn active_tries_remaining(&self) -> Result<Vec<i32>> {
        self.games
            .iter()
            .filter(|g| !g.state.game_over)
            .map(|g| {
                i32::try_from(g.state.tries_remaining)
                    .with_context(|| format!("game {} tries_remaining out of range", g.game_id))
            })
            .collect()
    }

    async fn insert_score(&self, score: &Score) -> Result<()> {
        self.scores
            .entry(score.game_id)
            .or_insert_with(|| score.clone());
        Ok(())
    }

    async fn list_scores(&self) -> Result<Vec<Score>> {
        Ok(self.sorted_scores(|_| true))
    }

    async fn list_user_scores(&self, user_id: i64) -> Result<Vec<Score>> {
        Ok(self.sorted_scores(|s| s.user_id == user_id))
    }

    async fn list_winning_scores(&self, limit: Option<usize>) -> Result<Vec<Score>> {
        let mut scores = self.sorted_scores(|s| s.won);
        scores.sort_by(|a, b| b.points.cmp(&a.points));
        if let Some(limit) = limit {
            scores.truncate(limit);
        }
        Ok(scores)
    }
}

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    cache::AverageAttemptsCache,
    db::GameStore,
    dictionary::Dictionary,
    error::HangmanError,
    game::{Ending, GameState, Scorer},
    models::{Game, GameHistory, GameSnapshot, Score, User, UserRank},
    repair::{self, RepairItem, RepairQueue},
};

const USER_NOT_FOUND: &str = "A User with that name does not exist!";
const GAME_NOT_FOUND: &str = "Game not found!";

/// Longest hidden word a game may ask for
pub const MAX_WORD_SIZE: u32 = 64;
/// Most wrong guesses a game may allow
pub const MAX_ATTEMPTS: u32 = 100;

/// Values used when a new game request leaves a setting out
#[derive(Debug, Clone, Copy)]
pub struct GameDefaults {
    pub word_size: u32,
    pub attempts: u32,
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            word_size: 5,
            attempts: crate::game::DEFAULT_MAX_TRIES,
        }
    }
}

/// Snapshot returned by a move, with a flag when scoring was deferred to repair
#[derive(Debug, Clone, Serialize)]
pub struct MoveResult {
    #[serde(flatten)]
    pub snapshot: GameSnapshot,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub scoring_pending: bool,
}

/// Game operations exposed to clients.
///
/// Each call handles one request; the service holds no per-game locks and
/// relies on callers to send at most one mutation per game at a time.
pub struct HangmanService {
    store: Arc<dyn GameStore>,
    dictionary: Arc<Dictionary>,
    average_cache: Arc<AverageAttemptsCache>,
    repairs: Arc<RepairQueue>,
    defaults: GameDefaults,
}

impl HangmanService {
    pub fn new(store: Arc<dyn GameStore>, dictionary: Arc<Dictionary>, defaults: GameDefaults) -> Self {
        Self {
            store,
            dictionary,
            average_cache: Arc::new(AverageAttemptsCache::new()),
            repairs: Arc::new(RepairQueue::new()),
            defaults,
        }
    }

    pub fn store(&self) -> Arc<dyn GameStore> {
        Arc::clone(&self.store)
    }

    pub fn repairs(&self) -> Arc<RepairQueue> {
        Arc::clone(&self.repairs)
    }

    pub fn dictionary_words(&self) -> usize {
        self.dictionary.len()
    }

    // User management

    pub async fn create_user(&self, name: &str, email: &str) -> Result<User, HangmanError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(HangmanError::InvalidInput("No user name supplied.".to_string()));
        }
        if email.is_empty() {
            return Err(HangmanError::InvalidInput("No email address supplied.".to_string()));
        }

        let user = self
            .store
            .create_user(name, email)
            .await?
            .ok_or(HangmanError::Conflict)?;

        tracing::info!("Created user {} ({})", user.name, user.user_id);
        Ok(user)
    }

    async fn find_user(&self, user_name: &str) -> Result<User, HangmanError> {
        self.store
            .get_user_by_name(user_name)
            .await?
            .ok_or_else(|| HangmanError::NotFound(USER_NOT_FOUND.to_string()))
    }

    async fn owner_name(&self, game: &Game) -> Result<String, HangmanError> {
        let user = self.store.get_user(game.user_id).await?.ok_or_else(|| {
            HangmanError::Storage(anyhow::anyhow!(
                "game {} references missing user {}",
                game.game_id,
                game.user_id
            ))
        })?;
        Ok(user.name)
    }

    async fn find_game(&self, game_id: &str) -> Result<Game, HangmanError> {
        let game_id = Uuid::parse_str(game_id.trim())
            .map_err(|_| HangmanError::NotFound(GAME_NOT_FOUND.to_string()))?;
        self.store
            .get_game(game_id)
            .await?
            .ok_or_else(|| HangmanError::NotFound(GAME_NOT_FOUND.to_string()))
    }

    /// Active, non-deleted games of one user
    pub async fn list_user_games(&self, user_name: &str) -> Result<Vec<GameSnapshot>, HangmanError> {
        let user = self.find_user(user_name).await?;
        let games = self.store.list_active_games_for_user(user.user_id).await?;
        Ok(games
            .iter()
            .map(|g| g.to_snapshot(&user.name, "Active Game."))
            .collect())
    }

    // Game management

    pub async fn new_game(
        &self,
        user_name: &str,
        word_size: Option<u32>,
        attempts: Option<u32>,
    ) -> Result<GameSnapshot, HangmanError> {
        if user_name.trim().is_empty() {
            return Err(HangmanError::InvalidInput("No user name supplied.".to_string()));
        }
        let word_size = word_size.unwrap_or(self.defaults.word_size);
        let attempts = attempts.unwrap_or(self.defaults.attempts);
        if !(1..=MAX_WORD_SIZE).contains(&word_size) {
            return Err(HangmanError::InvalidInput(format!(
                "word_size must be between 1 and {}",
                MAX_WORD_SIZE
            )));
        }
        if !(1..=MAX_ATTEMPTS).contains(&attempts) {
            return Err(HangmanError::InvalidInput(format!(
                "attempts must be between 1 and {}",
                MAX_ATTEMPTS
            )));
        }

        let user = self.find_user(user_name).await?;
        let word = self.dictionary.select(word_size as usize)?;

        let game = Game::new(user.user_id, GameState::new(word, attempts));
        self.store.insert_game(&game).await?;

        tracing::info!(
            "User {} started game {} ({} letters, {} attempts)",
            user.name,
            game.game_id,
            word_size,
            attempts
        );

        // Not needed to answer the request, so it runs out of band
        self.average_cache.schedule_refresh(self.store());

        Ok(game.to_snapshot(&user.name, "Good luck playing Hangman!"))
    }

    pub async fn get_game(&self, game_id: &str) -> Result<GameSnapshot, HangmanError> {
        let game = self.find_game(game_id).await?;
        if game.state.game_deleted {
            return Err(HangmanError::GameDeleted);
        }
        let user_name = self.owner_name(&game).await?;
        Ok(game.to_snapshot(&user_name, "Time to make a move!"))
    }

    pub async fn get_game_history(&self, game_id: &str) -> Result<GameHistory, HangmanError> {
        Ok(self.find_game(game_id).await?.to_history())
    }

    pub async fn delete_game(&self, game_id: &str) -> Result<GameSnapshot, HangmanError> {
        let mut game = self.find_game(game_id).await?;
        game.state = game.state.delete()?;
        self.store.save_game(&game).await?;

        tracing::info!("Game {} deleted", game.game_id);
        let user_name = self.owner_name(&game).await?;
        Ok(game.to_snapshot(&user_name, "Game Deleted"))
    }

    pub async fn make_move(&self, game_id: &str, guess: &str) -> Result<MoveResult, HangmanError> {
        let mut game = self.find_game(game_id).await?;
        let transition = game.state.apply_guess(guess)?;

        // Load the owner first so nothing but scoring can fail after a terminal write
        let user = self.store.get_user(game.user_id).await?.ok_or_else(|| {
            HangmanError::Storage(anyhow::anyhow!("game {} has no owner", game.game_id))
        })?;

        game.state = transition.state;
        self.store.save_game(&game).await?;

        let scoring_pending = match transition.ending {
            Some(ending) => !self.record_ending(&game, &user, ending).await,
            None => false,
        };

        Ok(MoveResult {
            snapshot: game.to_snapshot(&user.name, transition.message),
            scoring_pending,
        })
    }

    /// Score the finished game and refresh the owner's ranking.
    ///
    /// The game is already saved as finished, so failures here do not undo the
    /// move: the failed step is queued for repair. Returns false in that case.
    async fn record_ending(&self, game: &Game, user: &User, ending: Ending) -> bool {
        let result = Scorer::score_game(&game.state, ending.won());
        let score = Score::new(game.game_id, user.user_id, &user.name, Utc::now().date_naive(), &result);

        if let Err(e) = self.store.insert_score(&score).await {
            tracing::error!(
                "Game {} finished but its score could not be recorded, queued for repair: {:#}",
                game.game_id,
                e
            );
            self.repairs.push(RepairItem::RecordScore(score));
            return false;
        }

        match repair::recompute_ranking(self.store.as_ref(), user.user_id).await {
            Ok(update) => {
                tracing::info!(
                    "Game {} over (won: {}, points: {}); {} now ranks {} after {} games",
                    game.game_id,
                    result.won,
                    result.points,
                    user.name,
                    update.ranking_score,
                    update.completed_games
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    "Game {} scored but ranking for {} could not be updated, queued for repair: {:#}",
                    game.game_id,
                    user.name,
                    e
                );
                self.repairs.push(RepairItem::RecomputeRanking {
                    user_id: user.user_id,
                });
                false
            }
        }
    }

    // Scores and rankings

    pub async fn list_scores(&self) -> Result<Vec<Score>, HangmanError> {
        Ok(self.store.list_scores().await?)
    }

    pub async fn list_user_scores(&self, user_name: &str) -> Result<Vec<Score>, HangmanError> {
        let user = self.find_user(user_name).await?;
        Ok(self.store.list_user_scores(user.user_id).await?)
    }

    /// Winning scores, most points first
    pub async fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<Score>, HangmanError> {
        let scores = self.store.list_winning_scores(limit).await?;
        if scores.is_empty() {
            return Err(HangmanError::NotFound("No Games exist.".to_string()));
        }
        Ok(scores)
    }

    pub async fn user_rankings(&self) -> Result<Vec<UserRank>, HangmanError> {
        let users = self.store.list_users_by_ranking().await?;
        Ok(users.iter().map(User::to_rank).collect())
    }

    pub fn average_remaining_attempts(&self) -> String {
        self.average_cache.get()
    }

    pub async fn refresh_average_attempts(&self) -> Result<(), HangmanError> {
        Ok(self.average_cache.refresh(self.store.as_ref()).await?)
    }
}

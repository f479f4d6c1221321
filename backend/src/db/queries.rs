use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool, Result};
use uuid::Uuid;

use crate::{
    game::{GameState, MoveRecord, RankingUpdate, RevealTracker},
    models::{Game, Score, User},
};

/// Columns selected for every score query; the user name comes from the join
const SCORE_COLUMNS: &str = r#"
    s.score_id, s.game_id, s.user_id, u.name AS user_name,
    s.date, s.won, s.wrong_guesses, s.points
"#;

/// Row shape of the `games` table
#[derive(Debug, FromRow)]
struct GameRow {
    game_id: Uuid,
    user_id: i64,
    game_word: String,
    max_tries: i32,
    tries_remaining: i32,
    game_over: bool,
    game_deleted: bool,
    current_guesses: Json<RevealTracker>,
    move_history: Json<Vec<MoveRecord>>,
    created_at: DateTime<Utc>,
}

/// Game counters are stored as INTEGER columns
fn to_db_int(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Game {
            game_id: row.game_id,
            user_id: row.user_id,
            state: GameState {
                game_word: row.game_word,
                max_tries: row.max_tries.max(0) as u32,
                tries_remaining: row.tries_remaining.max(0) as u32,
                game_over: row.game_over,
                game_deleted: row.game_deleted,
                current_guesses: row.current_guesses.0,
                move_history: row.move_history.0,
            },
            created_at: row.created_at,
        }
    }
}

// User queries

/// Insert a new user. Returns `None` when the name is already taken.
pub async fn create_user(pool: &PgPool, name: &str, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_name(pool: &PgPool, name: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn list_users_by_ranking(pool: &PgPool) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY ranking_score DESC, name")
        .fetch_all(pool)
        .await
}

pub async fn update_user_ranking(pool: &PgPool, user_id: i64, update: RankingUpdate) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET ranking_score = $1,
            completed_games = $2
        WHERE user_id = $3
        "#,
    )
    .bind(update.ranking_score)
    .bind(update.completed_games)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Users with an email address and at least one unfinished game
pub async fn users_with_active_games(pool: &PgPool) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT DISTINCT u.*
        FROM users u
        JOIN games g ON g.user_id = u.user_id
        WHERE g.game_over = FALSE AND u.email <> ''
        ORDER BY u.name
        "#,
    )
    .fetch_all(pool)
    .await
}

// Game queries

pub async fn insert_game(pool: &PgPool, game: &Game) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO games (
            game_id, user_id, game_word, max_tries, tries_remaining,
            game_over, game_deleted, current_guesses, move_history, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(game.game_id)
    .bind(game.user_id)
    .bind(&game.state.game_word)
    .bind(to_db_int(game.state.max_tries)?)
    .bind(to_db_int(game.state.tries_remaining)?)
    .bind(game.state.game_over)
    .bind(game.state.game_deleted)
    .bind(Json(&game.state.current_guesses))
    .bind(Json(&game.state.move_history))
    .bind(game.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_game(pool: &PgPool, game_id: Uuid) -> Result<Option<Game>> {
    let row = sqlx::query_as::<_, GameRow>("SELECT * FROM games WHERE game_id = $1")
        .bind(game_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Game::from))
}

/// Persist the mutable part of a game's state.
///
/// Callers must serialize writes per game; there is no version check here.
pub async fn save_game(pool: &PgPool, game: &Game) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE games
        SET tries_remaining = $1,
            game_over = $2,
            game_deleted = $3,
            current_guesses = $4,
            move_history = $5
        WHERE game_id = $6
        "#,
    )
    .bind(to_db_int(game.state.tries_remaining)?)
    .bind(game.state.game_over)
    .bind(game.state.game_deleted)
    .bind(Json(&game.state.current_guesses))
    .bind(Json(&game.state.move_history))
    .bind(game.game_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_active_games_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Game>> {
    let rows = sqlx::query_as::<_, GameRow>(
        r#"
        SELECT * FROM games
        WHERE user_id = $1 AND game_over = FALSE AND game_deleted = FALSE
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Game::from).collect())
}

pub async fn active_tries_remaining(pool: &PgPool) -> Result<Vec<i32>> {
    sqlx::query_scalar::<_, i32>("SELECT tries_remaining FROM games WHERE game_over = FALSE")
        .fetch_all(pool)
        .await
}

// Score queries

/// Record a finished game's score. A second insert for the same game is ignored.
pub async fn insert_score(pool: &PgPool, score: &Score) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO scores (score_id, game_id, user_id, date, won, wrong_guesses, points)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (game_id) DO NOTHING
        "#,
    )
    .bind(score.score_id)
    .bind(score.game_id)
    .bind(score.user_id)
    .bind(score.date)
    .bind(score.won)
    .bind(score.wrong_guesses)
    .bind(score.points)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_scores(pool: &PgPool) -> Result<Vec<Score>> {
    sqlx::query_as::<_, Score>(&format!(
        "SELECT {SCORE_COLUMNS} FROM scores s JOIN users u ON u.user_id = s.user_id ORDER BY s.date, u.name"
    ))
    .fetch_all(pool)
    .await
}

pub async fn list_user_scores(pool: &PgPool, user_id: i64) -> Result<Vec<Score>> {
    sqlx::query_as::<_, Score>(&format!(
        "SELECT {SCORE_COLUMNS} FROM scores s JOIN users u ON u.user_id = s.user_id WHERE s.user_id = $1 ORDER BY s.date"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Winning scores, best first. A `None` limit returns all of them.
pub async fn list_winning_scores(pool: &PgPool, limit: Option<i64>) -> Result<Vec<Score>> {
    sqlx::query_as::<_, Score>(&format!(
        r#"
        SELECT {SCORE_COLUMNS}
        FROM scores s JOIN users u ON u.user_id = s.user_id
        WHERE s.won = TRUE
        ORDER BY s.points DESC, s.date
        LIMIT $1
        "#
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

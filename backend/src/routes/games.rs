use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::StringMessage;
use crate::{
    error::HangmanError,
    models::{GameHistory, GameSnapshot},
    service::MoveResult,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct NewGameRequest {
    #[serde(default)]
    pub user_name: String,
    /// Length of the hidden word; the configured default when omitted
    pub word_size: Option<u32>,
    /// Wrong guesses allowed; the configured default when omitted
    pub attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MakeMoveRequest {
    #[serde(default)]
    pub guess: String,
}

pub async fn new_game(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewGameRequest>,
) -> Result<(StatusCode, Json<GameSnapshot>), HangmanError> {
    let snapshot = state
        .service
        .new_game(&payload.user_name, payload.word_size, payload.attempts)
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameSnapshot>, HangmanError> {
    Ok(Json(state.service.get_game(&game_id).await?))
}

pub async fn get_game_history(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameHistory>, HangmanError> {
    Ok(Json(state.service.get_game_history(&game_id).await?))
}

/// Soft-delete a game that is still in progress
pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameSnapshot>, HangmanError> {
    Ok(Json(state.service.delete_game(&game_id).await?))
}

pub async fn make_move(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(payload): Json<MakeMoveRequest>,
) -> Result<Json<MoveResult>, HangmanError> {
    let result = state.service.make_move(&game_id, &payload.guess).await?;
    if result.scoring_pending {
        tracing::warn!("Move on game {} accepted; scoring deferred to repair", game_id);
    }
    Ok(Json(result))
}

/// Cached average of tries remaining across active games
pub async fn average_attempts(State(state): State<Arc<AppState>>) -> Json<StringMessage> {
    Json(StringMessage::new(state.service.average_remaining_attempts()))
}

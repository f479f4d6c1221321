use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{Items, StringMessage};
use crate::{
    error::HangmanError,
    models::{GameSnapshot, UserRank},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
}

/// Register a user. Names must be unique.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<StringMessage>), HangmanError> {
    let user = state
        .service
        .create_user(&payload.user_name, &payload.email)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StringMessage::new(format!("User {} created!", user.name))),
    ))
}

/// Active games of one user
pub async fn get_user_games(
    State(state): State<Arc<AppState>>,
    Path(user_name): Path<String>,
) -> Result<Json<Items<GameSnapshot>>, HangmanError> {
    let games = state.service.list_user_games(&user_name).await?;
    Ok(Json(Items::new(games)))
}

/// Global ranking, best ranking score first
pub async fn user_rankings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Items<UserRank>>, HangmanError> {
    let ranks = state.service.user_rankings().await?;
    Ok(Json(Items::new(ranks)))
}

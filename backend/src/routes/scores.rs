use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::Items;
use crate::{error::HangmanError, models::Score, AppState};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub number_of_results: Option<usize>,
}

pub async fn list_scores(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Items<Score>>, HangmanError> {
    Ok(Json(Items::new(state.service.list_scores().await?)))
}

pub async fn list_user_scores(
    State(state): State<Arc<AppState>>,
    Path(user_name): Path<String>,
) -> Result<Json<Items<Score>>, HangmanError> {
    Ok(Json(Items::new(state.service.list_user_scores(&user_name).await?)))
}

/// Winning scores, most points first, optionally limited
pub async fn leader_board(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Items<Score>>, HangmanError> {
    let scores = state.service.leaderboard(query.number_of_results).await?;
    Ok(Json(Items::new(scores)))
}

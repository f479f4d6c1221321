use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{error::HangmanError, reminders, AppState};

/// Recompute the cached average of tries remaining
pub async fn cache_average_attempts(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, HangmanError> {
    state.service.refresh_average_attempts().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remind every user with unfinished games. Triggered by an external scheduler.
pub async fn send_reminders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, HangmanError> {
    let store = state.service.store();
    let sent = reminders::send_reminders(
        store.as_ref(),
        state.mailer.as_ref(),
        &state.config.mail.sender,
    )
    .await?;
    Ok(Json(json!({ "sent": sent })))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::game::RuleError;

/// Errors surfaced to callers of the hangman service
#[derive(Debug, Error)]
pub enum HangmanError {
    #[error("{0}")]
    NotFound(String),

    #[error("A User with that name already exists!")]
    Conflict,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Illegal action: {0}")]
    InvalidGuess(String),

    /// A guess against a game that can no longer be played
    #[error("Illegal action: Game is {}.", finished_reason(.deleted))]
    GameFinished { deleted: bool },

    #[error("Game has been deleted")]
    GameDeleted,

    #[error("Cannot delete completed games")]
    AlreadyFinished,

    #[error("No target words of length {0} available!")]
    NoWordAvailable(usize),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

fn finished_reason(deleted: &bool) -> &'static str {
    if *deleted {
        "deleted"
    } else {
        "already over"
    }
}

impl From<RuleError> for HangmanError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::InvalidGuess(reason) => HangmanError::InvalidGuess(reason),
            RuleError::GameFinished { deleted } => HangmanError::GameFinished { deleted },
            RuleError::AlreadyFinished => HangmanError::AlreadyFinished,
        }
    }
}

impl HangmanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HangmanError::NotFound(_) => StatusCode::NOT_FOUND,
            HangmanError::Conflict => StatusCode::CONFLICT,
            HangmanError::InvalidInput(_)
            | HangmanError::InvalidGuess(_)
            | HangmanError::NoWordAvailable(_) => StatusCode::BAD_REQUEST,
            HangmanError::GameFinished { .. }
            | HangmanError::GameDeleted
            | HangmanError::AlreadyFinished => StatusCode::FORBIDDEN,
            HangmanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HangmanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            HangmanError::Storage(e) => {
                tracing::error!("Storage failure while handling request: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok`, or `degraded` when no words are loaded and every new game would fail
    pub status: &'static str,
    pub version: &'static str,
    pub dictionary_words: usize,
    pub pending_repairs: usize,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let dictionary_words = state.service.dictionary_words();
    Json(HealthReport {
        status: if dictionary_words == 0 { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        dictionary_words,
        pending_repairs: state.service.repairs().len(),
    })
}

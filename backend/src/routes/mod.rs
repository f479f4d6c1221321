pub mod games;
pub mod health;
pub mod scores;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Serialize;

use crate::AppState;

/// Single string response body
#[derive(Debug, Serialize)]
pub struct StringMessage {
    pub message: String,
}

impl StringMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// List response body
#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> Items<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .route("/tasks/cache_average_attempts", post(tasks::cache_average_attempts))
        .route("/crons/send_reminder", get(tasks::send_reminders))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user", post(users::create_user))
        .route("/games/user/{user_name}", get(users::get_user_games))
        .route("/user_rankings", get(users::user_rankings))
        .route("/game", post(games::new_game))
        .route("/game/{game_id}", get(games::get_game).put(games::make_move))
        .route("/game/history/{game_id}", get(games::get_game_history))
        .route("/del_game/{game_id}", put(games::delete_game))
        .route("/games/average_attempts", get(games::average_attempts))
        .route("/scores", get(scores::list_scores))
        .route("/scores/user/{user_name}", get(scores::list_user_scores))
        .route("/leader_board", get(scores::leader_board))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::MemoryStore,
        dictionary::Dictionary,
        reminders::LogMailer,
        service::{GameDefaults, HangmanService},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let service = HangmanService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(Dictionary::from_words(["apple", "zebra"])),
            GameDefaults::default(),
        );
        let state = Arc::new(AppState {
            config,
            service,
            mailer: Arc::new(LogMailer),
        });
        create_routes().with_state(state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_user_and_game(app: &Router) -> String {
        let (status, _) = call(
            app,
            Method::POST,
            "/api/user",
            Some(json!({ "user_name": "alice", "email": "alice@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(
            app,
            Method::POST,
            "/api/game",
            Some(json!({ "user_name": "alice", "attempts": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["game_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dictionary_words"], 2);
        assert_eq!(body["pending_repairs"], 0);
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let app = test_app();
        let payload = json!({ "user_name": "bob", "email": "bob@example.com" });
        let (status, body) = call(&app, Method::POST, "/api/user", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User bob created!");

        let (status, body) = call(&app, Method::POST, "/api/user", Some(payload)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A User with that name already exists!");
    }

    #[tokio::test]
    async fn test_missing_email_is_bad_request() {
        let app = test_app();
        let (status, _) = call(&app, Method::POST, "/api/user", Some(json!({ "user_name": "bob" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_required_fields_are_bad_request() {
        let app = test_app();
        let (status, body) = call(&app, Method::POST, "/api/user", Some(json!({ "email": "x@y" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No user name supplied.");

        let (status, body) = call(&app, Method::POST, "/api/game", Some(json!({ "attempts": 3 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No user name supplied.");

        let game_id = create_user_and_game(&app).await;
        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/game/{}", game_id),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (_, snapshot) = call(&app, Method::GET, &format!("/api/game/{}", game_id), None).await;
        assert_eq!(snapshot["tries_remaining"], 3);
    }

    #[tokio::test]
    async fn test_oversized_attempts_are_bad_request() {
        let app = test_app();
        call(
            &app,
            Method::POST,
            "/api/user",
            Some(json!({ "user_name": "dana", "email": "d@example.com" })),
        )
        .await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/game",
            Some(json!({ "user_name": "dana", "attempts": u32::MAX })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("attempts must be between"));
    }

    #[tokio::test]
    async fn test_game_flow_over_http() {
        let app = test_app();
        let game_id = create_user_and_game(&app).await;

        let (status, body) = call(&app, Method::GET, &format!("/api/game/{}", game_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tries_remaining"], 3);
        assert_eq!(body["user_name"], "alice");
        assert_eq!(body["message"], "Time to make a move!");

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/game/{}", game_id),
            Some(json!({ "guess": "7" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Only a-z allowed"));

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/game/{}", game_id),
            Some(json!({ "guess": "q" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, games) = call(&app, Method::GET, "/api/games/user/alice", None).await;
        assert_eq!(games["items"].as_array().unwrap().len(), 1);
        assert_eq!(games["items"][0]["message"], "Active Game.");

        let (status, body) = call(&app, Method::GET, &format!("/api/game/history/{}", game_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["move_history"][0]["guess"], "q");
        assert_eq!(body["move_history"][0]["correct"], false);
    }

    #[tokio::test]
    async fn test_finished_game_is_forbidden() {
        let app = test_app();
        let game_id = create_user_and_game(&app).await;
        let uri = format!("/api/game/{}", game_id);

        // Both dictionary words are five letters; one of the two guesses wins
        let (_, first) = call(&app, Method::PUT, &uri, Some(json!({ "guess": "apple" }))).await;
        if first["game_over"] != true {
            let (_, second) = call(&app, Method::PUT, &uri, Some(json!({ "guess": "zebra" }))).await;
            assert_eq!(second["game_over"], true);
        }

        let (status, body) = call(&app, Method::PUT, &uri, Some(json!({ "guess": "a" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Illegal action: Game is already over.");

        let (status, _) = call(&app, Method::PUT, &format!("/api/del_game/{}", game_id), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, board) = call(&app, Method::GET, "/api/leader_board?number_of_results=5", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["items"][0]["user_name"], "alice");
        assert_eq!(board["items"][0]["won"], true);

        let (_, ranks) = call(&app, Method::GET, "/api/user_rankings", None).await;
        assert_eq!(ranks["items"][0]["completed_games"], 1);
    }

    #[tokio::test]
    async fn test_deleted_game_is_hidden() {
        let app = test_app();
        let game_id = create_user_and_game(&app).await;

        let (status, body) = call(&app, Method::PUT, &format!("/api/del_game/{}", game_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["game_deleted"], true);

        let (status, _) = call(&app, Method::GET, &format!("/api/game/{}", game_id), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_resources_are_not_found() {
        let app = test_app();
        let (status, _) = call(&app, Method::GET, "/api/game/does-not-exist", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::GET, "/api/scores/user/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(&app, Method::GET, "/api/leader_board", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No Games exist.");
    }

    #[tokio::test]
    async fn test_no_word_of_requested_length() {
        let app = test_app();
        call(
            &app,
            Method::POST,
            "/api/user",
            Some(json!({ "user_name": "carl", "email": "c@example.com" })),
        )
        .await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/game",
            Some(json!({ "user_name": "carl", "word_size": 12 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_average_attempts_task_and_query() {
        let app = test_app();
        let (_, body) = call(&app, Method::GET, "/api/games/average_attempts", None).await;
        assert_eq!(body["message"], "");

        create_user_and_game(&app).await;
        let (status, _) = call(&app, Method::POST, "/tasks/cache_average_attempts", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = call(&app, Method::GET, "/api/games/average_attempts", None).await;
        assert_eq!(body["message"], "The average moves remaining is 3.00");
    }

    #[tokio::test]
    async fn test_send_reminders_endpoint() {
        let app = test_app();
        create_user_and_game(&app).await;
        let (status, body) = call(&app, Method::GET, "/crons/send_reminder", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], 1);
    }
}

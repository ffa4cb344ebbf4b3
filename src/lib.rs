pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod services;
pub mod state;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // Board routes
        .route("/boards", post(handlers::boards::create_board))
        .route("/boards", get(handlers::boards::list_boards))
        .route("/boards/{board_id}", get(handlers::boards::get_board))
        .route("/boards/{board_id}", put(handlers::boards::update_board))
        .route("/boards/{board_id}", delete(handlers::boards::delete_board))
        .route(
            "/boards/{board_id}/history",
            get(handlers::boards::history),
        )
        .route("/boards/{board_id}/export", get(handlers::boards::export))
        // List routes
        .route(
            "/boards/{board_id}/lists",
            post(handlers::lists::create_list),
        )
        .route(
            "/boards/{board_id}/lists",
            get(handlers::lists::list_lists),
        )
        .route("/lists/{list_id}", put(handlers::lists::update_list))
        .route("/lists/{list_id}", delete(handlers::lists::delete_list))
        .route("/lists/{list_id}/move", patch(handlers::lists::move_list))
        // Card routes
        .route("/lists/{list_id}/cards", post(handlers::cards::create_card))
        .route("/cards/{card_id}", get(handlers::cards::get_card))
        .route("/cards/{card_id}", put(handlers::cards::update_card))
        .route("/cards/{card_id}", delete(handlers::cards::delete_card))
        .route("/cards/{card_id}/move", patch(handlers::cards::move_card))
        .route(
            "/cards/{card_id}/coordinates",
            post(handlers::cards::update_coordinates).delete(handlers::cards::clear_coordinates),
        )
        // Reorganization routes
        .route(
            "/clustering/preview",
            post(handlers::reorganize::preview_clusters),
        )
        .route(
            "/clustering/apply",
            post(handlers::reorganize::apply_clusters),
        )
        .route(
            "/geocoding/uncoded",
            post(handlers::reorganize::uncoded_cards),
        )
        .route("/bulk/move", post(handlers::reorganize::bulk_move))
        .route("/bulk/delete", post(handlers::reorganize::bulk_delete))
        .route("/undo", post(handlers::reorganize::undo_last));

    Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub mod test_utils {
    use crate::auth::{generate_token, hash_password, hash_token};
    use crate::config::ReorganizeConfig;
    use crate::state::AppState;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use uuid::Uuid;

    pub async fn create_test_pool() -> SqlitePool {
        // One connection: every in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    pub async fn create_test_state() -> AppState {
        let pool = create_test_pool().await;
        AppState::new(pool, ReorganizeConfig::default())
    }

    pub async fn create_test_user(state: &AppState, email: &str, name: &str) -> Uuid {
        let password_hash = hash_password("testpassword123").unwrap();
        state
            .users
            .create(email, &password_hash, name)
            .await
            .unwrap()
            .id
    }

    /// Returns the raw session token to put in the `session` cookie.
    pub async fn create_test_session(state: &AppState, user_id: Uuid) -> String {
        let token = generate_token();
        state
            .sessions
            .create(user_id, &hash_token(&token))
            .await
            .unwrap();
        token
    }
}

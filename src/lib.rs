use axum::{
    routing::{get, post},
    Router,
};
use sqlx::mysql::MySqlPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod serialize;

use config::Config;

/// Builds the application with every route bound to `pool`.
pub fn build_router(pool: MySqlPool, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Front-end page and utilities
        .route_service("/", ServeFile::new(&config.static_index))
        .route("/api/health", get(routes::health::health_check))
        .route("/api/info", get(routes::health::api_info))

        // Cities
        .route("/api/cidades", get(routes::cities::get_cities).post(routes::cities::create_city))
        .route("/api/cidades/{id}", get(routes::cities::get_city_by_id))

        // Courses and holes
        .route("/api/campos", get(routes::courses::get_courses).post(routes::courses::create_course))
        .route("/api/campos/{id}", get(routes::courses::get_course_by_id))
        .route("/api/campos/{id}/pistas", get(routes::courses::get_course_holes))
        .route("/api/pistas", post(routes::holes::create_hole))
        .route("/api/pistas/{id}", get(routes::holes::get_hole_by_id))

        // Players
        .route("/api/jogadores", get(routes::players::get_players).post(routes::players::create_player))
        .route("/api/jogadores/{id}", get(routes::players::get_player_by_id))

        // Games and strokes
        .route("/api/jogos", get(routes::games::get_games).post(routes::games::create_game))
        .route("/api/jogos/{id}", get(routes::games::get_game_by_id))
        .route("/api/tacadas", post(routes::strokes::register_stroke))
        .route("/api/tacadas/{id}", get(routes::strokes::get_stroke_by_id))

        // Statistics
        .route("/api/estatisticas/campos", get(routes::statistics::get_course_statistics))
        .route("/api/estatisticas/jogadores", get(routes::statistics::get_player_leaderboard))
        .route("/api/estatisticas/jogador/{id}", get(routes::statistics::get_player_statistics))

        .fallback(routes::health::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

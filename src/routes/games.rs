use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{created, CreateGameRequest, CreatedResponse, GameDetail, GameSummary, ListGamesQuery};

/// GET /api/jogos - Most recent games first
///
/// Query params:
/// - campo_id: only games played on this course
/// - limit: maximum number of games (default 50)
pub async fn get_games(
    State(pool): State<MySqlPool>,
    ApiQuery(params): ApiQuery<ListGamesQuery>,
) -> Result<Json<Vec<GameSummary>>, ApiError> {
    let limit = params.limit()?;

    let mut conn = db::connect(&pool).await?;
    let games = db::get_games(&mut conn, params.campo_id, limit).await?;

    Ok(Json(games))
}

// GET /api/jogos/{id} - Game with its participants and strokes
pub async fn get_game_by_id(
    State(pool): State<MySqlPool>,
    ApiPath(game_id): ApiPath<i64>,
) -> Result<Json<GameDetail>, ApiError> {
    let mut conn = db::connect(&pool).await?;

    let game = db::get_game_by_id(&mut conn, game_id)
        .await?
        .ok_or(ApiError::NotFound("Game not found"))?;

    let participantes = db::get_game_participants(&mut conn, game_id).await?;
    let tacadas = db::get_game_strokes(&mut conn, game_id).await?;

    Ok(Json(GameDetail {
        game,
        participantes,
        tacadas,
    }))
}

// POST /api/jogos - Create a game and its participants atomically
pub async fn create_game(
    State(pool): State<MySqlPool>,
    ApiJson(req): ApiJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let game = req.validate(chrono::Local::now().naive_local())?;

    let mut conn = db::connect(&pool).await?;
    let id = db::create_game(&mut conn, &game).await?;

    tracing::info!(
        "Created game {} on course {} with {} players",
        id,
        game.campo_id,
        game.jogadores.len()
    );
    Ok(created(id, "Game created successfully"))
}

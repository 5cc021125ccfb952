use axum::{
    extract::State,
    response::Json,
};
use serde_json::{Map, Value};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::models::PlayerStatistics;

// GET /api/estatisticas/campos - Per-course aggregates
pub async fn get_course_statistics(
    State(pool): State<MySqlPool>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let stats = db::get_course_statistics(&mut conn).await?;

    Ok(Json(stats))
}

// GET /api/estatisticas/jogadores - Top of the player ranking
pub async fn get_player_leaderboard(
    State(pool): State<MySqlPool>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let ranking = db::get_player_leaderboard(&mut conn).await?;

    Ok(Json(ranking))
}

// GET /api/estatisticas/jogador/{id} - Aggregates for one player
pub async fn get_player_statistics(
    State(pool): State<MySqlPool>,
    ApiPath(player_id): ApiPath<i64>,
) -> Result<Json<PlayerStatistics>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let stats = db::get_player_statistics(&mut conn, player_id)
        .await?
        .ok_or(ApiError::NotFound("Player not found"))?;

    Ok(Json(stats))
}

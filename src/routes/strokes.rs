use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{created, CreatedResponse, RegisterStrokeRequest, StrokeDetail};

// GET /api/tacadas/{id} - Get stroke by ID
pub async fn get_stroke_by_id(
    State(pool): State<MySqlPool>,
    ApiPath(stroke_id): ApiPath<i64>,
) -> Result<Json<StrokeDetail>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let stroke = db::get_stroke_by_id(&mut conn, stroke_id)
        .await?
        .ok_or(ApiError::NotFound("Stroke not found"))?;

    Ok(Json(stroke))
}

/// POST /api/tacadas - Record a player's strokes on a hole
///
/// Re-submitting the same (game, player, hole) overwrites the earlier entry.
/// The game statistics are recomputed afterwards in a separate statement; if
/// that fails the stroke stays recorded and the error is still reported.
pub async fn register_stroke(
    State(pool): State<MySqlPool>,
    ApiJson(req): ApiJson<RegisterStrokeRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let stroke = req.validate()?;

    let mut conn = db::connect(&pool).await?;
    let id = db::upsert_stroke(&mut conn, &stroke).await?;

    if let Err(e) = db::recompute_game_statistics(&mut conn, stroke.jogo_id).await {
        tracing::warn!(
            "Stroke {} saved but statistics for game {} were not recomputed",
            id,
            stroke.jogo_id
        );
        return Err(e.into());
    }

    Ok(created(id, "Stroke registered successfully"))
}

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{created, CreateHoleRequest, CreatedResponse, HoleWithCourse};

// GET /api/pistas/{id} - Get an active hole
pub async fn get_hole_by_id(
    State(pool): State<MySqlPool>,
    ApiPath(hole_id): ApiPath<i64>,
) -> Result<Json<HoleWithCourse>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let hole = db::get_hole_by_id(&mut conn, hole_id)
        .await?
        .ok_or(ApiError::NotFound("Hole not found"))?;

    Ok(Json(hole))
}

// POST /api/pistas - Create a hole
pub async fn create_hole(
    State(pool): State<MySqlPool>,
    ApiJson(req): ApiJson<CreateHoleRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let hole = req.validate()?;

    let mut conn = db::connect(&pool).await?;
    let id = db::insert_hole(&mut conn, &hole).await?;

    tracing::info!("Created hole {} (#{} of course {})", id, hole.numero_pista, hole.campo_id);
    Ok(created(id, "Hole created successfully"))
}

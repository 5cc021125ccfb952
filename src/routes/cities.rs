use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{created, City, CreateCityRequest, CreatedResponse};

// GET /api/cidades - List all cities
pub async fn get_cities(
    State(pool): State<MySqlPool>,
) -> Result<Json<Vec<City>>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let cities = db::get_all_cities(&mut conn).await?;

    Ok(Json(cities))
}

// GET /api/cidades/{id} - Get city by ID
pub async fn get_city_by_id(
    State(pool): State<MySqlPool>,
    ApiPath(city_id): ApiPath<i64>,
) -> Result<Json<City>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let city = db::get_city_by_id(&mut conn, city_id)
        .await?
        .ok_or(ApiError::NotFound("City not found"))?;

    Ok(Json(city))
}

// POST /api/cidades - Create a city
pub async fn create_city(
    State(pool): State<MySqlPool>,
    ApiJson(req): ApiJson<CreateCityRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let city = req.validate()?;

    let mut conn = db::connect(&pool).await?;
    let id = db::insert_city(&mut conn, &city).await?;

    tracing::info!("Created city {} ({})", id, city.nome);
    Ok(created(id, "City created successfully"))
}

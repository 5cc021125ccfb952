use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use sqlx::mysql::MySqlPool;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{created, CityFilterQuery, CreatePlayerRequest, CreatedResponse, PlayerWithCity};

// GET /api/jogadores?cidade_id= - List players by name
pub async fn get_players(
    State(pool): State<MySqlPool>,
    ApiQuery(params): ApiQuery<CityFilterQuery>,
) -> Result<Json<Vec<PlayerWithCity>>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let players = db::get_all_players(&mut conn, params.cidade_id).await?;

    Ok(Json(players))
}

// GET /api/jogadores/{id} - Get player by ID
pub async fn get_player_by_id(
    State(pool): State<MySqlPool>,
    ApiPath(player_id): ApiPath<i64>,
) -> Result<Json<PlayerWithCity>, ApiError> {
    let mut conn = db::connect(&pool).await?;
    let player = db::get_player_by_id(&mut conn, player_id)
        .await?
        .ok_or(ApiError::NotFound("Player not found"))?;

    Ok(Json(player))
}

// POST /api/jogadores - Create a player
pub async fn create_player(
    State(pool): State<MySqlPool>,
    ApiJson(req): ApiJson<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let player = req.validate()?;

    let mut conn = db::connect(&pool).await?;
    let id = db::insert_player(&mut conn, &player).await?;

    tracing::info!("Created player {} ({})", id, player.nome);
    Ok(created(id, "Player created successfully"))
}

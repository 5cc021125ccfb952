use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use sqlx::mysql::MySqlPool;

use crate::db::{self, DbError};
use crate::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

// GET /api/health - Database connectivity probe
pub async fn health_check(State(pool): State<MySqlPool>) -> (StatusCode, Json<HealthResponse>) {
    let probe = async {
        let mut conn = db::connect(&pool).await?;
        db::ping(&mut conn).await?;
        Ok::<_, DbError>(())
    };

    match probe.await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK",
                database: "Connected",
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "ERROR",
                    database: "Disconnected",
                }),
            )
        }
    }
}

#[derive(Serialize)]
pub struct ApiInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
}

// GET /api/info - Static description of the API
pub async fn api_info() -> Json<ApiInfo> {
    let endpoints = BTreeMap::from([
        ("cidades", "/api/cidades"),
        ("campos", "/api/campos"),
        ("pistas", "/api/pistas"),
        ("jogadores", "/api/jogadores"),
        ("jogos", "/api/jogos"),
        ("tacadas", "/api/tacadas"),
        ("estatisticas", "/api/estatisticas"),
    ]);

    Json(ApiInfo {
        name: "Minigolfe Portugal API",
        version: env!("CARGO_PKG_VERSION"),
        description: "API for managing minigolf courses in Portugal",
        endpoints,
    })
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found")
}

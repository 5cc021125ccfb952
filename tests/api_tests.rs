mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{offline_app, send, send_raw};

#[tokio::test]
async fn info_lists_the_resources() {
    let app = offline_app();

    let (status, body) = send(&app, "GET", "/api/info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Minigolfe Portugal API");
    assert_eq!(body["endpoints"]["jogos"], "/api/jogos");
    assert_eq!(body["endpoints"]["tacadas"], "/api/tacadas");
}

#[tokio::test]
async fn health_reports_a_missing_database() {
    let app = offline_app();

    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "status": "ERROR", "database": "Disconnected" }));
}

#[tokio::test]
async fn unreachable_database_is_a_json_500() {
    let app = offline_app();

    let (status, body) = send(&app, "GET", "/api/cidades", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Database connection error"));
}

#[tokio::test]
async fn invalid_course_type_is_rejected_before_touching_the_database() {
    let app = offline_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/campos",
        Some(json!({ "nome": "Campo", "cidade_id": 1, "tipo": "invalid" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("tipo must be one of"));
}

#[tokio::test]
async fn missing_required_fields_are_400() {
    let app = offline_app();

    let cases = [
        ("/api/cidades", json!({ "nome": "Braga" }), "nome and distrito are required"),
        ("/api/campos", json!({ "nome": "Campo" }), "nome, cidade_id and tipo are required"),
        ("/api/pistas", json!({ "numero_pista": 1 }), "campo_id and numero_pista are required"),
        ("/api/jogadores", json!({ "email": "x@y.pt" }), "nome is required"),
        ("/api/jogos", json!({ "campo_id": 1 }), "campo_id and jogadores are required"),
        (
            "/api/tacadas",
            json!({ "jogo_id": 1, "jogador_id": 1 }),
            "jogo_id, jogador_id, pista_id and numero_tacadas are required",
        ),
    ];

    for (uri, payload, message) in cases {
        let (status, body) = send(&app, "POST", uri, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], message, "{}", uri);
    }
}

#[tokio::test]
async fn game_without_players_is_rejected() {
    let app = offline_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/jogos",
        Some(json!({ "campo_id": 1, "jogadores": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "at least one player is required");
}

#[tokio::test]
async fn malformed_input_is_shaped_as_json() {
    let app = offline_app();

    let (status, body) = send_raw(&app, "POST", "/api/cidades", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/api/campos/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/api/jogos?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn negative_limit_is_rejected() {
    let app = offline_app();

    let (status, body) = send(&app, "GET", "/api/jogos?limit=-5", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "limit must not be negative");
}

#[tokio::test]
async fn unknown_routes_are_json_404() {
    let app = offline_app();

    let (status, body) = send(&app, "GET", "/api/unknown", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Resource not found");
}

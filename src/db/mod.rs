use serde_json::{Map, Value};
use sqlx::mysql::{MySql, MySqlConnection, MySqlPool};
use sqlx::pool::PoolConnection;
use sqlx::Connection;
use thiserror::Error;

use crate::models::*;
use crate::serialize::row_to_record;

pub const LEADERBOARD_SIZE: i64 = 20;

#[derive(Debug, Error)]
pub enum DbError {
    /// No connection could be obtained.
    #[error("{0}")]
    Unavailable(#[source] sqlx::Error),

    /// A statement failed on an open connection.
    #[error("{0}")]
    Query(#[from] sqlx::Error),
}

/// Acquires a connection for the duration of one request.
///
/// The connection goes back to the pool when the returned guard is dropped,
/// whichever way the handler exits.
pub async fn connect(pool: &MySqlPool) -> Result<PoolConnection<MySql>, DbError> {
    pool.acquire().await.map_err(DbError::Unavailable)
}

pub async fn ping(conn: &mut MySqlConnection) -> Result<(), DbError> {
    conn.ping().await?;
    Ok(())
}

// Column lists shared by several queries. TIME columns are read as seconds.
const COURSE_COLUMNS: &str = r#"c.id, c.nome, c.cidade_id, c.tipo, c.endereco, c.telefone,
    c.website, c.email, c.latitude, c.longitude, c.preco_adulto, c.preco_crianca,
    CAST(TIME_TO_SEC(c.horario_abertura) AS SIGNED) AS horario_abertura,
    CAST(TIME_TO_SEC(c.horario_fecho) AS SIGNED) AS horario_fecho,
    c.ativo"#;

const HOLE_COLUMNS: &str =
    r#"p.id, p.campo_id, p.numero_pista, p.nome, p.dificuldade, p.par, p.descricao, p.ativa"#;

const PLAYER_COLUMNS: &str =
    r#"j.id, j.nome, j.email, j.telefone, j.data_nascimento, j.cidade_id, j.avatar_url"#;

const GAME_COLUMNS: &str = r#"j.id, j.campo_id, j.data_jogo, j.num_jogadores, j.observacoes,
    c.nome AS campo_nome, ci.nome AS cidade_nome"#;

const STROKE_COLUMNS: &str = r#"t.id, t.jogo_id, t.jogador_id, t.pista_id, t.numero_tacadas,
    CAST(TIME_TO_SEC(t.tempo_pista) AS SIGNED) AS tempo_pista, t.observacoes,
    p.numero_pista, p.nome AS pista_nome, jog.nome AS jogador_nome"#;

// City queries
pub async fn get_all_cities(conn: &mut MySqlConnection) -> Result<Vec<City>, DbError> {
    let cities = sqlx::query_as::<_, City>(
        r#"SELECT id, nome, distrito, codigo_postal FROM cidades ORDER BY nome"#
    )
    .fetch_all(conn)
    .await?;

    Ok(cities)
}

pub async fn get_city_by_id(conn: &mut MySqlConnection, city_id: i64) -> Result<Option<City>, DbError> {
    let city = sqlx::query_as::<_, City>(
        r#"SELECT id, nome, distrito, codigo_postal FROM cidades WHERE id = ?"#
    )
    .bind(city_id)
    .fetch_optional(conn)
    .await?;

    Ok(city)
}

pub async fn insert_city(conn: &mut MySqlConnection, city: &NewCity) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"INSERT INTO cidades (nome, distrito, codigo_postal) VALUES (?, ?, ?)"#
    )
    .bind(&city.nome)
    .bind(&city.distrito)
    .bind(&city.codigo_postal)
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}

// Course queries - only active courses are visible
pub async fn get_active_courses(
    conn: &mut MySqlConnection,
    city_id: Option<i64>,
) -> Result<Vec<CourseSummary>, DbError> {
    let sql = format!(
        r#"SELECT {COURSE_COLUMNS}, ci.nome AS cidade_nome, ci.distrito,
               (SELECT COUNT(*) FROM pistas p WHERE p.campo_id = c.id AND p.ativa = TRUE) AS total_pistas
           FROM campos c
           LEFT JOIN cidades ci ON c.cidade_id = ci.id
           WHERE c.ativo = TRUE AND (? IS NULL OR c.cidade_id = ?)
           ORDER BY ci.nome, c.nome"#
    );

    let courses = sqlx::query_as::<_, CourseSummary>(&sql)
        .bind(city_id)
        .bind(city_id)
        .fetch_all(conn)
        .await?;

    Ok(courses)
}

pub async fn get_course_by_id(
    conn: &mut MySqlConnection,
    course_id: i64,
) -> Result<Option<CourseWithCity>, DbError> {
    let sql = format!(
        r#"SELECT {COURSE_COLUMNS}, ci.nome AS cidade_nome, ci.distrito
           FROM campos c
           LEFT JOIN cidades ci ON c.cidade_id = ci.id
           WHERE c.id = ? AND c.ativo = TRUE"#
    );

    let course = sqlx::query_as::<_, CourseWithCity>(&sql)
        .bind(course_id)
        .fetch_optional(conn)
        .await?;

    Ok(course)
}

pub async fn insert_course(conn: &mut MySqlConnection, course: &NewCourse) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"INSERT INTO campos (nome, cidade_id, tipo, endereco, telefone, website, email,
                              latitude, longitude, preco_adulto, preco_crianca,
                              horario_abertura, horario_fecho)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
    )
    .bind(&course.nome)
    .bind(course.cidade_id)
    .bind(course.tipo.as_str())
    .bind(&course.endereco)
    .bind(&course.telefone)
    .bind(&course.website)
    .bind(&course.email)
    .bind(course.latitude)
    .bind(course.longitude)
    .bind(course.preco_adulto)
    .bind(course.preco_crianca)
    .bind(course.horario_abertura.map(|t| t.to_string()))
    .bind(course.horario_fecho.map(|t| t.to_string()))
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}

// Hole queries
pub async fn get_course_holes(conn: &mut MySqlConnection, course_id: i64) -> Result<Vec<Hole>, DbError> {
    let sql = format!(
        r#"SELECT {HOLE_COLUMNS}
           FROM pistas p
           WHERE p.campo_id = ? AND p.ativa = TRUE
           ORDER BY p.numero_pista"#
    );

    let holes = sqlx::query_as::<_, Hole>(&sql)
        .bind(course_id)
        .fetch_all(conn)
        .await?;

    Ok(holes)
}

pub async fn get_course_holes_with_course(
    conn: &mut MySqlConnection,
    course_id: i64,
) -> Result<Vec<HoleWithCourse>, DbError> {
    let sql = format!(
        r#"SELECT {HOLE_COLUMNS}, c.nome AS campo_nome
           FROM pistas p
           JOIN campos c ON p.campo_id = c.id
           WHERE p.campo_id = ? AND p.ativa = TRUE
           ORDER BY p.numero_pista"#
    );

    let holes = sqlx::query_as::<_, HoleWithCourse>(&sql)
        .bind(course_id)
        .fetch_all(conn)
        .await?;

    Ok(holes)
}

pub async fn get_hole_by_id(conn: &mut MySqlConnection, hole_id: i64) -> Result<Option<HoleWithCourse>, DbError> {
    let sql = format!(
        r#"SELECT {HOLE_COLUMNS}, c.nome AS campo_nome
           FROM pistas p
           JOIN campos c ON p.campo_id = c.id
           WHERE p.id = ? AND p.ativa = TRUE"#
    );

    let hole = sqlx::query_as::<_, HoleWithCourse>(&sql)
        .bind(hole_id)
        .fetch_optional(conn)
        .await?;

    Ok(hole)
}

pub async fn insert_hole(conn: &mut MySqlConnection, hole: &NewHole) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"INSERT INTO pistas (campo_id, numero_pista, nome, dificuldade, par, descricao)
           VALUES (?, ?, ?, ?, ?, ?)"#
    )
    .bind(hole.campo_id)
    .bind(hole.numero_pista)
    .bind(&hole.nome)
    .bind(hole.dificuldade.as_str())
    .bind(hole.par)
    .bind(&hole.descricao)
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}

// Player queries
pub async fn get_all_players(
    conn: &mut MySqlConnection,
    city_id: Option<i64>,
) -> Result<Vec<PlayerWithCity>, DbError> {
    let sql = format!(
        r#"SELECT {PLAYER_COLUMNS}, c.nome AS cidade_nome
           FROM jogadores j
           LEFT JOIN cidades c ON j.cidade_id = c.id
           WHERE (? IS NULL OR j.cidade_id = ?)
           ORDER BY j.nome"#
    );

    let players = sqlx::query_as::<_, PlayerWithCity>(&sql)
        .bind(city_id)
        .bind(city_id)
        .fetch_all(conn)
        .await?;

    Ok(players)
}

pub async fn get_player_by_id(
    conn: &mut MySqlConnection,
    player_id: i64,
) -> Result<Option<PlayerWithCity>, DbError> {
    let sql = format!(
        r#"SELECT {PLAYER_COLUMNS}, c.nome AS cidade_nome
           FROM jogadores j
           LEFT JOIN cidades c ON j.cidade_id = c.id
           WHERE j.id = ?"#
    );

    let player = sqlx::query_as::<_, PlayerWithCity>(&sql)
        .bind(player_id)
        .fetch_optional(conn)
        .await?;

    Ok(player)
}

pub async fn insert_player(conn: &mut MySqlConnection, player: &NewPlayer) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"INSERT INTO jogadores (nome, email, telefone, data_nascimento, cidade_id, avatar_url)
           VALUES (?, ?, ?, ?, ?, ?)"#
    )
    .bind(&player.nome)
    .bind(&player.email)
    .bind(&player.telefone)
    .bind(player.data_nascimento)
    .bind(player.cidade_id)
    .bind(&player.avatar_url)
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}

// Game queries
pub async fn get_games(
    conn: &mut MySqlConnection,
    course_id: Option<i64>,
    limit: i64,
) -> Result<Vec<GameSummary>, DbError> {
    let sql = format!(
        r#"SELECT {GAME_COLUMNS}
           FROM jogos j
           JOIN campos c ON j.campo_id = c.id
           JOIN cidades ci ON c.cidade_id = ci.id
           WHERE (? IS NULL OR j.campo_id = ?)
           ORDER BY j.data_jogo DESC
           LIMIT ?"#
    );

    let games = sqlx::query_as::<_, GameSummary>(&sql)
        .bind(course_id)
        .bind(course_id)
        .bind(limit)
        .fetch_all(conn)
        .await?;

    Ok(games)
}

pub async fn get_game_by_id(conn: &mut MySqlConnection, game_id: i64) -> Result<Option<GameSummary>, DbError> {
    let sql = format!(
        r#"SELECT {GAME_COLUMNS}
           FROM jogos j
           JOIN campos c ON j.campo_id = c.id
           JOIN cidades ci ON c.cidade_id = ci.id
           WHERE j.id = ?"#
    );

    let game = sqlx::query_as::<_, GameSummary>(&sql)
        .bind(game_id)
        .fetch_optional(conn)
        .await?;

    Ok(game)
}

pub async fn get_game_participants(
    conn: &mut MySqlConnection,
    game_id: i64,
) -> Result<Vec<Participant>, DbError> {
    let participants = sqlx::query_as::<_, Participant>(
        r#"SELECT jp.jogo_id, jp.jogador_id, jp.ordem_jogador, jp.total_tacadas, jp.posicao_final,
                  jog.nome AS jogador_nome
           FROM jogo_participantes jp
           JOIN jogadores jog ON jp.jogador_id = jog.id
           WHERE jp.jogo_id = ?
           ORDER BY jp.ordem_jogador"#
    )
    .bind(game_id)
    .fetch_all(conn)
    .await?;

    Ok(participants)
}

pub async fn get_game_strokes(conn: &mut MySqlConnection, game_id: i64) -> Result<Vec<StrokeDetail>, DbError> {
    let sql = format!(
        r#"SELECT {STROKE_COLUMNS}
           FROM tacadas t
           JOIN pistas p ON t.pista_id = p.id
           JOIN jogadores jog ON t.jogador_id = jog.id
           WHERE t.jogo_id = ?
           ORDER BY p.numero_pista, t.jogador_id"#
    );

    let strokes = sqlx::query_as::<_, StrokeDetail>(&sql)
        .bind(game_id)
        .fetch_all(conn)
        .await?;

    Ok(strokes)
}

/// Inserts the game and one participant row per player, in list order, as
/// a single transaction. Nothing is left behind if any insert fails.
pub async fn create_game(conn: &mut MySqlConnection, game: &NewGame) -> Result<u64, DbError> {
    let mut tx = conn.begin().await?;

    match insert_game_with_participants(&mut tx, game).await {
        Ok(game_id) => {
            tx.commit().await?;
            Ok(game_id)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback after failed game creation also failed: {}", rollback_err);
            }
            Err(err.into())
        }
    }
}

async fn insert_game_with_participants(
    tx: &mut MySqlConnection,
    game: &NewGame,
) -> Result<u64, sqlx::Error> {
    let game_id = sqlx::query(
        r#"INSERT INTO jogos (campo_id, data_jogo, num_jogadores, observacoes)
           VALUES (?, ?, ?, ?)"#
    )
    .bind(game.campo_id)
    .bind(game.data_jogo)
    .bind(game.jogadores.len() as i64)
    .bind(&game.observacoes)
    .execute(&mut *tx)
    .await?
    .last_insert_id();

    for (position, player_id) in (1_i64..).zip(&game.jogadores) {
        sqlx::query(
            r#"INSERT INTO jogo_participantes (jogo_id, jogador_id, ordem_jogador)
               VALUES (?, ?, ?)"#
        )
        .bind(game_id)
        .bind(player_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
    }

    Ok(game_id)
}

// Stroke queries

/// Inserts the stroke or overwrites the one already recorded for the same
/// (game, player, hole). Returns the row id in both cases.
pub async fn upsert_stroke(conn: &mut MySqlConnection, stroke: &NewStroke) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"INSERT INTO tacadas (jogo_id, jogador_id, pista_id, numero_tacadas, tempo_pista, observacoes)
           VALUES (?, ?, ?, ?, ?, ?)
           ON DUPLICATE KEY UPDATE
               id = LAST_INSERT_ID(id),
               numero_tacadas = VALUES(numero_tacadas),
               tempo_pista = VALUES(tempo_pista),
               observacoes = VALUES(observacoes)"#
    )
    .bind(stroke.jogo_id)
    .bind(stroke.jogador_id)
    .bind(stroke.pista_id)
    .bind(stroke.numero_tacadas)
    .bind(stroke.tempo_pista.map(|t| t.to_string()))
    .bind(&stroke.observacoes)
    .execute(conn)
    .await?;

    Ok(result.last_insert_id())
}

/// Runs the stored procedure that refreshes participant totals and positions.
pub async fn recompute_game_statistics(conn: &mut MySqlConnection, game_id: i64) -> Result<(), DbError> {
    sqlx::query(r#"CALL CalcularEstatisticasJogo(?)"#)
        .bind(game_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn get_stroke_by_id(conn: &mut MySqlConnection, stroke_id: i64) -> Result<Option<StrokeDetail>, DbError> {
    let sql = format!(
        r#"SELECT {STROKE_COLUMNS}
           FROM tacadas t
           JOIN pistas p ON t.pista_id = p.id
           JOIN jogadores jog ON t.jogador_id = jog.id
           WHERE t.id = ?"#
    );

    let stroke = sqlx::query_as::<_, StrokeDetail>(&sql)
        .bind(stroke_id)
        .fetch_optional(conn)
        .await?;

    Ok(stroke)
}

// Statistics - the views are maintained outside this service
pub async fn get_course_statistics(conn: &mut MySqlConnection) -> Result<Vec<Map<String, Value>>, DbError> {
    let rows = sqlx::query(r#"SELECT * FROM vw_estatisticas_campo"#)
        .fetch_all(conn)
        .await?;

    let records = rows.iter().map(row_to_record).collect::<Result<_, _>>()?;
    Ok(records)
}

pub async fn get_player_leaderboard(conn: &mut MySqlConnection) -> Result<Vec<Map<String, Value>>, DbError> {
    let rows = sqlx::query(r#"SELECT * FROM vw_ranking_jogadores LIMIT ?"#)
        .bind(LEADERBOARD_SIZE)
        .fetch_all(conn)
        .await?;

    let records = rows.iter().map(row_to_record).collect::<Result<_, _>>()?;
    Ok(records)
}

/// `None` only when the player does not exist; a player without games still
/// produces a row through the outer joins.
pub async fn get_player_statistics(
    conn: &mut MySqlConnection,
    player_id: i64,
) -> Result<Option<PlayerStatistics>, DbError> {
    let stats = sqlx::query_as::<_, PlayerStatistics>(
        r#"SELECT
               j.nome,
               COUNT(DISTINCT jp.jogo_id) AS total_jogos,
               AVG(jp.total_tacadas) AS media_tacadas,
               MIN(jp.total_tacadas) AS melhor_score,
               MAX(jp.total_tacadas) AS pior_score,
               COUNT(CASE WHEN jp.posicao_final = 1 THEN 1 END) AS vitorias,
               MAX(jg.data_jogo) AS ultimo_jogo
           FROM jogadores j
           LEFT JOIN jogo_participantes jp ON j.id = jp.jogador_id
           LEFT JOIN jogos jg ON jp.jogo_id = jg.id
           WHERE j.id = ?
           GROUP BY j.id, j.nome"#
    )
    .bind(player_id)
    .fetch_optional(conn)
    .await?;

    Ok(stats)
}

use std::fmt;
use std::str::FromStr;

use axum::{http::StatusCode, response::Json};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::serialize::{decimal_as_f64, ClockDuration};

pub mod requests;

pub use requests::*;

/// Kind of course, stored as the database enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseType {
    Petergolfe,
    Feltgolfe,
    Minigolfe,
}

impl CourseType {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseType::Petergolfe => "petergolfe",
            CourseType::Feltgolfe => "feltgolfe",
            CourseType::Minigolfe => "minigolfe",
        }
    }
}

impl FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petergolfe" | "peter-golf" => Ok(CourseType::Petergolfe),
            "feltgolfe" | "felt-golf" => Ok(CourseType::Feltgolfe),
            "minigolfe" | "mini-golf" => Ok(CourseType::Minigolfe),
            other => Err(format!(
                "tipo must be one of: petergolfe, feltgolfe, minigolfe (got '{}')",
                other
            )),
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hole difficulty; `Medio` when not given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Difficulty {
    Facil,
    #[default]
    Medio,
    Dificil,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Facil => "facil",
            Difficulty::Medio => "medio",
            Difficulty::Dificil => "dificil",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facil" | "easy" => Ok(Difficulty::Facil),
            "medio" | "medium" => Ok(Difficulty::Medio),
            "dificil" | "hard" => Ok(Difficulty::Dificil),
            other => Err(format!(
                "dificuldade must be one of: facil, medio, dificil (got '{}')",
                other
            )),
        }
    }
}

// Cities

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct City {
    pub id: i64,
    pub nome: String,
    pub distrito: String,
    pub codigo_postal: Option<String>,
}

// Courses

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Course {
    pub id: i64,
    pub nome: String,
    pub cidade_id: i64,
    pub tipo: String,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    #[serde(serialize_with = "decimal_as_f64")]
    pub latitude: Option<Decimal>,
    #[serde(serialize_with = "decimal_as_f64")]
    pub longitude: Option<Decimal>,
    #[serde(serialize_with = "decimal_as_f64")]
    pub preco_adulto: Option<Decimal>,
    #[serde(serialize_with = "decimal_as_f64")]
    pub preco_crianca: Option<Decimal>,
    pub horario_abertura: Option<ClockDuration>,
    pub horario_fecho: Option<ClockDuration>,
    pub ativo: bool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CourseWithCity {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub cidade_nome: Option<String>,
    pub distrito: Option<String>,
}

/// Row of the course listing, with the number of active holes.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CourseSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: CourseWithCity,
    pub total_pistas: i64,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseWithCity,
    pub pistas: Vec<Hole>,
}

// Holes

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Hole {
    pub id: i64,
    pub campo_id: i64,
    pub numero_pista: i64,
    pub nome: Option<String>,
    pub dificuldade: String,
    pub par: i64,
    pub descricao: Option<String>,
    pub ativa: bool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct HoleWithCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub hole: Hole,
    pub campo_nome: String,
}

// Players

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Player {
    pub id: i64,
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub cidade_id: Option<i64>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PlayerWithCity {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub player: Player,
    pub cidade_nome: Option<String>,
}

// Games

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub campo_id: i64,
    pub data_jogo: NaiveDateTime,
    pub num_jogadores: i64,
    pub observacoes: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct GameSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub game: Game,
    pub campo_nome: String,
    pub cidade_nome: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Participant {
    pub jogo_id: i64,
    pub jogador_id: i64,
    pub ordem_jogador: i64,
    pub total_tacadas: Option<i64>,
    pub posicao_final: Option<i64>,
    pub jogador_nome: String,
}

#[derive(Debug, Serialize)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: GameSummary,
    pub participantes: Vec<Participant>,
    pub tacadas: Vec<StrokeDetail>,
}

// Strokes

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Stroke {
    pub id: i64,
    pub jogo_id: i64,
    pub jogador_id: i64,
    pub pista_id: i64,
    pub numero_tacadas: i64,
    pub tempo_pista: Option<ClockDuration>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StrokeDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stroke: Stroke,
    pub numero_pista: i64,
    pub pista_nome: Option<String>,
    pub jogador_nome: String,
}

// Statistics

/// Aggregates for one player. A player with no games yields zeros and nulls.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PlayerStatistics {
    pub nome: String,
    pub total_jogos: i64,
    #[serde(serialize_with = "decimal_as_f64")]
    pub media_tacadas: Option<Decimal>,
    pub melhor_score: Option<i64>,
    pub pior_score: Option<i64>,
    pub vitorias: i64,
    pub ultimo_jogo: Option<NaiveDateTime>,
}

// Responses

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: u64,
    pub message: String,
}

pub fn created(id: u64, message: &str) -> (StatusCode, Json<CreatedResponse>) {
    (
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: message.to_string(),
        }),
    )
}

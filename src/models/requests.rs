//! Request bodies and query strings.
//!
//! Bodies deserialize with every field optional so a missing required field
//! becomes a 400 with a readable message instead of a generic JSON rejection.
//! `validate` turns each body into the value the data layer inserts.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use super::{CourseType, Difficulty};
use crate::error::ApiError;
use crate::extract::empty_string_as_none;
use crate::serialize::ClockDuration;

pub const DEFAULT_GAME_LIMIT: i64 = 50;
pub const DEFAULT_PAR: i64 = 3;

fn required<T>(value: Option<T>, message: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Validation(message.to_string()))
}

// Cities

#[derive(Debug, Deserialize)]
pub struct CreateCityRequest {
    pub nome: Option<String>,
    pub distrito: Option<String>,
    pub codigo_postal: Option<String>,
}

#[derive(Debug)]
pub struct NewCity {
    pub nome: String,
    pub distrito: String,
    pub codigo_postal: Option<String>,
}

impl CreateCityRequest {
    pub fn validate(self) -> Result<NewCity, ApiError> {
        const MSG: &str = "nome and distrito are required";
        Ok(NewCity {
            nome: required(self.nome, MSG)?,
            distrito: required(self.distrito, MSG)?,
            codigo_postal: self.codigo_postal,
        })
    }
}

// Courses

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub nome: Option<String>,
    pub cidade_id: Option<i64>,
    pub tipo: Option<String>,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preco_adulto: Option<f64>,
    pub preco_crianca: Option<f64>,
    pub horario_abertura: Option<ClockDuration>,
    pub horario_fecho: Option<ClockDuration>,
}

#[derive(Debug)]
pub struct NewCourse {
    pub nome: String,
    pub cidade_id: i64,
    pub tipo: CourseType,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub preco_adulto: Option<f64>,
    pub preco_crianca: Option<f64>,
    pub horario_abertura: Option<ClockDuration>,
    pub horario_fecho: Option<ClockDuration>,
}

impl CreateCourseRequest {
    pub fn validate(self) -> Result<NewCourse, ApiError> {
        const MSG: &str = "nome, cidade_id and tipo are required";
        let nome = required(self.nome, MSG)?;
        let cidade_id = required(self.cidade_id, MSG)?;
        let tipo = required(self.tipo, MSG)?
            .parse::<CourseType>()
            .map_err(ApiError::Validation)?;

        Ok(NewCourse {
            nome,
            cidade_id,
            tipo,
            endereco: self.endereco,
            telefone: self.telefone,
            website: self.website,
            email: self.email,
            latitude: self.latitude,
            longitude: self.longitude,
            preco_adulto: self.preco_adulto,
            preco_crianca: self.preco_crianca,
            horario_abertura: self.horario_abertura,
            horario_fecho: self.horario_fecho,
        })
    }
}

// Holes

#[derive(Debug, Deserialize)]
pub struct CreateHoleRequest {
    pub campo_id: Option<i64>,
    pub numero_pista: Option<i64>,
    pub nome: Option<String>,
    pub dificuldade: Option<String>,
    pub par: Option<i64>,
    pub descricao: Option<String>,
}

#[derive(Debug)]
pub struct NewHole {
    pub campo_id: i64,
    pub numero_pista: i64,
    pub nome: Option<String>,
    pub dificuldade: Difficulty,
    pub par: i64,
    pub descricao: Option<String>,
}

impl CreateHoleRequest {
    pub fn validate(self) -> Result<NewHole, ApiError> {
        const MSG: &str = "campo_id and numero_pista are required";
        let dificuldade = match self.dificuldade {
            Some(d) => d.parse::<Difficulty>().map_err(ApiError::Validation)?,
            None => Difficulty::default(),
        };

        Ok(NewHole {
            campo_id: required(self.campo_id, MSG)?,
            numero_pista: required(self.numero_pista, MSG)?,
            nome: self.nome,
            dificuldade,
            par: self.par.unwrap_or(DEFAULT_PAR),
            descricao: self.descricao,
        })
    }
}

// Players

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub cidade_id: Option<i64>,
    pub avatar_url: Option<String>,
}

#[derive(Debug)]
pub struct NewPlayer {
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub cidade_id: Option<i64>,
    pub avatar_url: Option<String>,
}

impl CreatePlayerRequest {
    pub fn validate(self) -> Result<NewPlayer, ApiError> {
        Ok(NewPlayer {
            nome: required(self.nome, "nome is required")?,
            email: self.email,
            telefone: self.telefone,
            data_nascimento: self.data_nascimento,
            cidade_id: self.cidade_id,
            avatar_url: self.avatar_url,
        })
    }
}

// Games

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub campo_id: Option<i64>,
    pub jogadores: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "flexible_datetime")]
    pub data_jogo: Option<NaiveDateTime>,
    pub observacoes: Option<String>,
}

#[derive(Debug)]
pub struct NewGame {
    pub campo_id: i64,
    /// Player ids in turn order.
    pub jogadores: Vec<i64>,
    pub data_jogo: NaiveDateTime,
    pub observacoes: Option<String>,
}

impl CreateGameRequest {
    /// `now` is used when the body carries no `data_jogo`.
    pub fn validate(self, now: NaiveDateTime) -> Result<NewGame, ApiError> {
        const MSG: &str = "campo_id and jogadores are required";
        let campo_id = required(self.campo_id, MSG)?;
        let jogadores = required(self.jogadores, MSG)?;

        if jogadores.is_empty() {
            return Err(ApiError::Validation("at least one player is required".to_string()));
        }

        Ok(NewGame {
            campo_id,
            jogadores,
            data_jogo: self.data_jogo.unwrap_or(now),
            observacoes: self.observacoes,
        })
    }
}

/// Accepts ISO-8601 with `T` or a space, with or without seconds
/// (`datetime-local` inputs send `2024-05-01T10:30`).
fn flexible_datetime<'de, D>(de: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let Some(text) = Option::<String>::deserialize(de)? else {
        return Ok(None);
    };

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&text, fmt).ok())
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid data_jogo: {}", text)))
}

// Strokes

#[derive(Debug, Deserialize)]
pub struct RegisterStrokeRequest {
    pub jogo_id: Option<i64>,
    pub jogador_id: Option<i64>,
    pub pista_id: Option<i64>,
    pub numero_tacadas: Option<i64>,
    pub tempo_pista: Option<ClockDuration>,
    pub observacoes: Option<String>,
}

#[derive(Debug)]
pub struct NewStroke {
    pub jogo_id: i64,
    pub jogador_id: i64,
    pub pista_id: i64,
    pub numero_tacadas: i64,
    pub tempo_pista: Option<ClockDuration>,
    pub observacoes: Option<String>,
}

impl RegisterStrokeRequest {
    pub fn validate(self) -> Result<NewStroke, ApiError> {
        const MSG: &str = "jogo_id, jogador_id, pista_id and numero_tacadas are required";
        Ok(NewStroke {
            jogo_id: required(self.jogo_id, MSG)?,
            jogador_id: required(self.jogador_id, MSG)?,
            pista_id: required(self.pista_id, MSG)?,
            numero_tacadas: required(self.numero_tacadas, MSG)?,
            tempo_pista: self.tempo_pista,
            observacoes: self.observacoes,
        })
    }
}

// Query strings

#[derive(Debug, Default, Deserialize)]
pub struct CityFilterQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub cidade_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListGamesQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub campo_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<i64>,
}

impl ListGamesQuery {
    pub fn limit(&self) -> Result<i64, ApiError> {
        match self.limit {
            Some(limit) if limit < 0 => Err(ApiError::Validation("limit must not be negative".to_string())),
            Some(limit) => Ok(limit),
            None => Ok(DEFAULT_GAME_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn city_requires_name_and_district() {
        let req: CreateCityRequest = serde_json::from_str(r#"{"nome": "Faro"}"#).unwrap();
        assert_eq!(message(req.validate().unwrap_err()), "nome and distrito are required");

        let req: CreateCityRequest =
            serde_json::from_str(r#"{"nome": "Faro", "distrito": "Faro"}"#).unwrap();
        let city = req.validate().unwrap();
        assert_eq!(city.nome, "Faro");
        assert!(city.codigo_postal.is_none());
    }

    #[test]
    fn course_type_outside_the_enumeration_is_rejected() {
        let req: CreateCourseRequest =
            serde_json::from_str(r#"{"nome": "X", "cidade_id": 1, "tipo": "invalid"}"#).unwrap();
        assert!(message(req.validate().unwrap_err()).starts_with("tipo must be one of"));
    }

    #[test]
    fn course_accepts_opening_hours_and_prices() {
        let req: CreateCourseRequest = serde_json::from_str(
            r#"{"nome": "X", "cidade_id": 1, "tipo": "felt-golf",
                "preco_adulto": 7.5, "horario_abertura": "09:30:00"}"#,
        )
        .unwrap();
        let course = req.validate().unwrap();

        assert_eq!(course.tipo, CourseType::Feltgolfe);
        assert_eq!(course.preco_adulto, Some(7.5));
        assert_eq!(course.horario_abertura, Some(ClockDuration(34_200)));
    }

    #[test]
    fn hole_defaults_difficulty_and_par() {
        let req: CreateHoleRequest =
            serde_json::from_str(r#"{"campo_id": 1, "numero_pista": 4}"#).unwrap();
        let hole = req.validate().unwrap();
        assert_eq!(hole.dificuldade, Difficulty::Medio);
        assert_eq!(hole.par, DEFAULT_PAR);

        let req: CreateHoleRequest =
            serde_json::from_str(r#"{"campo_id": 1, "numero_pista": 4, "dificuldade": "extreme"}"#)
                .unwrap();
        assert!(req.validate().is_err());

        let req: CreateHoleRequest = serde_json::from_str(r#"{"campo_id": 1}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn player_requires_name() {
        let req: CreatePlayerRequest =
            serde_json::from_str(r#"{"email": "a@b.pt", "data_nascimento": "1990-02-03"}"#).unwrap();
        assert_eq!(message(req.validate().unwrap_err()), "nome is required");
    }

    #[test]
    fn game_keeps_player_order_and_defaults_timestamp() {
        let req: CreateGameRequest =
            serde_json::from_str(r#"{"campo_id": 3, "jogadores": [9, 4, 7]}"#).unwrap();
        let game = req.validate(now()).unwrap();

        assert_eq!(game.jogadores, vec![9, 4, 7]);
        assert_eq!(game.data_jogo, now());
    }

    #[test]
    fn game_needs_at_least_one_player() {
        let req: CreateGameRequest =
            serde_json::from_str(r#"{"campo_id": 3, "jogadores": []}"#).unwrap();
        assert_eq!(message(req.validate(now()).unwrap_err()), "at least one player is required");

        let req: CreateGameRequest = serde_json::from_str(r#"{"campo_id": 3}"#).unwrap();
        assert!(req.validate(now()).is_err());
    }

    #[test]
    fn game_timestamp_accepts_common_layouts() {
        for text in ["2024-05-01T10:30:00", "2024-05-01 10:30:00", "2024-05-01T10:30"] {
            let body = format!(r#"{{"campo_id": 1, "jogadores": [1], "data_jogo": "{}"}}"#, text);
            let req: CreateGameRequest = serde_json::from_str(&body).unwrap();
            let game = req.validate(now()).unwrap();
            assert_eq!(game.data_jogo.to_string(), "2024-05-01 10:30:00");
        }

        let bad = serde_json::from_str::<CreateGameRequest>(
            r#"{"campo_id": 1, "jogadores": [1], "data_jogo": "yesterday"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn stroke_requires_the_full_triple_and_count() {
        let req: RegisterStrokeRequest = serde_json::from_str(
            r#"{"jogo_id": 1, "jogador_id": 2, "pista_id": 3, "numero_tacadas": 2, "tempo_pista": 95}"#,
        )
        .unwrap();
        let stroke = req.validate().unwrap();
        assert_eq!(stroke.tempo_pista, Some(ClockDuration(95)));

        let req: RegisterStrokeRequest =
            serde_json::from_str(r#"{"jogo_id": 1, "jogador_id": 2, "pista_id": 3}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn game_limit_defaults_and_rejects_negatives() {
        assert_eq!(ListGamesQuery::default().limit().unwrap(), DEFAULT_GAME_LIMIT);

        let query = ListGamesQuery { campo_id: None, limit: Some(2) };
        assert_eq!(query.limit().unwrap(), 2);

        let query = ListGamesQuery { campo_id: None, limit: Some(-1) };
        assert!(query.limit().is_err());
    }
}

//! Conversions from database-native values into JSON-safe ones.
//!
//! Entity records use the serde helpers here field by field. Rows coming from
//! the externally maintained statistics views have no fixed shape, so they go
//! through [`row_to_record`], which inspects each column's type instead.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Formats a number of seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let secs = total_seconds.unsigned_abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Parses `H:MM:SS` (or `MM:SS`) back into seconds.
pub fn parse_duration(text: &str) -> Option<i64> {
    let (negative, body) = match text.trim().strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.trim()),
    };

    let parts: Vec<i64> = body
        .split(':')
        .map(|p| p.parse::<i64>().ok().filter(|n| *n >= 0))
        .collect::<Option<_>>()?;

    let seconds = match parts.as_slice() {
        [h, m, s] if *m < 60 && *s < 60 => h * 3600 + m * 60 + s,
        [m, s] if *s < 60 => m * 60 + s,
        _ => return None,
    };

    Some(if negative { -seconds } else { seconds })
}

pub fn iso_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

pub fn decimal_to_json(value: Decimal) -> Value {
    value.to_f64().map(Value::from).unwrap_or(Value::Null)
}

/// Renders a raw TIME value, keeping its sign and hours past 23.
pub fn mysql_time_to_json(value: MySqlTime) -> Value {
    Value::String(format_duration(TimeDelta::from(value).num_seconds()))
}

/// BIT columns arrive as big-endian bytes.
fn bits_to_json(bytes: &[u8]) -> Value {
    Value::from(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

fn lossy_text(bytes: &[u8]) -> Value {
    Value::String(String::from_utf8_lossy(bytes).into_owned())
}

/// A MySQL TIME value carried as whole seconds.
///
/// Queries select these columns through `TIME_TO_SEC` so durations longer
/// than a day survive decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct ClockDuration(pub i64);

impl fmt::Display for ClockDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for ClockDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ClockVisitor;

        impl Visitor<'_> for ClockVisitor {
            type Value = ClockDuration;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a duration as HH:MM:SS or a number of seconds")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(ClockDuration)
                    .map_err(|_| E::custom("duration out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ClockDuration(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse_duration(v)
                    .map(ClockDuration)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(ClockVisitor)
    }
}

/// `serialize_with` helper: fixed-point decimals become JSON numbers.
pub fn decimal_as_f64<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
    match value.and_then(|d| d.to_f64()) {
        Some(f) => serializer.serialize_f64(f),
        None => serializer.serialize_none(),
    }
}

/// Converts one column of a row into JSON according to its MySQL type.
pub fn serialize_value(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let type_name = row.column(index).type_info().name();

    let value = match type_name {
        "BOOLEAN" => Value::from(row.try_get::<bool, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(index)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::from(row.try_get::<u64, _>(index)?),
        "FLOAT" => Value::from(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(index)?),
        "DECIMAL" => decimal_to_json(row.try_get::<Decimal, _>(index)?),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(index)?.to_string()),
        "DATETIME" => Value::String(iso_datetime(&row.try_get::<NaiveDateTime, _>(index)?)),
        "TIMESTAMP" => Value::String(
            row.try_get::<DateTime<Utc>, _>(index)?
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ),
        "TIME" => mysql_time_to_json(row.try_get::<MySqlTime, _>(index)?),
        "YEAR" => Value::from(row.try_get_unchecked::<u16, _>(index)?),
        "JSON" => row.try_get::<Value, _>(index)?,
        "BIT" => bits_to_json(&row.try_get_unchecked::<Vec<u8>, _>(index)?),
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            lossy_text(&row.try_get::<Vec<u8>, _>(index)?)
        }
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" => {
            Value::String(row.try_get::<String, _>(index)?)
        }
        // ENUM, SET, GEOMETRY and anything newer: hand back the raw text.
        _ => lossy_text(&row.try_get_unchecked::<Vec<u8>, _>(index)?),
    };

    Ok(value)
}

/// Zips column names with serialized values, in the column order of the query.
pub fn row_to_record(row: &MySqlRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut record = Map::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), serialize_value(row, index)?);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn duration_is_zero_padded() {
        assert_eq!(format_duration(5400), "01:30:00");
        assert_eq!(format_duration(65), "00:01:05");
        assert_eq!(format_duration(0), "00:00:00");
    }

    #[test]
    fn duration_hours_do_not_wrap_at_a_day() {
        assert_eq!(format_duration(90_000), "25:00:00");
        assert_eq!(format_duration(-30), "-00:00:30");
    }

    #[test]
    fn parses_clock_strings() {
        assert_eq!(parse_duration("01:30:00"), Some(5400));
        assert_eq!(parse_duration("2:05"), Some(125));
        assert_eq!(parse_duration("100:00:01"), Some(360_001));
        assert_eq!(parse_duration("00:61:00"), None);
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn clock_duration_accepts_strings_and_seconds() {
        let from_str: ClockDuration = serde_json::from_str(r#""00:02:30""#).unwrap();
        let from_num: ClockDuration = serde_json::from_str("150").unwrap();

        assert_eq!(from_str, ClockDuration(150));
        assert_eq!(from_num, ClockDuration(150));
        assert_eq!(serde_json::to_value(from_num).unwrap(), Value::from("00:02:30"));
        assert!(serde_json::from_str::<ClockDuration>(r#""later""#).is_err());
    }

    #[test]
    fn decimal_becomes_float() {
        #[derive(Serialize)]
        struct Price {
            #[serde(serialize_with = "decimal_as_f64")]
            amount: Option<Decimal>,
        }

        let price = Price { amount: Some(Decimal::from_str("12.50").unwrap()) };
        assert_eq!(serde_json::to_value(&price).unwrap(), serde_json::json!({ "amount": 12.5 }));

        let missing = Price { amount: None };
        assert_eq!(serde_json::to_value(&missing).unwrap(), serde_json::json!({ "amount": null }));

        assert_eq!(decimal_to_json(Decimal::from_str("3.75").unwrap()), Value::from(3.75));
    }

    #[test]
    fn time_values_keep_sign_and_long_hours() {
        use sqlx::mysql::types::MySqlTimeSign;

        let long = MySqlTime::new(MySqlTimeSign::Positive, 25, 0, 0, 0).unwrap();
        let negative = MySqlTime::new(MySqlTimeSign::Negative, 0, 0, 30, 0).unwrap();
        let max = MySqlTime::new(MySqlTimeSign::Positive, 838, 59, 59, 0).unwrap();

        assert_eq!(mysql_time_to_json(long), Value::from("25:00:00"));
        assert_eq!(mysql_time_to_json(negative), Value::from("-00:00:30"));
        assert_eq!(mysql_time_to_json(max), Value::from("838:59:59"));
    }

    #[test]
    fn bit_and_unknown_columns_do_not_fail() {
        assert_eq!(bits_to_json(&[0x01, 0x02]), Value::from(258));
        assert_eq!(bits_to_json(&[]), Value::from(0));
        assert_eq!(lossy_text(b"a,b"), Value::from("a,b"));
    }

    #[test]
    fn datetimes_render_as_iso_8601() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(iso_datetime(&dt), "2024-05-01T10:00:00");
    }
}

//! Row materialization into JSON-shaped records.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

/// One result row: column name to value.
pub type Record = Map<String, Value>;

/// Result rows in the order returned by the database.
pub type RecordList = Vec<Record>;

/// How a column's PostgreSQL type is rendered into a [`Record`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Text,
    Json,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Bytes,
}

impl ValueKind {
    /// Map a built-in type to its value kind. Returns `None` for types that have
    /// no record representation.
    pub(crate) fn of(ty: &Type) -> Option<Self> {
        if ty.schema() != "pg_catalog" {
            return None;
        }
        let kind = match ty.name() {
            "bool" => Self::Bool,
            "int2" => Self::Int2,
            "int4" => Self::Int4,
            "int8" => Self::Int8,
            "oid" => Self::Oid,
            "float4" => Self::Float4,
            "float8" => Self::Float8,
            "numeric" => Self::Numeric,
            "text" | "varchar" | "bpchar" | "name" | "unknown" => Self::Text,
            "json" | "jsonb" => Self::Json,
            "uuid" => Self::Uuid,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::TimestampTz,
            "bytea" => Self::Bytes,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether values of this kind are integers (the shape `query_count` accepts).
    pub(crate) fn is_integer(self) -> bool {
        matches!(self, Self::Int2 | Self::Int4 | Self::Int8)
    }
}

/// Convert a row into a [`Record`].
pub fn row_to_record(row: &Row) -> DbResult<Record> {
    let mut record = Map::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, column.name(), column.type_())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

/// Convert all rows into a [`RecordList`].
pub fn rows_to_records(rows: &[Row]) -> DbResult<RecordList> {
    rows.iter().map(row_to_record).collect()
}

/// Deserialize a record into a caller type.
pub fn from_record<T: DeserializeOwned>(record: Record) -> DbResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|e| DbError::Serialization(e.to_string()))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize, column: &str) -> DbResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| DbError::decode(column, e.to_string()))
}

fn column_value(row: &Row, idx: usize, column: &str, ty: &Type) -> DbResult<Value> {
    let Some(kind) = ValueKind::of(ty) else {
        return Err(DbError::decode(
            column,
            format!("unsupported column type {}", ty.name()),
        ));
    };

    let value = match kind {
        ValueKind::Bool => get::<bool>(row, idx, column)?.map(Value::Bool),
        ValueKind::Int2 => get::<i16>(row, idx, column)?.map(Value::from),
        ValueKind::Int4 => get::<i32>(row, idx, column)?.map(Value::from),
        ValueKind::Int8 => get::<i64>(row, idx, column)?.map(Value::from),
        ValueKind::Oid => get::<u32>(row, idx, column)?.map(Value::from),
        ValueKind::Float4 => get::<f32>(row, idx, column)?.map(|v| float_value(f64::from(v))),
        ValueKind::Float8 => get::<f64>(row, idx, column)?.map(float_value),
        ValueKind::Numeric => get::<Decimal>(row, idx, column)?.map(decimal_value),
        ValueKind::Text => get::<String>(row, idx, column)?.map(Value::String),
        ValueKind::Json => get::<Value>(row, idx, column)?,
        ValueKind::Uuid => get::<uuid::Uuid>(row, idx, column)?.map(|v| Value::String(v.to_string())),
        ValueKind::Date => {
            get::<chrono::NaiveDate>(row, idx, column)?.map(|v| Value::String(v.to_string()))
        }
        ValueKind::Time => {
            get::<chrono::NaiveTime>(row, idx, column)?.map(|v| Value::String(v.to_string()))
        }
        ValueKind::Timestamp => get::<NaiveDateTime>(row, idx, column)?.map(timestamp_value),
        ValueKind::TimestampTz => get::<DateTime<Utc>>(row, idx, column)?.map(timestamptz_value),
        ValueKind::Bytes => get::<Vec<u8>>(row, idx, column)?.map(bytes_value),
    };

    Ok(value.unwrap_or(Value::Null))
}

// JSON has no NaN/Infinity.
fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

// A number only when it survives the trip through f64 digit for digit; otherwise
// the exact decimal text.
fn decimal_value(v: Decimal) -> Value {
    let text = v.normalize().to_string();
    if let Ok(int) = text.parse::<i64>() {
        return Value::from(int);
    }
    match text.parse::<f64>() {
        Ok(float) if float.to_string() == text => float_value(float),
        _ => Value::String(text),
    }
}

fn timestamp_value(v: NaiveDateTime) -> Value {
    Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

fn timestamptz_value(v: DateTime<Utc>) -> Value {
    Value::String(v.to_rfc3339())
}

fn bytes_value(v: Vec<u8>) -> Value {
    Value::Array(v.into_iter().map(Value::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn builtin_types_map_to_kinds() {
        assert_eq!(ValueKind::of(&Type::INT8), Some(ValueKind::Int8));
        assert_eq!(ValueKind::of(&Type::VARCHAR), Some(ValueKind::Text));
        assert_eq!(ValueKind::of(&Type::BPCHAR), Some(ValueKind::Text));
        assert_eq!(ValueKind::of(&Type::JSONB), Some(ValueKind::Json));
        assert_eq!(ValueKind::of(&Type::TIMESTAMPTZ), Some(ValueKind::TimestampTz));
        assert_eq!(ValueKind::of(&Type::BYTEA), Some(ValueKind::Bytes));
        assert_eq!(ValueKind::of(&Type::NUMERIC), Some(ValueKind::Numeric));
        assert_eq!(ValueKind::of(&Type::INTERVAL), None);
        assert_eq!(ValueKind::of(&Type::INT4_ARRAY), None);
    }

    #[test]
    fn only_integer_kinds_count() {
        assert!(ValueKind::Int2.is_integer());
        assert!(ValueKind::Int8.is_integer());
        assert!(!ValueKind::Float8.is_integer());
        assert!(!ValueKind::Numeric.is_integer());
        assert!(!ValueKind::Oid.is_integer());
        assert!(!ValueKind::Text.is_integer());
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(f64::INFINITY), Value::Null);
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
    }

    fn decimal(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[test]
    fn numerics_stay_numbers_when_exact() {
        assert_eq!(decimal_value(decimal("6006")), serde_json::json!(6006));
        assert_eq!(decimal_value(decimal("12.50")), serde_json::json!(12.5));
        assert_eq!(decimal_value(decimal("-0.1")), serde_json::json!(-0.1));
        assert_eq!(decimal_value(decimal("3.000")), serde_json::json!(3));
    }

    #[test]
    fn wide_numerics_keep_their_digits() {
        assert_eq!(
            decimal_value(decimal("12345678901234567890.123456789")),
            serde_json::json!("12345678901234567890.123456789")
        );
        assert_eq!(
            decimal_value(decimal("99999999999999999999")),
            serde_json::json!("99999999999999999999")
        );
    }

    #[test]
    fn timestamps_render_as_iso_8601() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 20, 30)
            .unwrap();
        assert_eq!(timestamp_value(at), serde_json::json!("2024-03-01T10:20:30"));

        let with_millis = at + chrono::Duration::milliseconds(250);
        assert_eq!(
            timestamp_value(with_millis),
            serde_json::json!("2024-03-01T10:20:30.250")
        );

        assert_eq!(
            timestamptz_value(at.and_utc()),
            serde_json::json!("2024-03-01T10:20:30+00:00")
        );
    }

    #[test]
    fn bytes_render_as_number_array() {
        assert_eq!(bytes_value(vec![0, 1, 255]), serde_json::json!([0, 1, 255]));
        assert_eq!(bytes_value(Vec::new()), serde_json::json!([]));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Publisher {
        id: i64,
        pub_name: String,
    }

    #[test]
    fn record_maps_onto_struct() {
        let serde_json::Value::Object(record) =
            serde_json::json!({ "id": 1000, "pub_name": "Wiley" })
        else {
            unreachable!()
        };
        let publisher: Publisher = from_record(record).unwrap();
        assert_eq!(
            publisher,
            Publisher {
                id: 1000,
                pub_name: "Wiley".to_string()
            }
        );
    }

    #[test]
    fn record_with_wrong_shape_is_a_serialization_error() {
        let serde_json::Value::Object(record) = serde_json::json!({ "id": "x" }) else {
            unreachable!()
        };
        let err = from_record::<Publisher>(record).unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}

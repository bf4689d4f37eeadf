use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// The WOTC tables store `1900-01-01` instead of NULL for "date not set".
pub fn is_unset_date(date: &NaiveDate) -> bool {
    (date.year(), date.month(), date.day()) == (1900, 1, 1)
}

/// A row decoded without a fixed schema, column order preserved.
pub type Record = Map<String, Value>;

/// ===============================
/// SQL bindable / decoded value
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Null,
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::I64(v) => Some(*v),
            SqlValue::U64(v) => i64::try_from(*v).ok(),
            SqlValue::F64(v) => Some(*v as i64),
            SqlValue::Bool(v) => Some(i64::from(*v)),
            SqlValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::I64(v) => Some(*v as f64),
            SqlValue::U64(v) => Some(*v as f64),
            SqlValue::F64(v) => Some(*v),
            SqlValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::String(s) => Some(s),
            other => match other.to_json() {
                Value::String(s) => Some(s),
                v => Some(v.to_string()),
            },
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SqlValue::Date(d) => Some(*d),
            SqlValue::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::String(s) => Value::String(s.clone()),
            SqlValue::I64(v) => Value::from(*v),
            SqlValue::U64(v) => Value::from(*v),
            SqlValue::F64(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::Bool(v) => Value::Bool(*v),
            SqlValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            SqlValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            SqlValue::Time(t) => Value::String(t.format("%H:%M:%S").to_string()),
            SqlValue::Null => Value::Null,
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Binds every value, in order, onto a `query`, `query_as` or `query_scalar`.
#[macro_export]
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                $crate::utils::db_utils::SqlValue::String(v) => query.bind(v.clone()),
                $crate::utils::db_utils::SqlValue::I64(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::U64(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::F64(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::Bool(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::Date(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::DateTime(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::Time(v) => query.bind(*v),
                $crate::utils::db_utils::SqlValue::Null => query.bind(None::<String>),
            };
        }
        query
    }};
}

/// Treats the sentinel as absent.
pub fn unset_if_sentinel(date: Option<NaiveDate>) -> Option<NaiveDate> {
    date.filter(|d| !is_unset_date(d))
}

/// ===============================
/// Schema-less row decoding
/// ===============================
///
/// The dashboard tables are owned elsewhere, so column widths and signedness
/// are not known at compile time. Values are decoded from the column's
/// reported type instead of a fixed Rust type; sentinel and zero dates come
/// back as `SqlValue::Null`.
pub fn decode_column(row: &MySqlRow, index: usize) -> Result<SqlValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }

    let type_name = row.column(index).type_info().name().to_ascii_uppercase();
    let base = type_name.split_whitespace().next().unwrap_or("");
    let unsigned = type_name.contains("UNSIGNED");

    let value = match base {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" | "BOOLEAN" => {
            if unsigned {
                SqlValue::U64(row.try_get_unchecked::<u64, _>(index)?)
            } else {
                SqlValue::I64(row.try_get_unchecked::<i64, _>(index)?)
            }
        }
        "BIT" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            SqlValue::U64(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
        }
        "FLOAT" => SqlValue::F64(f64::from(row.try_get_unchecked::<f32, _>(index)?)),
        "DOUBLE" => SqlValue::F64(row.try_get_unchecked::<f64, _>(index)?),
        "DECIMAL" => {
            let text = text_column(row, index)?;
            match text.trim().parse::<f64>() {
                Ok(v) => SqlValue::F64(v),
                Err(_) => SqlValue::String(text),
            }
        }
        "DATE" => match row.try_get::<NaiveDate, _>(index) {
            Ok(d) if !is_unset_date(&d) => SqlValue::Date(d),
            _ => SqlValue::Null,
        },
        "DATETIME" | "TIMESTAMP" => match row.try_get::<NaiveDateTime, _>(index) {
            Ok(dt) if !is_unset_date(&dt.date()) => SqlValue::DateTime(dt),
            _ => SqlValue::Null,
        },
        "TIME" => match row.try_get::<NaiveTime, _>(index) {
            Ok(t) => SqlValue::Time(t),
            Err(_) => SqlValue::Null,
        },
        "NULL" => SqlValue::Null,
        _ => SqlValue::String(text_column(row, index)?),
    };

    Ok(value)
}

fn text_column(row: &MySqlRow, index: usize) -> Result<String, sqlx::Error> {
    let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decodes a whole row into a JSON object keyed by column label.
pub fn row_to_record(row: &MySqlRow) -> Result<Record, sqlx::Error> {
    let mut record = Map::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name().to_string(), decode_column(row, index)?.to_json());
    }
    Ok(record)
}

pub fn rows_to_records(rows: &[MySqlRow]) -> Result<Vec<Record>, sqlx::Error> {
    rows.iter().map(row_to_record).collect()
}

fn named(row: &MySqlRow, column: &str) -> Result<SqlValue, sqlx::Error> {
    let index = row
        .columns()
        .iter()
        .position(|c| c.name() == column)
        .ok_or_else(|| sqlx::Error::ColumnNotFound(column.to_string()))?;
    decode_column(row, index)
}

fn mismatch(column: &str, expected: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("expected {expected}").into(),
    }
}

/// Typed getters for hand-written `FromRow` impls.
pub fn get_i64(row: &MySqlRow, column: &str) -> Result<i64, sqlx::Error> {
    named(row, column)?
        .as_i64()
        .ok_or_else(|| mismatch(column, "an integer"))
}

pub fn get_opt_i64(row: &MySqlRow, column: &str) -> Result<Option<i64>, sqlx::Error> {
    match named(row, column)? {
        SqlValue::Null => Ok(None),
        v => v.as_i64().map(Some).ok_or_else(|| mismatch(column, "an integer")),
    }
}

pub fn get_f64(row: &MySqlRow, column: &str) -> Result<f64, sqlx::Error> {
    match named(row, column)? {
        SqlValue::Null => Ok(0.0),
        v => v.as_f64().ok_or_else(|| mismatch(column, "a number")),
    }
}

pub fn get_opt_string(row: &MySqlRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    Ok(named(row, column)?.into_string())
}

pub fn get_opt_date(row: &MySqlRow, column: &str) -> Result<Option<NaiveDate>, sqlx::Error> {
    Ok(unset_if_sentinel(named(row, column)?.as_date()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinel_date_is_absent() {
        let sentinel = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        assert!(is_unset_date(&sentinel));
        assert_eq!(unset_if_sentinel(Some(sentinel)), None);
        let real = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(unset_if_sentinel(Some(real)), Some(real));
        assert_eq!(unset_if_sentinel(None), None);
    }

    #[test]
    fn values_serialize_as_plain_json() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(SqlValue::Date(date).to_json(), json!("2025-01-02"));
        assert_eq!(
            SqlValue::DateTime(date.and_hms_opt(8, 30, 0).unwrap()).to_json(),
            json!("2025-01-02T08:30:00")
        );
        assert_eq!(SqlValue::U64(7).to_json(), json!(7));
        assert_eq!(SqlValue::F64(12.5).to_json(), json!(12.5));
        assert_eq!(SqlValue::F64(f64::NAN).to_json(), Value::Null);
        assert_eq!(SqlValue::Null.to_json(), Value::Null);
    }

    #[test]
    fn numeric_conversions() {
        assert_eq!(SqlValue::U64(42).as_i64(), Some(42));
        assert_eq!(SqlValue::String(" 17 ".into()).as_i64(), Some(17));
        assert_eq!(SqlValue::String("1520.75".into()).as_f64(), Some(1520.75));
        assert_eq!(SqlValue::Null.as_f64(), None);
        assert_eq!(SqlValue::I64(3).into_string(), Some("3".to_string()));
        assert_eq!(SqlValue::Null.into_string(), None);
    }
}

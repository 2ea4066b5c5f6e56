//! The connection capability statements are executed against.

use crate::error::MunchResult;
use crate::scan::{CellError, RowSet};
use crate::value::Value;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, Type};

/// Executes rendered SQL text.
///
/// Implemented for `tokio_postgres::Client` (and pooled clients with the `pool`
/// feature). Other backends plug in by implementing this trait; the builder
/// never retries or times out on its own.
pub trait Connection: Send + Sync {
    /// Run a statement and return the rows it produced.
    fn query(&self, sql: &str) -> impl std::future::Future<Output = MunchResult<RowSet>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str) -> impl std::future::Future<Output = MunchResult<u64>> + Send;
}

impl<C: Connection> Connection for &C {
    fn query(&self, sql: &str) -> impl std::future::Future<Output = MunchResult<RowSet>> + Send {
        (**self).query(sql)
    }

    fn execute(&self, sql: &str) -> impl std::future::Future<Output = MunchResult<u64>> + Send {
        (**self).execute(sql)
    }
}

impl Connection for tokio_postgres::Client {
    async fn query(&self, sql: &str) -> MunchResult<RowSet> {
        let rows = tokio_postgres::Client::query(self, sql, &[]).await?;
        Ok(rows_to_row_set(&rows))
    }

    async fn execute(&self, sql: &str) -> MunchResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, &[]).await?)
    }
}

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    async fn query(&self, sql: &str) -> MunchResult<RowSet> {
        let client: &tokio_postgres::Client = self;
        Connection::query(client, sql).await
    }

    async fn execute(&self, sql: &str) -> MunchResult<u64> {
        let client: &tokio_postgres::Client = self;
        Connection::execute(client, sql).await
    }
}

/// Convert typed Postgres rows into a [`RowSet`].
///
/// A cell that cannot be converted marks its row as failed; the other rows
/// are kept.
pub fn rows_to_row_set(rows: &[Row]) -> RowSet {
    let Some(first) = rows.first() else {
        return RowSet::empty();
    };
    let columns = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut set = RowSet::new(columns, Vec::with_capacity(rows.len()));
    for row in rows {
        match row_cells(row) {
            Ok(cells) => set.push_row(cells),
            Err(e) => set.push_failed_row(e),
        }
    }
    set
}

fn row_cells(row: &Row) -> Result<Vec<Value>, CellError> {
    (0..row.len())
        .map(|idx| {
            row.try_get::<_, Cell>(idx)
                .map(|cell| cell.0)
                .map_err(|e| {
                    let message = match std::error::Error::source(&e) {
                        Some(source) => source.to_string(),
                        None => e.to_string(),
                    };
                    CellError::new(row.columns()[idx].name(), message)
                })
        })
        .collect()
}

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// A single Postgres cell decoded by column type.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell(pub Value);

impl<'a> FromSql<'a> for Cell {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        decode_cell(ty, raw).map(Cell)
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Cell(Value::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

fn scalar<'a, T, F>(ty: &Type, raw: &'a [u8], f: F) -> Result<Value, BoxError>
where
    T: FromSql<'a>,
    F: Fn(T) -> Value,
{
    T::from_sql(ty, raw).map(f)
}

fn array<'a, T, F>(ty: &Type, raw: &'a [u8], f: F) -> Result<Value, BoxError>
where
    T: FromSql<'a>,
    F: Fn(T) -> Value,
{
    let items = Vec::<Option<T>>::from_sql(ty, raw)?;
    Ok(Value::List(
        items
            .into_iter()
            .map(|v| v.map(&f).unwrap_or(Value::Null))
            .collect(),
    ))
}

fn decimal_text(v: Decimal) -> Value {
    Value::Text(v.to_string())
}

fn bytea_text(v: &[u8]) -> Value {
    let mut out = String::with_capacity(2 + v.len() * 2);
    out.push_str("\\x");
    for byte in v {
        let _ = write!(out, "{byte:02x}");
    }
    Value::Text(out)
}

/// Decode one non-NULL cell by its Postgres column type.
fn decode_cell(ty: &Type, raw: &[u8]) -> Result<Value, BoxError> {
    match *ty {
        Type::BOOL => scalar(ty, raw, Value::Bool),
        Type::CHAR => scalar(ty, raw, |v: i8| Value::Int(v.into())),
        Type::INT2 => scalar(ty, raw, |v: i16| Value::Int(v.into())),
        Type::INT4 => scalar(ty, raw, |v: i32| Value::Int(v.into())),
        Type::INT8 => scalar(ty, raw, Value::Int),
        Type::OID => scalar(ty, raw, |v: u32| Value::UInt(v.into())),
        Type::FLOAT4 => scalar(ty, raw, |v: f32| Value::Float(v.into())),
        Type::FLOAT8 => scalar(ty, raw, Value::Float),
        Type::NUMERIC => scalar(ty, raw, decimal_text),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            scalar(ty, raw, Value::Text)
        }
        Type::BYTEA => scalar(ty, raw, bytea_text),
        Type::UUID => scalar(ty, raw, |v: uuid::Uuid| Value::Text(v.hyphenated().to_string())),
        Type::DATE => scalar(ty, raw, |v: chrono::NaiveDate| {
            Value::Text(v.format("%Y-%m-%d").to_string())
        }),
        Type::TIME => scalar(ty, raw, |v: chrono::NaiveTime| {
            Value::Text(v.format("%H:%M:%S%.f").to_string())
        }),
        Type::TIMESTAMP => scalar(ty, raw, |v: chrono::NaiveDateTime| {
            Value::Text(v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }),
        Type::TIMESTAMPTZ => scalar(ty, raw, |v: chrono::DateTime<chrono::Utc>| {
            Value::Text(v.to_rfc3339())
        }),
        Type::JSON | Type::JSONB => scalar(ty, raw, |v: serde_json::Value| Value::Text(v.to_string())),
        Type::BOOL_ARRAY => array(ty, raw, Value::Bool),
        Type::INT2_ARRAY => array(ty, raw, |v: i16| Value::Int(v.into())),
        Type::INT4_ARRAY => array(ty, raw, |v: i32| Value::Int(v.into())),
        Type::INT8_ARRAY => array(ty, raw, Value::Int),
        Type::FLOAT4_ARRAY => array(ty, raw, |v: f32| Value::Float(v.into())),
        Type::FLOAT8_ARRAY => array(ty, raw, Value::Float),
        Type::NUMERIC_ARRAY => array(ty, raw, decimal_text),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => array(ty, raw, Value::Text),
        _ => Err(format!("unsupported column type {ty}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use std::str::FromStr;
    use tokio_postgres::types::ToSql;

    fn encode<T: ToSql>(value: T, ty: &Type) -> BytesMut {
        let mut buf = BytesMut::new();
        value.to_sql(ty, &mut buf).unwrap();
        buf
    }

    #[test]
    fn scalars_by_type() {
        assert_eq!(decode_cell(&Type::INT4, &7i32.to_be_bytes()).unwrap(), Value::Int(7));
        assert_eq!(decode_cell(&Type::INT8, &(-2i64).to_be_bytes()).unwrap(), Value::Int(-2));
        assert_eq!(decode_cell(&Type::BOOL, &[1]).unwrap(), Value::Bool(true));
        assert_eq!(
            decode_cell(&Type::VARCHAR, b"alice").unwrap(),
            Value::Text("alice".into())
        );
        assert_eq!(
            decode_cell(&Type::FLOAT8, &1.5f64.to_be_bytes()).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn numeric_is_text_with_full_precision() {
        let raw = encode(Decimal::from_str("12.50").unwrap(), &Type::NUMERIC);
        match decode_cell(&Type::NUMERIC, &raw).unwrap() {
            Value::Text(s) => assert_eq!(s.parse::<f64>().unwrap(), 12.5),
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn bytea_and_time() {
        assert_eq!(
            decode_cell(&Type::BYTEA, &[0xde, 0xad, 0x01]).unwrap(),
            Value::Text("\\xdead01".into())
        );
        let time = chrono::NaiveTime::from_hms_opt(13, 5, 9).unwrap();
        let raw = encode(time, &Type::TIME);
        assert_eq!(
            decode_cell(&Type::TIME, &raw).unwrap(),
            Value::Text("13:05:09".into())
        );
    }

    #[test]
    fn arrays_keep_nulls() {
        let raw = encode(vec![Some(1i32), None, Some(3)], &Type::INT4_ARRAY);
        assert_eq!(
            decode_cell(&Type::INT4_ARRAY, &raw).unwrap(),
            Value::List(vec![Value::Int(1), Value::Null, Value::Int(3)])
        );
    }

    #[test]
    fn null_cell_and_unsupported_type() {
        assert_eq!(Cell::from_sql_null(&Type::INT4).unwrap(), Cell(Value::Null));
        let err = decode_cell(&Type::INTERVAL, &[0; 16]).unwrap_err();
        assert!(err.to_string().contains("unsupported column type"));
    }
}

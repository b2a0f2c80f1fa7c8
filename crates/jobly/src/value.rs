//! Scalar values bound as statement parameters.
//!
//! [`SqlValue`] is what a sparse update or filter payload carries. It implements
//! [`ToSql`] and adapts itself to the type Postgres inferred for the placeholder,
//! so an integer coming from JSON can bind to an `INTEGER` column and a numeric
//! string can bind to a `NUMERIC` column.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type, accepts, to_sql_checked};

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Decimal(Decimal),
}

impl SqlValue {
    /// Convert a JSON scalar. Arrays and objects are rejected.
    pub fn from_json(field: &str, value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(JoblyError::bad_request(format!(
                        "Field '{field}' is out of range: {n}"
                    )))
                }
            }
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(_) | Value::Object(_) => Err(JoblyError::bad_request(format!(
                "Field '{field}' must be a scalar value"
            ))),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn mismatch(kind: &str, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {kind} value to {ty}").into()
}

/// Whole-number floats (`50000.0`) convert; anything with a fraction or
/// outside `i64` does not.
fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ if is_text(ty) => b.to_string().to_sql(ty, out),
                _ => Err(mismatch("boolean", ty)),
            },
            Self::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ if is_text(ty) => i.to_string().to_sql(ty, out),
                _ => Err(mismatch("integer", ty)),
            },
            Self::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 => match integral(*f) {
                    Some(i) => Self::Int(i).to_sql(ty, out),
                    None => Err(format!("cannot bind fractional value {f} to {ty}").into()),
                },
                _ if is_text(ty) => f.to_string().to_sql(ty, out),
                _ => Err(mismatch("float", ty)),
            },
            Self::Text(s) => match *ty {
                Type::BOOL => s.trim().parse::<bool>()?.to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 => {
                    Self::Int(s.trim().parse::<i64>()?).to_sql(ty, out)
                }
                Type::FLOAT4 => s.trim().parse::<f32>()?.to_sql(ty, out),
                Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
                Type::NUMERIC => s.trim().parse::<Decimal>()?.to_sql(ty, out),
                _ if is_text(ty) => s.to_sql(ty, out),
                _ => Err(mismatch("text", ty)),
            },
            Self::Decimal(d) => match *ty {
                Type::NUMERIC => d.to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 if d.fract().is_zero() => {
                    Self::Int(i64::try_from(*d)?).to_sql(ty, out)
                }
                Type::FLOAT4 | Type::FLOAT8 => Self::Float(f64::try_from(*d)?).to_sql(ty, out),
                _ if is_text(ty) => d.to_string().to_sql(ty, out),
                _ => Err(mismatch("decimal", ty)),
            },
        }
    }

    accepts!(
        BOOL, INT2, INT4, INT8, FLOAT4, FLOAT8, NUMERIC, TEXT, VARCHAR, BPCHAR, NAME, UNKNOWN
    );
    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_convert() {
        assert_eq!(SqlValue::from_json("a", json!(null)).unwrap(), SqlValue::Null);
        assert_eq!(
            SqlValue::from_json("a", json!(false)).unwrap(),
            SqlValue::Bool(false)
        );
        assert_eq!(SqlValue::from_json("a", json!(0)).unwrap(), SqlValue::Int(0));
        assert_eq!(
            SqlValue::from_json("a", json!(0.5)).unwrap(),
            SqlValue::Float(0.5)
        );
        assert_eq!(
            SqlValue::from_json("a", json!("")).unwrap(),
            SqlValue::Text(String::new())
        );
    }

    #[test]
    fn json_containers_are_bad_request() {
        let err = SqlValue::from_json("tags", json!(["a"])).unwrap_err();
        assert!(err.is_bad_request());
        let err = SqlValue::from_json("meta", json!({"a": 1})).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn int_binds_to_int4() {
        let mut buf = BytesMut::new();
        let res = SqlValue::Int(42).to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(res, IsNull::No));
        assert_eq!(&buf[..], &42_i32.to_be_bytes());
    }

    #[test]
    fn int_out_of_range_for_int2_errors() {
        let mut buf = BytesMut::new();
        assert!(SqlValue::Int(70_000).to_sql(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn null_binds_to_anything() {
        let mut buf = BytesMut::new();
        let res = SqlValue::Null.to_sql(&Type::NUMERIC, &mut buf).unwrap();
        assert!(matches!(res, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn numeric_text_binds_to_numeric() {
        let mut buf = BytesMut::new();
        let res = SqlValue::Text("0.25".into())
            .to_sql(&Type::NUMERIC, &mut buf)
            .unwrap();
        assert!(matches!(res, IsNull::No));
        assert!(!buf.is_empty());
    }

    #[test]
    fn fractional_float_rejected_for_integer_column() {
        let mut buf = BytesMut::new();
        assert!(SqlValue::Float(1.5).to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn accepts_common_scalar_types() {
        assert!(<SqlValue as ToSql>::accepts(&Type::INT4));
        assert!(<SqlValue as ToSql>::accepts(&Type::TEXT));
        assert!(<SqlValue as ToSql>::accepts(&Type::NUMERIC));
        assert!(!<SqlValue as ToSql>::accepts(&Type::JSONB));
    }

    #[test]
    fn bool_binds_as_text_for_text_columns() {
        let mut buf = BytesMut::new();
        SqlValue::Bool(true).to_sql(&Type::TEXT, &mut buf).unwrap();
        assert_eq!(&buf[..], b"true");

        let mut buf = BytesMut::new();
        SqlValue::Bool(false).to_sql(&Type::BOOL, &mut buf).unwrap();
        assert_eq!(&buf[..], &[0]);
    }

    #[test]
    fn bool_rejected_for_numeric_columns() {
        let mut buf = BytesMut::new();
        assert!(SqlValue::Bool(true).to_sql(&Type::INT4, &mut buf).is_err());
        assert!(SqlValue::Bool(true).to_sql(&Type::NUMERIC, &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn int_rejected_for_bool_column() {
        let mut buf = BytesMut::new();
        let err = SqlValue::Int(1)
            .to_sql_checked(&Type::BOOL, &mut buf)
            .err()
            .expect("expected to_sql_checked to fail");
        assert!(err.to_string().contains("bool"));
        assert!(buf.is_empty());
    }

    #[test]
    fn whole_float_binds_to_integer_column() {
        let mut buf = BytesMut::new();
        SqlValue::Float(50000.0).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &50000_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(SqlValue::Float(70000.0).to_sql(&Type::INT2, &mut buf).is_err());
        assert!(SqlValue::Float(f64::NAN).to_sql(&Type::INT8, &mut buf).is_err());
        assert!(SqlValue::Float(1e19).to_sql(&Type::INT8, &mut buf).is_err());
    }

    #[test]
    fn text_parses_for_float_and_bool_columns() {
        let mut buf = BytesMut::new();
        SqlValue::Text("1.5".into())
            .to_sql(&Type::FLOAT8, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &1.5_f64.to_be_bytes());

        let mut buf = BytesMut::new();
        SqlValue::Text("true".into())
            .to_sql(&Type::BOOL, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[1]);

        let mut buf = BytesMut::new();
        assert!(SqlValue::Text("yes".into()).to_sql(&Type::BOOL, &mut buf).is_err());
    }

    #[test]
    fn decimal_converts_for_integer_columns() {
        let mut buf = BytesMut::new();
        SqlValue::Decimal(Decimal::new(12, 0))
            .to_sql(&Type::INT4, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &12_i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(SqlValue::Decimal(Decimal::new(125, 1))
            .to_sql(&Type::INT4, &mut buf)
            .is_err());
    }
}

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;

/// A typed value bound to a `$n` placeholder of a dynamically assembled query.
///
/// Scalar variants carry an `Option` so that partial updates can bind SQL NULL
/// with the right parameter type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    IntArray(Vec<i32>),
    TextArray(Vec<String>),
    Json(Option<serde_json::Value>),
}

macro_rules! sql_arg_from {
    ($ty:ty => $variant:ident) => {
        impl From<$ty> for SqlArg {
            fn from(value: $ty) -> Self {
                SqlArg::$variant(Some(value))
            }
        }

        impl From<Option<$ty>> for SqlArg {
            fn from(value: Option<$ty>) -> Self {
                SqlArg::$variant(value)
            }
        }
    };
}

sql_arg_from!(i32 => Int);
sql_arg_from!(i64 => BigInt);
sql_arg_from!(f64 => Float);
sql_arg_from!(bool => Bool);
sql_arg_from!(String => Text);
sql_arg_from!(Decimal => Decimal);
sql_arg_from!(NaiveDate => Date);
sql_arg_from!(NaiveTime => Time);

impl From<&str> for SqlArg {
    fn from(value: &str) -> Self {
        SqlArg::Text(Some(value.to_string()))
    }
}

impl From<serde_json::Value> for SqlArg {
    fn from(value: serde_json::Value) -> Self {
        SqlArg::Json(Some(value))
    }
}

impl From<Option<serde_json::Value>> for SqlArg {
    fn from(value: Option<serde_json::Value>) -> Self {
        SqlArg::Json(value)
    }
}

impl From<Vec<i32>> for SqlArg {
    fn from(value: Vec<i32>) -> Self {
        SqlArg::IntArray(value)
    }
}

impl From<Vec<String>> for SqlArg {
    fn from(value: Vec<String>) -> Self {
        SqlArg::TextArray(value)
    }
}

/// Converts collected arguments into the driver's argument buffer, preserving order.
pub fn into_pg_arguments(args: Vec<SqlArg>) -> PgArguments {
    let mut out = PgArguments::default();
    for arg in args {
        match arg {
            SqlArg::Int(v) => out.add(v),
            SqlArg::BigInt(v) => out.add(v),
            SqlArg::Float(v) => out.add(v),
            SqlArg::Bool(v) => out.add(v),
            SqlArg::Text(v) => out.add(v),
            SqlArg::Decimal(v) => out.add(v),
            SqlArg::Date(v) => out.add(v),
            SqlArg::Time(v) => out.add(v),
            SqlArg::IntArray(v) => out.add(v),
            SqlArg::TextArray(v) => out.add(v),
            SqlArg::Json(v) => out.add(v),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(SqlArg::from(7i32), SqlArg::Int(Some(7)));
        assert_eq!(SqlArg::from(Option::<i64>::None), SqlArg::BigInt(None));
        assert_eq!(SqlArg::from("x"), SqlArg::Text(Some("x".to_string())));
        assert_eq!(
            SqlArg::from(vec!["a".to_string()]),
            SqlArg::TextArray(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_null_scalars_keep_their_type() {
        let arg = SqlArg::from(Option::<NaiveDate>::None);
        assert_eq!(arg, SqlArg::Date(None));
        assert_ne!(arg, SqlArg::Text(None));
    }
}

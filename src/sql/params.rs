//! Convert serde_json::Value to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. Converts from serde_json::Value.
/// Every value goes over the wire as text and every placeholder is cast by the builder
/// (`$n::integer`), so a cached statement always sees the same parameter types.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PgBindValue::I64(i)
                } else if let Some(f) = n.as_f64() {
                    PgBindValue::F64(f)
                } else {
                    PgBindValue::Null
                }
            }
            Value::String(s) => PgBindValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PgBindValue::String(v.to_string()),
        }
    }

    /// Text form PostgreSQL parses back through the placeholder cast. None for NULL.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PgBindValue::Null => None,
            PgBindValue::Bool(b) => Some(b.to_string()),
            PgBindValue::I64(n) => Some(n.to_string()),
            PgBindValue::F64(n) => Some(n.to_string()),
            PgBindValue::String(s) => Some(s.clone()),
        }
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <Option<String> as Encode<Postgres>>::encode_by_ref(&self.as_text(), buf)
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_json_scalars() {
        assert_eq!(PgBindValue::from_json(&json!(null)), PgBindValue::Null);
        assert_eq!(PgBindValue::from_json(&json!(true)), PgBindValue::Bool(true));
        assert_eq!(PgBindValue::from_json(&json!(2019)), PgBindValue::I64(2019));
        assert_eq!(PgBindValue::from_json(&json!(12.5)), PgBindValue::F64(12.5));
        assert_eq!(PgBindValue::from_json(&json!("Trek")), PgBindValue::String("Trek".into()));
    }

    #[test]
    fn text_forms() {
        assert_eq!(PgBindValue::Null.as_text(), None);
        assert_eq!(PgBindValue::Bool(false).as_text().as_deref(), Some("false"));
        assert_eq!(PgBindValue::I64(-3).as_text().as_deref(), Some("-3"));
        assert_eq!(PgBindValue::F64(1499.5).as_text().as_deref(), Some("1499.5"));
        assert_eq!(PgBindValue::from_json(&json!([1])).as_text().as_deref(), Some("[1]"));
    }
}

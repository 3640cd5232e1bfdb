//! 绑定值模块
//!
//! `BindValue` 是所有 `?` 占位符对应的值，`Binding` 则是带有 1 起始位置的绑定记录。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::Database;

/// 绑定值，用于安全地传递参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindValue {
    String(String),
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Float64(f64),
    Float32(f32),
    Bool(bool),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Null,
}

impl BindValue {
    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

/// 一个绑定记录：值 + 在预处理语句中的位置（从 1 开始）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub value: BindValue,
    pub position: usize,
}

impl Binding {
    pub fn new(value: BindValue, position: usize) -> Self {
        Self { value, position }
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::String(s)
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::String(s.to_string())
    }
}

impl From<i64> for BindValue {
    fn from(i: i64) -> Self {
        BindValue::Int64(i)
    }
}

impl From<i32> for BindValue {
    fn from(i: i32) -> Self {
        BindValue::Int32(i)
    }
}

impl From<i16> for BindValue {
    fn from(i: i16) -> Self {
        BindValue::Int16(i)
    }
}

impl From<f64> for BindValue {
    fn from(f: f64) -> Self {
        BindValue::Float64(f)
    }
}

impl From<f32> for BindValue {
    fn from(f: f32) -> Self {
        BindValue::Float32(f)
    }
}

impl From<bool> for BindValue {
    fn from(b: bool) -> Self {
        BindValue::Bool(b)
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(b: Vec<u8>) -> Self {
        BindValue::Bytes(b)
    }
}

impl From<NaiveDateTime> for BindValue {
    fn from(dt: NaiveDateTime) -> Self {
        BindValue::DateTime(dt)
    }
}

/// None 映射为 NULL
impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => BindValue::Null,
        }
    }
}

/// 将绑定值按位置顺序应用到 sqlx 查询中
///
/// 只包含三种数据库（MySQL、PostgreSQL、SQLite）都支持的类型，
/// 调用方需保证 `bindings` 已经按 position 排好序（`Statement` 会保证这一点）。
pub fn apply_bindings<'q, DB>(
    mut query: sqlx::query::Query<'q, DB, DB::Arguments<'q>>,
    bindings: &[Binding],
) -> sqlx::query::Query<'q, DB, DB::Arguments<'q>>
where
    DB: Database,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i16: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    f64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    f32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    Vec<u8>: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    NaiveDateTime: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    Option<String>: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    for binding in bindings {
        query = match binding.value.clone() {
            BindValue::String(s) => query.bind(s),
            BindValue::Int64(i) => query.bind(i),
            BindValue::Int32(i) => query.bind(i),
            BindValue::Int16(i) => query.bind(i),
            BindValue::Float64(f) => query.bind(f),
            BindValue::Float32(f) => query.bind(f),
            BindValue::Bool(b) => query.bind(b),
            BindValue::Bytes(b) => query.bind(b),
            BindValue::DateTime(dt) => query.bind(dt),
            BindValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_value_from_str() {
        let bv: BindValue = "Bob".into();
        assert_eq!(bv, BindValue::String("Bob".to_string()));
    }

    #[test]
    fn test_bind_value_from_integers() {
        assert!(matches!(BindValue::from(30i64), BindValue::Int64(30)));
        assert!(matches!(BindValue::from(30i32), BindValue::Int32(30)));
        assert!(matches!(BindValue::from(30i16), BindValue::Int16(30)));
    }

    #[test]
    fn test_bind_value_from_bool_and_bytes() {
        assert!(matches!(BindValue::from(true), BindValue::Bool(true)));
        assert_eq!(BindValue::from(vec![1u8, 2]), BindValue::Bytes(vec![1, 2]));
    }

    #[test]
    fn test_bind_value_from_option() {
        let none: Option<i32> = None;
        assert!(BindValue::from(none).is_null());
        assert_eq!(BindValue::from(Some("x")), BindValue::String("x".to_string()));
    }

    #[test]
    fn test_binding_serializes_with_position() {
        let binding = Binding::new(BindValue::Int32(18), 1);
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json, serde_json::json!({ "value": { "Int32": 18 }, "position": 1 }));
    }
}

//! 子句词汇表与子句记录
//!
//! 操作符、连接类型、逻辑连接符都是封闭的枚举，渲染文本由 `as_sql` 统一给出。

use crate::bind_value::BindValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL 操作符枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operator {
    /// 等于: =
    #[default]
    Equal,
    /// 不等于: !=
    NotEqual,
    /// 大于: >
    GreaterThan,
    /// 大于等于: >=
    GreaterThanOrEqual,
    /// 小于: <
    LessThan,
    /// 小于等于: <=
    LessThanOrEqual,
    /// LIKE 匹配
    Like,
    /// NOT LIKE 匹配
    NotLike,
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// IS NULL / IS NOT NULL 永远不带占位符
    pub fn takes_value(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// JOIN 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// 条件连接符：AND 或 OR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// JOIN 条件的一侧：列引用按原文渲染，字面值渲染为 `?` 并产生绑定
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    Value(BindValue),
}

impl Operand {
    pub fn column(name: impl Into<String>) -> Self {
        Operand::Column(name.into())
    }

    pub fn value(value: impl Into<BindValue>) -> Self {
        Operand::Value(value.into())
    }

    pub(crate) fn to_sql(&self) -> &str {
        match self {
            Operand::Column(name) => name,
            Operand::Value(_) => "?",
        }
    }

    pub(crate) fn bind_value(&self) -> Option<&BindValue> {
        match self {
            Operand::Column(_) => None,
            Operand::Value(v) => Some(v),
        }
    }
}

impl From<BindValue> for Operand {
    fn from(value: BindValue) -> Self {
        Operand::Value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub alias: Option<String>,
    pub left: Operand,
    pub operator: Operator,
    pub right: Operand,
}

impl Join {
    pub(crate) fn push_fragments(&self, fragments: &mut Vec<String>) {
        fragments.push(self.kind.as_sql().to_string());
        fragments.push("JOIN".to_string());
        fragments.push(self.table.clone());
        if let Some(alias) = &self.alias {
            fragments.push("AS".to_string());
            fragments.push(alias.clone());
        }
        fragments.push("ON".to_string());
        fragments.push(self.left.to_sql().to_string());
        fragments.push(self.operator.as_sql().to_string());
        fragments.push(self.right.to_sql().to_string());
    }

    /// 左侧在前，右侧在后
    pub(crate) fn bind_values(&self) -> impl Iterator<Item = &BindValue> {
        self.left.bind_value().into_iter().chain(self.right.bind_value())
    }
}

/// WHERE 条件；`BindValue::Null` 表示没有值，渲染为裸的 `column operator`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: BindValue,
    pub connector: Option<Connector>,
}

impl Condition {
    pub(crate) fn has_placeholder(&self) -> bool {
        self.operator.takes_value() && !self.value.is_null()
    }
}

/// INSERT / UPDATE 的 (列名, 值) 对
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub column: String,
    pub value: BindValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_rendering_table() {
        assert_eq!(Operator::default().as_sql(), "=");
        assert_eq!(Operator::NotEqual.as_sql(), "!=");
        assert_eq!(Operator::GreaterThanOrEqual.to_string(), ">=");
        assert_eq!(Operator::NotLike.as_sql(), "NOT LIKE");
        assert_eq!(Operator::IsNotNull.as_sql(), "IS NOT NULL");
    }

    #[test]
    fn test_null_operators_take_no_value() {
        assert!(!Operator::IsNull.takes_value());
        assert!(!Operator::IsNotNull.takes_value());
        assert!(Operator::Like.takes_value());
    }

    #[test]
    fn test_join_kind_and_connector() {
        assert_eq!(JoinKind::default(), JoinKind::Inner);
        assert_eq!(JoinKind::Left.to_string(), "LEFT");
        assert_eq!(Connector::Or.to_string(), "OR");
    }

    #[test]
    fn test_join_fragments_with_columns() {
        let join = Join {
            kind: JoinKind::Left,
            table: "orders".to_string(),
            alias: Some("o".to_string()),
            left: Operand::column("users.id"),
            operator: Operator::Equal,
            right: Operand::column("o.user_id"),
        };
        let mut fragments = Vec::new();
        join.push_fragments(&mut fragments);
        assert_eq!(
            fragments.join(" "),
            "LEFT JOIN orders AS o ON users.id = o.user_id"
        );
        assert_eq!(join.bind_values().count(), 0);
    }

    #[test]
    fn test_join_value_operand_renders_placeholder() {
        let join = Join {
            kind: JoinKind::Inner,
            table: "orders".to_string(),
            alias: None,
            left: Operand::column("orders.status"),
            operator: Operator::Equal,
            right: Operand::value("paid"),
        };
        let mut fragments = Vec::new();
        join.push_fragments(&mut fragments);
        assert_eq!(fragments.join(" "), "INNER JOIN orders ON orders.status = ?");
        let binds: Vec<_> = join.bind_values().collect();
        assert_eq!(binds, vec![&BindValue::String("paid".to_string())]);
    }

    #[test]
    fn test_condition_placeholder_rules() {
        let mut cond = Condition {
            column: "deleted_at".to_string(),
            operator: Operator::IsNull,
            value: BindValue::Int32(1),
            connector: None,
        };
        assert!(!cond.has_placeholder());
        cond.operator = Operator::Equal;
        assert!(cond.has_placeholder());
        cond.value = BindValue::Null;
        assert!(!cond.has_placeholder());
    }
}

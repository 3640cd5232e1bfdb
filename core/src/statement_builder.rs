//! 链式 SQL 语句构建器
//!
//! 构建器只累积结构化的片段（语句类型、表、JOIN、WHERE、LIMIT/OFFSET、字段），
//! 在 `render` / `bindings` / `build` 时才一次性组装 SQL 文本并分配绑定位置，
//! 因此多次渲染结果完全一致。
//!
//! ```rust,ignore
//! let statement = StatementBuilder::new(&pool)
//!     .select(["id", "name"])
//!     .table("users")
//!     .where_("age", Operator::GreaterThan, 18)
//!     .limit(10)?
//!     .build();
//! // SELECT id,name FROM users WHERE age > ? LIMIT 10  -- bindings: [(18, 1)]
//! ```

use crate::bind_value::{BindValue, Binding};
use crate::clause::{Condition, Connector, FieldValue, Join, JoinKind, Operand, Operator};
use crate::db_pool::{DbDriver, DbPool};
use crate::error::{Error, Result};
use crate::executor::DbExecutor;
use crate::statement::Statement;
use std::num::NonZeroU64;

/// 语句类型，同一时刻只有一个生效（后设置的覆盖先设置的）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

// bind_value 调用时已有的 JOIN / WHERE 数量，渲染时据此把值放回调用处
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BindSlot {
    joins: usize,
    conditions: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct ManualBind {
    slot: BindSlot,
    value: BindValue,
}

// 手动值落在其后第一个新增的子句之前；没有后续子句时排在末尾
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Join(usize),
    Condition(usize),
    End,
}

#[derive(Debug, Clone, PartialEq)]
struct TableRef {
    name: String,
    alias: Option<String>,
}

impl TableRef {
    fn push_fragments(&self, fragments: &mut Vec<String>) {
        fragments.push(self.name.clone());
        if let Some(alias) = &self.alias {
            fragments.push("AS".to_string());
            fragments.push(alias.clone());
        }
    }
}

/// SQL 语句构建器
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    driver: DbDriver,
    kind: Option<StatementKind>,
    distinct: bool,
    table: Option<TableRef>,
    select_list: Vec<String>,
    insert_fields: Vec<FieldValue>,
    update_fields: Vec<FieldValue>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    limit: Option<NonZeroU64>,
    offset: Option<NonZeroU64>,
    // bind_value 手动追加的值，对应调用方写在原始表达式里的占位符
    manual_binds: Vec<ManualBind>,
}

impl StatementBuilder {
    /// 从数据库上下文创建构建器，只读取其驱动类型
    pub fn new(ctx: &impl DbExecutor) -> Self {
        Self::with_driver(ctx.driver())
    }

    /// 不依赖连接池创建构建器（离线渲染 SQL）
    pub fn with_driver(driver: DbDriver) -> Self {
        Self {
            driver,
            kind: None,
            distinct: false,
            table: None,
            select_list: Vec::new(),
            insert_fields: Vec::new(),
            update_fields: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            limit: None,
            offset: None,
            manual_binds: Vec::new(),
        }
    }

    pub fn driver(&self) -> DbDriver {
        self.driver
    }

    pub fn kind(&self) -> Option<StatementKind> {
        self.kind
    }

    // ========== 语句类型 ==========

    /// SELECT，可多次调用累积列
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind = Some(StatementKind::Select);
        self.select_list.extend(columns.into_iter().map(Into::into));
        self
    }

    /// SELECT *（不追加任何列）
    pub fn select_all(mut self) -> Self {
        self.kind = Some(StatementKind::Select);
        self
    }

    pub fn insert(mut self) -> Self {
        self.kind = Some(StatementKind::Insert);
        self
    }

    pub fn update(mut self) -> Self {
        self.kind = Some(StatementKind::Update);
        self
    }

    pub fn delete(mut self) -> Self {
        self.kind = Some(StatementKind::Delete);
        self
    }

    /// 只对 SELECT 生效
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ========== 表 ==========

    /// 设置表名，from / into 只是语义上的别名，共用同一个表
    pub fn table(self, name: impl Into<String>) -> Self {
        self.set_table(name.into(), None)
    }

    pub fn table_as(self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.set_table(name.into(), Some(alias.into()))
    }

    #[allow(clippy::wrong_self_convention, clippy::should_implement_trait)]
    pub fn from(self, name: impl Into<String>) -> Self {
        self.table(name)
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn from_as(self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.table_as(name, alias)
    }

    #[allow(clippy::wrong_self_convention, clippy::should_implement_trait)]
    pub fn into(self, name: impl Into<String>) -> Self {
        self.table(name)
    }

    pub fn into_as(self, name: impl Into<String>, alias: impl Into<String>) -> Self {
        self.table_as(name, alias)
    }

    fn set_table(mut self, name: String, alias: Option<String>) -> Self {
        self.table = Some(TableRef { name, alias });
        self
    }

    // ========== JOIN ==========

    /// 添加 JOIN，只有 `Operand::Value` 会产生绑定
    pub fn join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        alias: Option<&str>,
        left: Operand,
        operator: Operator,
        right: Operand,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            alias: alias.map(str::to_string),
            left,
            operator,
            right,
        });
        self
    }

    pub fn inner_join(
        self,
        table: impl Into<String>,
        alias: Option<&str>,
        left: Operand,
        operator: Operator,
        right: Operand,
    ) -> Self {
        self.join(JoinKind::Inner, table, alias, left, operator, right)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        alias: Option<&str>,
        left: Operand,
        operator: Operator,
        right: Operand,
    ) -> Self {
        self.join(JoinKind::Left, table, alias, left, operator, right)
    }

    pub fn right_join(
        self,
        table: impl Into<String>,
        alias: Option<&str>,
        left: Operand,
        operator: Operator,
        right: Operand,
    ) -> Self {
        self.join(JoinKind::Right, table, alias, left, operator, right)
    }

    // ========== WHERE ==========

    /// 添加条件；值为 `BindValue::Null`（或 `None`）时渲染为裸的 `column operator`
    pub fn where_(
        self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<BindValue>,
    ) -> Self {
        self.push_condition(column.into(), operator, value.into(), None)
    }

    /// 等于条件（默认操作符）
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<BindValue>) -> Self {
        self.where_(column, Operator::Equal, value)
    }

    /// 不带值的条件，如 `deleted_at IS NULL`
    pub fn where_op(self, column: impl Into<String>, operator: Operator) -> Self {
        self.push_condition(column.into(), operator, BindValue::Null, None)
    }

    /// 以 AND 连接条件，必须先调用 `where_`
    ///
    /// 失败时构建器随之丢弃；需要保留已累积的状态时使用 [`push_and_where`](Self::push_and_where)
    pub fn and_where(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<BindValue>,
    ) -> Result<Self> {
        self.connect(Connector::And, column.into(), operator, value.into())?;
        Ok(self)
    }

    pub fn or_where(
        mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<BindValue>,
    ) -> Result<Self> {
        self.connect(Connector::Or, column.into(), operator, value.into())?;
        Ok(self)
    }

    /// `and_where` 的借用版本，出错时构建器保持原样
    pub fn push_and_where(
        &mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<BindValue>,
    ) -> Result<&mut Self> {
        self.connect(Connector::And, column.into(), operator, value.into())
    }

    /// `or_where` 的借用版本，出错时构建器保持原样
    pub fn push_or_where(
        &mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<BindValue>,
    ) -> Result<&mut Self> {
        self.connect(Connector::Or, column.into(), operator, value.into())
    }

    fn connect(
        &mut self,
        connector: Connector,
        column: String,
        operator: Operator,
        value: BindValue,
    ) -> Result<&mut Self> {
        if self.conditions.is_empty() {
            let method = match connector {
                Connector::And => "and_where",
                Connector::Or => "or_where",
            };
            tracing::warn!(column = %column, "{} called before where_", method);
            return Err(Error::UsageOrder(format!(
                "You must use where_() before {}()",
                method
            )));
        }
        self.conditions.push(Condition {
            column,
            operator,
            value,
            connector: Some(connector),
        });
        Ok(self)
    }

    fn push_condition(
        mut self,
        column: String,
        operator: Operator,
        value: BindValue,
        connector: Option<Connector>,
    ) -> Self {
        self.conditions.push(Condition {
            column,
            operator,
            value,
            connector,
        });
        self
    }

    // ========== LIMIT / OFFSET ==========

    pub fn limit(mut self, n: i64) -> Result<Self> {
        self.set_limit(n)?;
        Ok(self)
    }

    pub fn offset(mut self, n: i64) -> Result<Self> {
        self.set_offset(n)?;
        Ok(self)
    }

    /// 借用版本的 `limit`：非正数被拒绝，构建器不受影响
    pub fn set_limit(&mut self, n: i64) -> Result<&mut Self> {
        let limit = positive(n).ok_or_else(|| {
            tracing::warn!(limit = n, "rejected non-positive limit");
            Error::InvalidLimit(n)
        })?;
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn set_offset(&mut self, n: i64) -> Result<&mut Self> {
        let offset = positive(n).ok_or_else(|| {
            tracing::warn!(offset = n, "rejected non-positive offset");
            Error::InvalidOffset(n)
        })?;
        self.offset = Some(offset);
        Ok(self)
    }

    // ========== INSERT / UPDATE 字段 ==========

    pub fn insert_field(mut self, column: impl Into<String>, value: impl Into<BindValue>) -> Self {
        self.insert_fields.push(FieldValue {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn update_field(mut self, column: impl Into<String>, value: impl Into<BindValue>) -> Self {
        self.update_fields.push(FieldValue {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// 手动追加绑定值，用于原始表达式中自行书写的占位符
    ///
    /// 位置跟随调用顺序：值排在此后添加的第一个 JOIN 或 WHERE 条件之前，
    /// 所以应在写有 `?` 的那个子句之前（或紧随 SELECT 列之后）调用。
    pub fn bind_value(mut self, value: impl Into<BindValue>) -> Self {
        let slot = BindSlot {
            joins: self.joins.len(),
            conditions: self.conditions.len(),
        };
        self.manual_binds.push(ManualBind {
            slot,
            value: value.into(),
        });
        self
    }

    // ========== 渲染 ==========

    /// 渲染 SQL（占位符已按驱动转换）；没有任何片段时返回 None
    pub fn render(&self) -> Option<String> {
        let fragments = self.fragments();
        if fragments.is_empty() {
            return None;
        }
        Some(self.driver.convert_placeholders(&fragments.join(" ")))
    }

    /// 按占位符出现的顺序返回绑定，位置从 1 开始连续递增
    ///
    /// 顺序：INSERT/UPDATE 字段值 -> 每个 JOIN（其前的手动值、字面值）
    /// -> 每个 WHERE 条件（其前的手动值、条件值）-> 末尾的手动值
    pub fn bindings(&self) -> Vec<Binding> {
        let ignored = self.ignored_field_count();
        if ignored > 0 {
            tracing::warn!(
                kind = ?self.kind,
                ignored,
                "field values ignored for statement kind"
            );
        }

        let mut values: Vec<&BindValue> = Vec::new();
        match self.kind {
            Some(StatementKind::Insert) => {
                values.extend(self.insert_fields.iter().map(|f| &f.value));
            }
            Some(StatementKind::Update) => {
                values.extend(self.update_fields.iter().map(|f| &f.value));
            }
            _ => {}
        }
        for (i, join) in self.joins.iter().enumerate() {
            values.extend(self.manual_binds_at(Anchor::Join(i)));
            values.extend(join.bind_values());
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            values.extend(self.manual_binds_at(Anchor::Condition(i)));
            if condition.has_placeholder() {
                values.push(&condition.value);
            }
        }
        values.extend(self.manual_binds_at(Anchor::End));

        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Binding::new(value.clone(), i + 1))
            .collect()
    }

    /// 同时生成 SQL 和绑定
    pub fn build(&self) -> Option<Statement> {
        let sql = self.render()?;
        let bindings = self.bindings();
        tracing::debug!(sql = %sql, binds = bindings.len(), "built statement");
        Some(Statement::new(sql, bindings, self.driver))
    }

    /// 构建并在给定连接池上执行，返回受影响的行数
    pub async fn execute(&self, pool: &DbPool) -> Result<u64> {
        let statement = self.build().ok_or(Error::EmptyStatement)?;
        pool.execute(&statement).await
    }

    /// 当前语句类型不会渲染的 insert / update 字段数量
    fn ignored_field_count(&self) -> usize {
        let mut ignored = 0;
        if self.kind != Some(StatementKind::Insert) {
            ignored += self.insert_fields.len();
        }
        if self.kind != Some(StatementKind::Update) {
            ignored += self.update_fields.len();
        }
        ignored
    }

    fn manual_binds_at(&self, anchor: Anchor) -> impl Iterator<Item = &BindValue> {
        self.manual_binds
            .iter()
            .filter(move |bind| self.anchor(bind.slot) == anchor)
            .map(|bind| &bind.value)
    }

    fn anchor(&self, slot: BindSlot) -> Anchor {
        if slot.joins < self.joins.len() {
            Anchor::Join(slot.joins)
        } else if slot.conditions < self.conditions.len() {
            Anchor::Condition(slot.conditions)
        } else {
            Anchor::End
        }
    }

    fn fragments(&self) -> Vec<String> {
        let mut fragments = Vec::new();

        match self.kind {
            Some(StatementKind::Select) => self.push_select(&mut fragments),
            Some(StatementKind::Insert) => self.push_insert(&mut fragments),
            Some(StatementKind::Update) => self.push_update(&mut fragments),
            Some(StatementKind::Delete) => self.push_delete(&mut fragments),
            None => {}
        }

        for join in &self.joins {
            join.push_fragments(&mut fragments);
        }
        self.push_where(&mut fragments);

        if let Some(limit) = self.limit {
            fragments.push("LIMIT".to_string());
            fragments.push(limit.to_string());
        }
        if let Some(offset) = self.offset {
            fragments.push("OFFSET".to_string());
            fragments.push(offset.to_string());
        }

        fragments
    }

    fn push_select(&self, fragments: &mut Vec<String>) {
        fragments.push("SELECT".to_string());
        if self.distinct {
            fragments.push("DISTINCT".to_string());
        }
        if self.select_list.is_empty() {
            fragments.push("*".to_string());
        } else {
            fragments.push(self.select_list.join(","));
        }
        self.push_table("FROM", fragments);
    }

    fn push_insert(&self, fragments: &mut Vec<String>) {
        fragments.push("INSERT".to_string());
        self.push_table("INTO", fragments);

        let columns: Vec<&str> = self.insert_fields.iter().map(|f| f.column.as_str()).collect();
        fragments.push(format!("({})", columns.join(",")));
        fragments.push("VALUES".to_string());
        let placeholders = vec!["?"; self.insert_fields.len()];
        fragments.push(format!("({})", placeholders.join(",")));
    }

    fn push_update(&self, fragments: &mut Vec<String>) {
        fragments.push("UPDATE".to_string());
        if let Some(table) = &self.table {
            table.push_fragments(fragments);
        }
        fragments.push("SET".to_string());
        if !self.update_fields.is_empty() {
            let sets: Vec<String> = self
                .update_fields
                .iter()
                .map(|f| format!("{} = ?", f.column))
                .collect();
            fragments.push(sets.join(", "));
        }
    }

    fn push_delete(&self, fragments: &mut Vec<String>) {
        fragments.push("DELETE".to_string());
        self.push_table("FROM", fragments);
    }

    fn push_table(&self, keyword: &str, fragments: &mut Vec<String>) {
        if let Some(table) = &self.table {
            fragments.push(keyword.to_string());
            table.push_fragments(fragments);
        }
    }

    fn push_where(&self, fragments: &mut Vec<String>) {
        if self.conditions.is_empty() {
            return;
        }
        fragments.push("WHERE".to_string());
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                // 第二个及之后的条件缺省以 AND 连接
                let connector = condition.connector.unwrap_or(Connector::And);
                fragments.push(connector.as_sql().to_string());
            }
            fragments.push(condition.column.clone());
            fragments.push(condition.operator.as_sql().to_string());
            if condition.has_placeholder() {
                fragments.push("?".to_string());
            }
        }
    }
}

fn positive(n: i64) -> Option<NonZeroU64> {
    u64::try_from(n).ok().and_then(NonZeroU64::new)
}

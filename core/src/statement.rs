//! 渲染结果：SQL 文本 + 按位置排序的绑定列表

use crate::bind_value::{apply_bindings, Binding};
use crate::db_pool::DbDriver;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::Database;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    sql: String,
    bindings: Vec<Binding>,
    #[serde(skip)]
    driver: DbDriver,
}

impl Statement {
    pub(crate) fn new(sql: String, bindings: Vec<Binding>, driver: DbDriver) -> Self {
        Self {
            sql,
            bindings,
            driver,
        }
    }

    /// 已转换为驱动占位符格式的 SQL
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn driver(&self) -> DbDriver {
        self.driver
    }

    pub fn into_parts(self) -> (String, Vec<Binding>) {
        (self.sql, self.bindings)
    }

    /// 生成绑定好参数的 sqlx 查询，可交给任意 executor（连接池、事务、连接）执行
    ///
    /// ```rust,ignore
    /// let statement = builder.build().ok_or(Error::EmptyStatement)?;
    /// let mut tx = pool.begin().await?;
    /// statement.query::<sqlx::Postgres>().execute(&mut *tx).await?;
    /// tx.commit().await?;
    /// ```
    pub fn query<DB>(&self) -> sqlx::query::Query<'_, DB, DB::Arguments<'_>>
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
        apply_bindings(sqlx::query::<DB>(&self.sql), &self.bindings)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

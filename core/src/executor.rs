use crate::db_pool::{DbDriver, DbPool};

/// 数据库上下文 trait
///
/// `StatementBuilder::new` 通过它获取驱动类型；构建过程本身不访问连接池，
/// 连接池访问器留给下游的执行层使用。
///
/// 注意：此 trait 要求 `Send`，因为执行层的异步方法需要在不同线程之间传递 Future
pub trait DbExecutor: Send {
    /// 获取驱动类型
    fn driver(&self) -> DbDriver;

    /// 转换 SQL 占位符
    fn convert_sql(&self, sql: &str) -> String {
        self.driver().convert_placeholders(sql)
    }

    /// 获取 MySQL 连接池引用
    #[cfg(feature = "mysql")]
    fn mysql_pool(&self) -> Option<&sqlx::Pool<sqlx::MySql>>;

    /// 获取 PostgreSQL 连接池引用
    #[cfg(feature = "postgres")]
    fn pg_pool(&self) -> Option<&sqlx::Pool<sqlx::Postgres>>;

    /// 获取 SQLite 连接池引用
    #[cfg(feature = "sqlite")]
    fn sqlite_pool(&self) -> Option<&sqlx::Pool<sqlx::Sqlite>>;
}

impl DbExecutor for DbPool {
    fn driver(&self) -> DbDriver {
        DbPool::driver(self)
    }

    #[cfg(feature = "mysql")]
    fn mysql_pool(&self) -> Option<&sqlx::Pool<sqlx::MySql>> {
        DbPool::mysql_pool(self)
    }

    #[cfg(feature = "postgres")]
    fn pg_pool(&self) -> Option<&sqlx::Pool<sqlx::Postgres>> {
        DbPool::pg_pool(self)
    }

    #[cfg(feature = "sqlite")]
    fn sqlite_pool(&self) -> Option<&sqlx::Pool<sqlx::Sqlite>> {
        DbPool::sqlite_pool(self)
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// and_where / or_where 在任何 where_ 之前被调用
    #[error("Usage order error: {0}")]
    UsageOrder(String),
    /// LIMIT 必须大于 0
    #[error("Limit must be greater than 0, got: {0}")]
    InvalidLimit(i64),
    /// OFFSET 必须大于 0
    #[error("Offset must be greater than 0, got: {0}")]
    InvalidOffset(i64),
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabase(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("No connection pool available for driver")]
    NoPoolAvailable,
    /// 构建器没有产生任何 SQL，无法执行
    #[error("Statement is empty, nothing to execute")]
    EmptyStatement,
}

pub type Result<T> = std::result::Result<T, Error>;

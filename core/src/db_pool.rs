#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use sqlx::Pool;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::statement::Statement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbDriver {
    MySql,
    Postgres,
    Sqlite,
}

impl DbDriver {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(DbDriver::MySql)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbDriver::Postgres)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(DbDriver::Sqlite)
        } else {
            Err(Error::UnsupportedDatabase(url.to_string()))
        }
    }

    /// 占位符，index 从 0 开始
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            DbDriver::MySql | DbDriver::Sqlite => "?".to_string(),
            DbDriver::Postgres => format!("${}", index + 1),
        }
    }

    /// 将 `?` 依次替换为当前驱动的占位符
    pub fn convert_placeholders(&self, sql: &str) -> String {
        match self {
            DbDriver::MySql | DbDriver::Sqlite => sql.to_string(),
            DbDriver::Postgres => {
                let mut result = String::with_capacity(sql.len());
                let mut index = 0;
                for ch in sql.chars() {
                    if ch == '?' {
                        result.push_str(&self.placeholder(index));
                        index += 1;
                    } else {
                        result.push(ch);
                    }
                }
                result
            }
        }
    }
}

/// 数据库上下文：构建器从这里获得驱动类型，执行时从这里获得连接池
#[derive(Debug, Clone)]
pub struct DbPool {
    driver: DbDriver,
    #[cfg(feature = "mysql")]
    mysql: Option<Arc<Pool<sqlx::MySql>>>,
    #[cfg(feature = "postgres")]
    pg: Option<Arc<Pool<sqlx::Postgres>>>,
    #[cfg(feature = "sqlite")]
    sqlite: Option<Arc<Pool<sqlx::Sqlite>>>,
}

impl DbPool {
    /// 从数据库 URL 连接并创建 DbPool
    pub async fn connect(url: &str) -> Result<Self> {
        let driver = DbDriver::from_url(url)?;

        match driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = Pool::<sqlx::MySql>::connect(url).await?;
                Self::from_mysql_pool(Arc::new(pool))
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = Pool::<sqlx::Postgres>::connect(url).await?;
                Self::from_postgres_pool(Arc::new(pool))
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = Pool::<sqlx::Sqlite>::connect(url).await?;
                Self::from_sqlite_pool(Arc::new(pool))
            }
            #[allow(unreachable_patterns)]
            _ => Err(Error::UnsupportedDatabase(format!(
                "Unsupported database driver, only mysql, postgres, sqlite is supported, got: {:?}",
                driver
            ))),
        }
    }

    /// 从 MySQL Pool 创建 DbPool
    #[cfg(feature = "mysql")]
    pub fn from_mysql_pool(pool: Arc<Pool<sqlx::MySql>>) -> Result<Self> {
        Ok(Self {
            driver: DbDriver::MySql,
            mysql: Some(pool),
            #[cfg(feature = "postgres")]
            pg: None,
            #[cfg(feature = "sqlite")]
            sqlite: None,
        })
    }

    /// 从 PostgreSQL Pool 创建 DbPool
    #[cfg(feature = "postgres")]
    pub fn from_postgres_pool(pool: Arc<Pool<sqlx::Postgres>>) -> Result<Self> {
        Ok(Self {
            driver: DbDriver::Postgres,
            #[cfg(feature = "mysql")]
            mysql: None,
            pg: Some(pool),
            #[cfg(feature = "sqlite")]
            sqlite: None,
        })
    }

    /// 从 SQLite Pool 创建 DbPool
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite_pool(pool: Arc<Pool<sqlx::Sqlite>>) -> Result<Self> {
        Ok(Self {
            driver: DbDriver::Sqlite,
            #[cfg(feature = "mysql")]
            mysql: None,
            #[cfg(feature = "postgres")]
            pg: None,
            sqlite: Some(pool),
        })
    }

    pub fn driver(&self) -> DbDriver {
        self.driver
    }

    #[cfg(feature = "mysql")]
    pub fn mysql_pool(&self) -> Option<&Pool<sqlx::MySql>> {
        self.mysql.as_deref()
    }

    #[cfg(feature = "postgres")]
    pub fn pg_pool(&self) -> Option<&Pool<sqlx::Postgres>> {
        self.pg.as_deref()
    }

    #[cfg(feature = "sqlite")]
    pub fn sqlite_pool(&self) -> Option<&Pool<sqlx::Sqlite>> {
        self.sqlite.as_deref()
    }

    /// 执行构建好的语句，返回受影响的行数
    pub async fn execute(&self, statement: &Statement) -> Result<u64> {
        tracing::debug!(
            sql = %statement.sql(),
            binds = statement.bindings().len(),
            "executing statement"
        );
        match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = self.mysql.as_deref().ok_or(Error::NoPoolAvailable)?;
                let result = statement.query::<sqlx::MySql>().execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = self.pg.as_deref().ok_or(Error::NoPoolAvailable)?;
                let result = statement.query::<sqlx::Postgres>().execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = self.sqlite.as_deref().ok_or(Error::NoPoolAvailable)?;
                let result = statement.query::<sqlx::Sqlite>().execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[allow(unreachable_patterns)]
            _ => Err(Error::NoPoolAvailable),
        }
    }

    /// 执行不带参数的原始 SQL（如 DDL）
    pub async fn execute_raw(&self, sql: &str) -> Result<u64> {
        tracing::debug!(sql, "executing raw sql");
        match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = self.mysql.as_deref().ok_or(Error::NoPoolAvailable)?;
                let result = sqlx::query(sql).execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = self.pg.as_deref().ok_or(Error::NoPoolAvailable)?;
                let result = sqlx::query(sql).execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = self.sqlite.as_deref().ok_or(Error::NoPoolAvailable)?;
                let result = sqlx::query(sql).execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[allow(unreachable_patterns)]
            _ => Err(Error::NoPoolAvailable),
        }
    }
}

pub mod bind_value;
pub mod clause;
pub mod db_pool;
pub mod error;
pub mod executor;
pub mod statement;
pub mod statement_builder;

pub use bind_value::{BindValue, Binding};
pub use clause::{Connector, JoinKind, Operand, Operator};
pub use db_pool::{DbDriver, DbPool};
pub use error::{Error, Result};
pub use executor::DbExecutor;
pub use statement::Statement;
pub use statement_builder::{StatementBuilder, StatementKind};

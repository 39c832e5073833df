//! Persistence Layer - 数据持久化
//!
//! SQLite 存储实现：只读仓储 + 事务化的 UnitOfWork

pub mod sqlite;

pub use self::sqlite::{
    create_pool, run_migrations, DatabaseConfig, DbPool, SqliteNovelRepository,
    SqliteUnitOfWork, SqliteUnitOfWorkFactory,
};

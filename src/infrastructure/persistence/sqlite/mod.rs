//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod novel_repo;
mod rows;
mod unit_of_work;

#[cfg(test)]
pub(crate) mod testing;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use novel_repo::SqliteNovelRepository;
pub use unit_of_work::{SqliteUnitOfWork, SqliteUnitOfWorkFactory};

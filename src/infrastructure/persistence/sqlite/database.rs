//! SQLite Database - 数据库连接和迁移

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::application::ports::RepositoryError;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库连接 URL
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 遇到写锁时的等待时间
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/rovel-unlock.db?mode=rwc".to_string(),
            max_connections: 5,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
///
/// 每个连接都启用 WAL、busy_timeout 与外键约束
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        busy_timeout_ms = config.busy_timeout.as_millis() as u64,
        "SQLite pool created with WAL mode"
    );

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 创建 novels 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS novels (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            budget INTEGER NOT NULL DEFAULT 0 CHECK (budget >= 0),
            balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 modules 表（mode 允许为空以兼容历史数据）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS modules (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            title TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            mode TEXT,
            price INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
            rent_remaining_balance INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (novel_id) REFERENCES novels(id) ON DELETE CASCADE,
            UNIQUE (novel_id, sort_order)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 chapters 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            module_id TEXT NOT NULL,
            novel_id TEXT NOT NULL,
            title TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            mode TEXT,
            price INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE,
            UNIQUE (module_id, sort_order)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 ledger_entries 表（只追加）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            user_id TEXT,
            amount INTEGER NOT NULL,
            note TEXT NOT NULL,
            budget_after INTEGER NOT NULL,
            kind TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 funds_movements 表（只追加）
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS funds_movements (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            user_id TEXT,
            amount INTEGER NOT NULL,
            direction TEXT NOT NULL,
            note TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 账本与流水不可修改、不可删除
    for table in ["ledger_entries", "funds_movements"] {
        for action in ["UPDATE", "DELETE"] {
            let statement = format!(
                r#"
                CREATE TRIGGER IF NOT EXISTS {table}_no_{action_lower}
                BEFORE {action} ON {table}
                BEGIN
                    SELECT RAISE(ABORT, '{table} is append-only');
                END
                "#,
                table = table,
                action = action,
                action_lower = action.to_lowercase(),
            );
            sqlx::query(&statement).execute(pool).await?;
        }
    }

    // 创建索引
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chapters_novel_id
        ON chapters(novel_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_ledger_entries_novel_id
        ON ledger_entries(novel_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_funds_movements_novel_id
        ON funds_movements(novel_id)
        "#,
    )
    .execute(pool)
    .await?;

    backfill_legacy_modes(pool).await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// 历史数据中缺失的 mode 视为 `paid`
async fn backfill_legacy_modes(pool: &DbPool) -> Result<(), sqlx::Error> {
    let modules = sqlx::query("UPDATE modules SET mode = 'paid' WHERE mode IS NULL OR mode = ''")
        .execute(pool)
        .await?
        .rows_affected();

    let chapters =
        sqlx::query("UPDATE chapters SET mode = 'paid' WHERE mode IS NULL OR mode = ''")
            .execute(pool)
            .await?
            .rows_affected();

    if modules > 0 || chapters > 0 {
        tracing::info!(modules, chapters, "Backfilled legacy content modes to paid");
    }
    Ok(())
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// 将 sqlx 错误映射为仓储错误
///
/// 写锁冲突（BUSY/LOCKED 及其扩展码）与连接池超时映射为可重试的 `Busy`
pub(crate) fn map_db_error(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                return RepositoryError::Duplicate(db_err.message().to_string());
            }
            let primary = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff);
            if matches!(primary, Some(SQLITE_BUSY) | Some(SQLITE_LOCKED)) {
                return RepositoryError::Busy(db_err.message().to_string());
            }
            RepositoryError::DatabaseError(err.to_string())
        }
        sqlx::Error::PoolTimedOut => RepositoryError::Busy(err.to_string()),
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_in_memory_db() {
        let config = DatabaseConfig::in_memory();
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_ledger_rejects_update_and_delete() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO ledger_entries (id, novel_id, user_id, amount, note, budget_after, kind, created_at) VALUES ('e1', 'n1', NULL, -10, 'x', 0, 'system', '2024-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();

        assert!(sqlx::query("UPDATE ledger_entries SET amount = 0")
            .execute(&pool)
            .await
            .is_err());
        assert!(sqlx::query("DELETE FROM ledger_entries")
            .execute(&pool)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_legacy_null_modes_backfilled_to_paid() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO novels (id, title, budget, balance, created_at, updated_at) VALUES ('n1', 'legacy', 0, 0, '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO modules (id, novel_id, title, sort_order, mode, price, created_at, updated_at) VALUES ('m1', 'n1', 'vol 1', 1, NULL, 10, '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')")
            .execute(&pool)
            .await
            .unwrap();

        run_migrations(&pool).await.unwrap();

        let (mode,): (String,) = sqlx::query_as("SELECT mode FROM modules WHERE id = 'm1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode, "paid");
    }
}

//! SQLite 行结构与实体转换

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::application::ports::{
    ChapterRecord, FundsMovementRecord, LedgerEntryRecord, ModuleRecord, NovelRecord,
    RepositoryError,
};
use crate::domain::catalog::{ChapterMode, ModuleMode, Price};
use crate::domain::funding::{FundsDirection, LedgerKind};

pub(crate) const NOVEL_COLUMNS: &str = "id, title, budget, balance, created_at, updated_at";

pub(crate) const MODULE_COLUMNS: &str =
    "id, novel_id, title, sort_order, mode, price, rent_remaining_balance, created_at, updated_at";

/// 章节查询总是以别名 `c` 引用 chapters 表（需要与 modules 联表排序）
pub(crate) const CHAPTER_COLUMNS: &str = "c.id AS id, c.module_id AS module_id, c.novel_id AS novel_id, \
     c.title AS title, c.sort_order AS sort_order, c.mode AS mode, c.price AS price, \
     c.created_at AS created_at, c.updated_at AS updated_at";

pub(crate) const LEDGER_COLUMNS: &str =
    "id, novel_id, user_id, amount, note, budget_after, kind, created_at";

pub(crate) const FUNDS_COLUMNS: &str =
    "id, novel_id, user_id, amount, direction, note, created_at";

fn parse_uuid(value: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn parse_optional_uuid(value: Option<String>) -> Result<Option<Uuid>, RepositoryError> {
    value.as_deref().map(parse_uuid).transpose()
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn parse_price(value: i64) -> Result<Price, RepositoryError> {
    Price::new(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

#[derive(FromRow)]
pub(crate) struct NovelRow {
    id: String,
    title: String,
    budget: i64,
    balance: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        Ok(NovelRecord {
            id: parse_uuid(&row.id)?,
            title: row.title,
            budget: row.budget,
            balance: row.balance,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct ModuleRow {
    id: String,
    novel_id: String,
    title: String,
    sort_order: i64,
    mode: String,
    price: i64,
    rent_remaining_balance: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ModuleRow> for ModuleRecord {
    type Error = RepositoryError;

    fn try_from(row: ModuleRow) -> Result<Self, Self::Error> {
        let mode = ModuleMode::from_str(&row.mode).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown module mode: {}", row.mode))
        })?;
        Ok(ModuleRecord {
            id: parse_uuid(&row.id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            title: row.title,
            order: row.sort_order,
            mode,
            price: parse_price(row.price)?,
            rent_remaining_balance: row.rent_remaining_balance,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct ChapterRow {
    id: String,
    module_id: String,
    novel_id: String,
    title: String,
    sort_order: i64,
    mode: String,
    price: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        let mode = ChapterMode::from_str(&row.mode).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown chapter mode: {}", row.mode))
        })?;
        Ok(ChapterRecord {
            id: parse_uuid(&row.id)?,
            module_id: parse_uuid(&row.module_id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            title: row.title,
            order: row.sort_order,
            mode,
            price: parse_price(row.price)?,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct LedgerRow {
    id: String,
    novel_id: String,
    user_id: Option<String>,
    amount: i64,
    note: String,
    budget_after: i64,
    kind: String,
    created_at: String,
}

impl TryFrom<LedgerRow> for LedgerEntryRecord {
    type Error = RepositoryError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let kind = LedgerKind::from_str(&row.kind).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown ledger kind: {}", row.kind))
        })?;
        Ok(LedgerEntryRecord {
            id: parse_uuid(&row.id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            user_id: parse_optional_uuid(row.user_id)?,
            amount: row.amount,
            note: row.note,
            budget_after: row.budget_after,
            kind,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct FundsRow {
    id: String,
    novel_id: String,
    user_id: Option<String>,
    amount: i64,
    direction: String,
    note: String,
    created_at: String,
}

impl TryFrom<FundsRow> for FundsMovementRecord {
    type Error = RepositoryError;

    fn try_from(row: FundsRow) -> Result<Self, Self::Error> {
        let direction = FundsDirection::from_str(&row.direction).ok_or_else(|| {
            RepositoryError::SerializationError(format!(
                "unknown funds direction: {}",
                row.direction
            ))
        })?;
        Ok(FundsMovementRecord {
            id: parse_uuid(&row.id)?,
            novel_id: parse_uuid(&row.novel_id)?,
            user_id: parse_optional_uuid(row.user_id)?,
            amount: row.amount,
            direction,
            note: row.note,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

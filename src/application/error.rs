//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::RepositoryError;
use crate::domain::catalog::CatalogError;
use crate::domain::funding::FundingError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 入账金额非正
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// 余额不足
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: i64, requested: i64 },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 唯一约束冲突（如重复的 order）
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// 存储写锁冲突，可重试
    #[error("Store busy: {0}")]
    Busy(String),

    /// 事务已回滚，调用方可安全重试
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// 仓储错误（只读路径）
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 是否值得重新执行整个事务
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(msg) => Self::Duplicate(msg),
            RepositoryError::Busy(msg) => Self::Busy(msg),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<FundingError> for ApplicationError {
    fn from(err: FundingError) -> Self {
        match err {
            FundingError::InvalidAmount(amount) => Self::InvalidAmount(amount),
        }
    }
}

impl From<CatalogError> for ApplicationError {
    fn from(err: CatalogError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

//! 事务执行器
//!
//! 在一个 UnitOfWork 中执行闭包：成功则提交，失败则回滚；
//! 存储报告写锁冲突时重新执行整个闭包。

use futures_util::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::application::ports::{UnitOfWork, UnitOfWorkFactory};

/// 冲突重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次执行之外的最大重试次数
    pub max_retries: u32,
    /// 线性退避基数
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(20),
        }
    }
}

/// 事务执行器
pub struct TransactionRunner {
    factory: Arc<dyn UnitOfWorkFactory>,
    policy: RetryPolicy,
}

impl TransactionRunner {
    pub fn new(factory: Arc<dyn UnitOfWorkFactory>, policy: RetryPolicy) -> Self {
        Self { factory, policy }
    }

    /// 在事务中执行 `body`
    ///
    /// `body` 可能被调用多次（冲突重试），因此它捕获的数据需要在每次调用时重新克隆。
    /// 存储错误统一以 `TransactionAborted` 返回；业务错误（NotFound、InvalidAmount 等）
    /// 在回滚后原样返回。
    pub async fn run<T, F>(&self, operation: &'static str, mut body: F) -> Result<T, ApplicationError>
    where
        T: Send,
        F: FnMut(&mut dyn UnitOfWork) -> BoxFuture<'_, Result<T, ApplicationError>> + Send,
    {
        let mut attempt: u32 = 0;

        loop {
            let mut uow = match self.factory.begin().await {
                Ok(uow) => uow,
                Err(e) => {
                    let err = ApplicationError::from(e);
                    if err.is_retryable() && attempt < self.policy.max_retries {
                        attempt += 1;
                        self.backoff(operation, attempt, &err).await;
                        continue;
                    }
                    return Err(Self::surface(operation, err));
                }
            };

            let outcome = body(uow.as_mut()).await;

            let err = match outcome {
                Ok(value) => match uow.commit().await {
                    Ok(()) => return Ok(value),
                    Err(e) => ApplicationError::from(e),
                },
                Err(e) => {
                    if let Err(rollback_err) = uow.rollback().await {
                        tracing::warn!(
                            operation,
                            error = %rollback_err,
                            "Rollback failed, connection will discard the transaction"
                        );
                    }
                    e
                }
            };

            if err.is_retryable() && attempt < self.policy.max_retries {
                attempt += 1;
                self.backoff(operation, attempt, &err).await;
                continue;
            }

            return Err(Self::surface(operation, err));
        }
    }

    async fn backoff(&self, operation: &'static str, attempt: u32, err: &ApplicationError) {
        tracing::warn!(
            operation,
            attempt,
            max_retries = self.policy.max_retries,
            error = %err,
            "Transaction conflict, retrying"
        );
        tokio::time::sleep(self.policy.backoff * attempt).await;
    }

    /// 存储层错误对外统一为 TransactionAborted
    fn surface(operation: &'static str, err: ApplicationError) -> ApplicationError {
        match err {
            ApplicationError::Busy(msg) | ApplicationError::RepositoryError(msg) => {
                tracing::error!(operation, error = %msg, "Transaction aborted");
                ApplicationError::TransactionAborted(msg)
            }
            other => {
                tracing::debug!(operation, error = %other, "Transaction rolled back");
                other
            }
        }
    }
}

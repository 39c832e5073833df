//! Funding Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundingError {
    #[error("金额必须大于 0: {0}")]
    InvalidAmount(i64),
}

//! Catalog Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("无效的标题: {0}")]
    InvalidTitle(String),

    #[error("价格不能为负数: {0}")]
    NegativePrice(i64),

    #[error("无效的模式: {0}")]
    InvalidMode(String),
}

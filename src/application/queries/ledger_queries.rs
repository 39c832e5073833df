//! Ledger Queries - 账本与资金流水

use uuid::Uuid;

/// 单页默认条数
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// 单页最大条数
pub const MAX_PAGE_LIMIT: usize = 200;

/// 账本历史查询（最新在前）
#[derive(Debug, Clone)]
pub struct GetLedgerHistory {
    pub novel_id: Uuid,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// 资金流水查询（最新在前）
#[derive(Debug, Clone)]
pub struct GetFundsLog {
    pub novel_id: Uuid,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// 规范化分页参数：limit 缺省为 50，上限 200
pub(crate) fn page(limit: Option<usize>, offset: Option<usize>) -> (usize, usize) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (limit, offset.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_caps() {
        assert_eq!(page(None, None), (50, 0));
        assert_eq!(page(Some(1000), Some(5)), (200, 5));
        assert_eq!(page(Some(0), None), (1, 0));
    }
}

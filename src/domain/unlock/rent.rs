//! 租借模式余额规则

use crate::domain::catalog::{ChapterMode, Price};

/// 租借模块的未解锁余额：仍处于 `paid` 的章节价格之和
pub fn outstanding_rent_balance<I>(chapters: I) -> i64
where
    I: IntoIterator<Item = (ChapterMode, Price)>,
{
    chapters
        .into_iter()
        .filter(|(mode, _)| *mode == ChapterMode::Paid)
        .map(|(_, price)| price.value())
        .sum()
}

/// 租借模块在未解锁余额耗尽后自动转为已发布
pub fn should_auto_switch(outstanding: i64) -> bool {
    outstanding <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(v: i64) -> Price {
        Price::new(v).unwrap()
    }

    #[test]
    fn test_only_paid_chapters_count() {
        let chapters = vec![
            (ChapterMode::Paid, price(10)),
            (ChapterMode::Published, price(10)),
            (ChapterMode::Draft, price(7)),
            (ChapterMode::Paid, price(5)),
        ];
        assert_eq!(outstanding_rent_balance(chapters), 15);
    }

    #[test]
    fn test_auto_switch_threshold() {
        assert!(!should_auto_switch(10));
        assert!(should_auto_switch(0));
        assert!(should_auto_switch(outstanding_rent_balance(Vec::new())));
    }
}

//! Catalog Context - Value Objects

use serde::{Deserialize, Serialize};

use super::CatalogError;

/// 模块可见模式
///
/// 历史数据中缺失的模式在迁移阶段统一回填为 `paid`，
/// 因此这里是一个封闭枚举，没有 "undefined" 分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleMode {
    /// 草稿，不参与解锁
    Draft,
    /// 付费，等待预算解锁
    Paid,
    /// 已发布
    Published,
    /// 租借模式，章节单独计费
    Rent,
}

impl ModuleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleMode::Draft => "draft",
            ModuleMode::Paid => "paid",
            ModuleMode::Published => "published",
            ModuleMode::Rent => "rent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ModuleMode::Draft),
            "paid" => Some(ModuleMode::Paid),
            "published" => Some(ModuleMode::Published),
            "rent" => Some(ModuleMode::Rent),
            _ => None,
        }
    }

    /// 模块内章节是否可被解锁扫描
    pub fn opens_chapters(&self) -> bool {
        matches!(self, ModuleMode::Published | ModuleMode::Rent)
    }
}

impl std::fmt::Display for ModuleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 章节可见模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterMode {
    Draft,
    Paid,
    Published,
}

impl ChapterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterMode::Draft => "draft",
            ChapterMode::Paid => "paid",
            ChapterMode::Published => "published",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ChapterMode::Draft),
            "paid" => Some(ChapterMode::Paid),
            "published" => Some(ChapterMode::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChapterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 解锁价格（非负）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn new(value: i64) -> Result<Self, CatalogError> {
        if value < 0 {
            return Err(CatalogError::NegativePrice(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_free(&self) -> bool {
        self.0 == 0
    }
}

/// 小说 / 模块 / 章节标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title(String);

impl Title {
    pub fn new(title: impl Into<String>) -> Result<Self, CatalogError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::InvalidTitle("标题不能为空".to_string()));
        }
        if trimmed.chars().count() > 200 {
            return Err(CatalogError::InvalidTitle(
                "标题长度不能超过200字符".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_mode_round_trip_names() {
        for mode in [
            ModuleMode::Draft,
            ModuleMode::Paid,
            ModuleMode::Published,
            ModuleMode::Rent,
        ] {
            assert_eq!(ModuleMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(ModuleMode::from_str("undefined"), None);
    }

    #[test]
    fn test_chapter_mode_rejects_rent() {
        assert_eq!(ChapterMode::from_str("rent"), None);
    }

    #[test]
    fn test_only_published_and_rent_open_chapters() {
        assert!(ModuleMode::Published.opens_chapters());
        assert!(ModuleMode::Rent.opens_chapters());
        assert!(!ModuleMode::Paid.opens_chapters());
        assert!(!ModuleMode::Draft.opens_chapters());
    }

    #[test]
    fn test_price_rejects_negative() {
        assert!(Price::new(-1).is_err());
        assert!(Price::new(0).unwrap().is_free());
        assert_eq!(Price::new(30).unwrap().value(), 30);
    }

    #[test]
    fn test_title_is_trimmed_and_validated() {
        assert_eq!(Title::new("  第一卷 ").unwrap().as_str(), "第一卷");
        assert!(Title::new("   ").is_err());
        assert!(Title::new("a".repeat(201)).is_err());
    }
}

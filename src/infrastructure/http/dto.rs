//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    AdjustBudgetResponse, CatalogSnapshot, ChapterRecord, ContributeResponse,
    FundsMovementRecord, GiftResponse, LedgerEntryRecord, ModuleRecord, ModuleWithChapters,
    NovelRecord, UnlockOutcome, WithdrawResponse,
};
use crate::domain::catalog::{ChapterMode, ModuleMode};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Catalog DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNovelRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct GetNovelRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub novel_id: Uuid,
    pub title: String,
    pub order: i64,
    #[serde(default = "default_module_mode")]
    pub mode: ModuleMode,
    #[serde(default)]
    pub price: i64,
}

fn default_module_mode() -> ModuleMode {
    ModuleMode::Draft
}

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub module_id: Uuid,
    pub title: String,
    pub order: i64,
    #[serde(default = "default_chapter_mode")]
    pub mode: ChapterMode,
    #[serde(default)]
    pub price: i64,
}

fn default_chapter_mode() -> ChapterMode {
    ChapterMode::Draft
}

#[derive(Debug, Serialize)]
pub struct NovelResponse {
    pub id: Uuid,
    pub title: String,
    pub budget: i64,
    pub balance: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&NovelRecord> for NovelResponse {
    fn from(record: &NovelRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            budget: record.budget,
            balance: record.balance,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ChapterMode,
    pub price: i64,
}

impl From<&ChapterRecord> for ChapterResponse {
    fn from(record: &ChapterRecord) -> Self {
        Self {
            id: record.id,
            module_id: record.module_id,
            title: record.title.clone(),
            order: record.order,
            mode: record.mode,
            price: record.price.value(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ModuleMode,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_remaining_balance: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<ChapterResponse>,
}

impl From<&ModuleRecord> for ModuleResponse {
    fn from(record: &ModuleRecord) -> Self {
        Self {
            id: record.id,
            novel_id: record.novel_id,
            title: record.title.clone(),
            order: record.order,
            mode: record.mode,
            price: record.price.value(),
            rent_remaining_balance: (record.mode == ModuleMode::Rent)
                .then_some(record.rent_remaining_balance),
            chapters: Vec::new(),
        }
    }
}

impl From<&ModuleWithChapters> for ModuleResponse {
    fn from(entry: &ModuleWithChapters) -> Self {
        Self {
            chapters: entry.chapters.iter().map(ChapterResponse::from).collect(),
            ..ModuleResponse::from(&entry.module)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    #[serde(flatten)]
    pub novel: NovelResponse,
    pub modules: Vec<ModuleResponse>,
}

impl From<&CatalogSnapshot> for CatalogResponse {
    fn from(snapshot: &CatalogSnapshot) -> Self {
        Self {
            novel: NovelResponse::from(&snapshot.novel),
            modules: snapshot.modules.iter().map(ModuleResponse::from).collect(),
        }
    }
}

// ============================================================================
// Funding DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    pub novel_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GiftRequest {
    pub novel_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub novel_id: Uuid,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ContributeResult {
    pub novel_id: Uuid,
    pub amount: i64,
    pub budget: i64,
    pub balance: i64,
    pub unlock: UnlockOutcome,
}

impl From<ContributeResponse> for ContributeResult {
    fn from(response: ContributeResponse) -> Self {
        Self {
            novel_id: response.novel_id,
            amount: response.amount,
            budget: response.budget,
            balance: response.balance,
            unlock: response.unlock,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GiftResult {
    pub novel_id: Uuid,
    pub amount: i64,
    pub budget: i64,
    pub balance: i64,
}

impl From<GiftResponse> for GiftResult {
    fn from(response: GiftResponse) -> Self {
        Self {
            novel_id: response.novel_id,
            amount: response.amount,
            budget: response.budget,
            balance: response.balance,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub note: String,
    pub budget_after: i64,
    pub kind: String,
    pub created_at: String,
}

impl From<LedgerEntryRecord> for LedgerEntryResponse {
    fn from(record: LedgerEntryRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            amount: record.amount,
            note: record.note,
            budget_after: record.budget_after,
            kind: record.kind.as_str().to_string(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FundsMovementResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: i64,
    pub direction: String,
    pub note: String,
    pub created_at: String,
}

impl From<FundsMovementRecord> for FundsMovementResponse {
    fn from(record: FundsMovementRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            amount: record.amount,
            direction: record.direction.as_str().to_string(),
            note: record.note,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub novel_id: Uuid,
    pub total: usize,
    pub items: Vec<T>,
}

// ============================================================================
// Admin DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ManualUnlockRequest {
    pub novel_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AdjustBudgetRequest {
    pub novel_id: Uuid,
    pub admin_id: Uuid,
    pub budget: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub novel_id: Uuid,
    pub admin_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdjustBudgetResult {
    pub novel_id: Uuid,
    pub budget: i64,
    pub delta: i64,
}

impl From<AdjustBudgetResponse> for AdjustBudgetResult {
    fn from(response: AdjustBudgetResponse) -> Self {
        Self {
            novel_id: response.novel_id,
            budget: response.budget,
            delta: response.delta,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WithdrawResult {
    pub novel_id: Uuid,
    pub amount: i64,
    pub balance: i64,
}

impl From<WithdrawResponse> for WithdrawResult {
    fn from(response: WithdrawResponse) -> Self {
        Self {
            novel_id: response.novel_id,
            amount: response.amount,
            balance: response.balance,
        }
    }
}

//! Admin HTTP Handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use crate::application::{AdjustBudget, ManualUnlock, UnlockOutcome, WithdrawBalance};
use crate::infrastructure::http::dto::{
    AdjustBudgetRequest, AdjustBudgetResult, ApiResponse, ManualUnlockRequest, WithdrawRequest,
    WithdrawResult,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 手动解锁（不入账）
pub async fn manual_unlock(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ManualUnlockRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UnlockOutcome>>, ApiError> {
    let Json(req) = payload?;
    let outcome = state
        .manual_unlock_handler
        .handle(ManualUnlock {
            novel_id: req.novel_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(outcome)))
}

/// 修正预算（不触发解锁）
pub async fn adjust_budget(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdjustBudgetRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AdjustBudgetResult>>, ApiError> {
    let Json(req) = payload?;
    let response = state
        .adjust_budget_handler
        .handle(AdjustBudget {
            novel_id: req.novel_id,
            admin_id: req.admin_id,
            new_budget: req.budget,
            note: req.note,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 提取余额
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WithdrawResult>>, ApiError> {
    let Json(req) = payload?;
    let response = state
        .withdraw_balance_handler
        .handle(WithdrawBalance {
            novel_id: req.novel_id,
            admin_id: req.admin_id,
            amount: req.amount,
            note: req.note,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

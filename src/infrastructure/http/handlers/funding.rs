//! Funding HTTP Handlers - 贡献、礼物、账本

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use crate::application::{Contribute, GetFundsLog, GetLedgerHistory, SendGift};
use crate::infrastructure::http::dto::{
    ApiResponse, ContributeRequest, ContributeResult, FundsMovementResponse, GiftRequest,
    GiftResult, HistoryRequest, LedgerEntryResponse, PageResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 贡献（入账后立即尝试解锁）
pub async fn contribute(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContributeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ContributeResult>>, ApiError> {
    let Json(req) = payload?;
    let response = state
        .contribute_handler
        .handle(Contribute {
            novel_id: req.novel_id,
            user_id: req.user_id,
            amount: req.amount,
            note: req.note,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 礼物（只增加余额）
pub async fn send_gift(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GiftRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<GiftResult>>, ApiError> {
    let Json(req) = payload?;
    let response = state
        .send_gift_handler
        .handle(SendGift {
            novel_id: req.novel_id,
            user_id: req.user_id,
            amount: req.amount,
            note: req.note,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 账本历史（最新在前）
pub async fn ledger_history(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HistoryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PageResponse<LedgerEntryResponse>>>, ApiError> {
    let Json(req) = payload?;
    let entries = state
        .ledger_history_handler
        .handle(GetLedgerHistory {
            novel_id: req.novel_id,
            limit: req.limit,
            offset: req.offset,
        })
        .await?;

    let items: Vec<LedgerEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(PageResponse {
        novel_id: req.novel_id,
        total: items.len(),
        items,
    })))
}

/// 资金流水（最新在前）
pub async fn funds_movements(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HistoryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PageResponse<FundsMovementResponse>>>, ApiError> {
    let Json(req) = payload?;
    let movements = state
        .funds_log_handler
        .handle(GetFundsLog {
            novel_id: req.novel_id,
            limit: req.limit,
            offset: req.offset,
        })
        .await?;

    let items: Vec<FundsMovementResponse> = movements.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(PageResponse {
        novel_id: req.novel_id,
        total: items.len(),
        items,
    })))
}

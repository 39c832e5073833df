//! Catalog HTTP Handlers - 小说、模块、章节

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

use crate::application::{CreateChapter, CreateModule, CreateNovel, GetNovelCatalog};
use crate::infrastructure::http::dto::{
    ApiResponse, CatalogResponse, ChapterResponse, CreateChapterRequest, CreateModuleRequest,
    CreateNovelRequest, GetNovelRequest, ModuleResponse, NovelResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 创建小说
pub async fn create_novel(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateNovelRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let Json(req) = payload?;
    let novel = state
        .create_novel_handler
        .handle(CreateNovel { title: req.title })
        .await?;

    Ok(Json(ApiResponse::success(NovelResponse::from(&novel))))
}

/// 获取小说目录（预算、余额、模块与章节）
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GetNovelRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CatalogResponse>>, ApiError> {
    let Json(req) = payload?;
    let catalog = state
        .get_catalog_handler
        .handle(GetNovelCatalog { novel_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(CatalogResponse::from(
        catalog.as_ref(),
    ))))
}

/// 创建模块
pub async fn create_module(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateModuleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ModuleResponse>>, ApiError> {
    let Json(req) = payload?;
    let module = state
        .create_module_handler
        .handle(CreateModule {
            novel_id: req.novel_id,
            title: req.title,
            order: req.order,
            mode: req.mode,
            price: req.price,
        })
        .await?;

    Ok(Json(ApiResponse::success(ModuleResponse::from(&module))))
}

/// 创建章节
pub async fn create_chapter(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateChapterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let Json(req) = payload?;
    let chapter = state
        .create_chapter_handler
        .handle(CreateChapter {
            module_id: req.module_id,
            title: req.title,
            order: req.order,
            mode: req.mode,
            price: req.price,
        })
        .await?;

    Ok(Json(ApiResponse::success(ChapterResponse::from(&chapter))))
}

//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Product, ProductCreate, ProductUpdate};

use crate::core::ServerState;
use crate::db::repository::product;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_TERM_DURATION, validate_amount, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

fn validate_term(term: i64) -> AppResult<()> {
    if term < 1 || term > MAX_TERM_DURATION {
        return Err(AppError::validation(format!(
            "termDuration must be between 1 and {MAX_TERM_DURATION}, got {term}"
        )));
    }
    Ok(())
}

/// GET /api/admin/products - 获取所有产品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let products = product::find_all(&state.pool).await?;
    Ok(ok(products))
}

/// GET /api/admin/products/:id - 获取单个产品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Product>>> {
    let product = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(ok(product))
}

/// POST /api/admin/products - 创建产品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<Product>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_amount(payload.deposit_amount, "depositAmount")?;
    validate_term(payload.term_duration)?;

    let product = product::create(&state.pool, payload).await?;
    tracing::info!(product_id = product.id, name = %product.name, "Product created");
    Ok(ok(product))
}

/// PUT /api/admin/products/:id - 更新产品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<AppResponse<Product>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(amount) = payload.deposit_amount {
        validate_amount(amount, "depositAmount")?;
    }
    if let Some(term) = payload.term_duration {
        validate_term(term)?;
    }

    let product = product::update(&state.pool, id, payload).await?;
    Ok(ok(product))
}

/// DELETE /api/admin/products/:id - 删除产品（软删除）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let result = product::delete(&state.pool, id).await?;
    Ok(ok(result))
}

//! Member API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{Member, MemberCreate, MemberUpdate};

use crate::core::ServerState;
use crate::db::repository::{member, product};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/admin/members - 获取所有会员
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Member>>>> {
    let members = member::find_all(&state.pool).await?;
    Ok(ok(members))
}

/// GET /api/admin/members/:id - 获取单个会员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Member>>> {
    let member = member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {id}")))?;
    Ok(ok(member))
}

/// POST /api/admin/members - 创建会员
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<Json<AppResponse<Member>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    // An assigned product must exist
    if let Some(product_id) = payload.product_id {
        product::find_by_id(&state.pool, product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;
    }

    let member = member::create(&state.pool, payload).await?;
    tracing::info!(member_id = member.id, name = %member.name, "Member created");
    Ok(ok(member))
}

/// PUT /api/admin/members/:id - 更新会员
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<AppResponse<Member>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    if let Some(product_id) = payload.product_id {
        product::find_by_id(&state.pool, product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;
    }

    let member = member::update(&state.pool, id, payload).await?;
    Ok(ok(member))
}

/// DELETE /api/admin/members/:id - 删除会员（软删除）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    let result = member::delete(&state.pool, id).await?;
    if result {
        tracing::info!(member_id = id, "Member deactivated");
    }
    Ok(ok(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPayload {
    pub is_completed: bool,
}

/// PUT /api/admin/members/:id/complete - 手动标记缴清
///
/// Orthogonal to the period math; the reconciliation engine ignores it.
pub async fn set_completed(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CompletedPayload>,
) -> AppResult<Json<AppResponse<Member>>> {
    let member = member::set_completed(&state.pool, id, payload.is_completed).await?;
    Ok(ok(member))
}

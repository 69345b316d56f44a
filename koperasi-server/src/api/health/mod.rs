//! Health API 模块

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health - 健康检查 (含数据库 ping)
async fn health(State(state): State<ServerState>) -> AppResult<Json<AppResponse<HealthStatus>>> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "unavailable"
        }
    };

    Ok(Json(AppResponse::success(HealthStatus {
        status: "ok",
        database,
    })))
}

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

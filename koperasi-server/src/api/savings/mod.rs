//! Savings API 模块
//!
//! 分期付款：提交、审核、对账查询

pub mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/savings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route(
            "/check-period/{member_id}/{product_id}",
            get(handler::check_period),
        )
        .route("/period-status/{member_id}", get(handler::period_status))
        .route("/member/{member_id}", get(handler::list_by_member))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
}

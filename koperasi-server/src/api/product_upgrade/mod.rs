//! Product Upgrade API 模块
//!
//! 两步流程: calculate (只读预览) → execute (落库)

pub mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/product-upgrade", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/calculate", post(handler::calculate))
        .route("/execute", post(handler::execute))
        .route("/member/{member_id}", get(handler::history))
}

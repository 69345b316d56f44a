//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`members`] - 会员管理接口
//! - [`products`] - 储蓄产品管理接口
//! - [`savings`] - 分期付款接口 (check-period, period-status, 提交/审核)
//! - [`product_upgrade`] - 产品升级接口 (calculate / execute / history)

pub mod health;
pub mod members;
pub mod product_upgrade;
pub mod products;
pub mod savings;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(members::router())
        .merge(products::router())
        .merge(savings::router())
        .merge(product_upgrade::router())
        // Health API - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware
///
/// ServiceBuilder runs layers top-to-bottom on the way in, so the
/// request ID exists before the trace layer logs anything.
pub fn build_app() -> Router<ServerState> {
    build_router().layer(
        ServiceBuilder::new()
            // Request ID - Generate unique ID for each request
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static("x-request-id"),
                XRequestId,
            ))
            // Trace - Request tracing (logs at INFO level)
            .layer(TraceLayer::new_for_http())
            // Propagate request ID to response
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            // CORS - the React dashboard runs on a different origin in dev
            .layer(CorsLayer::permissive())
            // Compression - Gzip compress responses
            .layer(CompressionLayer::new()),
    )
}

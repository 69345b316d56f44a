//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] / [`AppResult`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构 (`{ success, data, error }`)
//! - 日志、输入校验

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResponse, AppResult, ok};

//! HTTP 请求处理模块
//!
//! 本地 HTTP 服务只有一个处理器：把请求体包装成调用事件交给签发器。

use crate::AppState;
use crate::envelope::{InvocationEvent, ResponseEnvelope};
use axum::body::Bytes;
use axum::extract::State;

/// 处理上传 URL 签发请求
///
/// # 请求方法
///
/// POST /
///
/// # 请求示例
///
/// ```json
/// { "filename": "photo.png" }
/// ```
///
/// # 返回值
///
/// 签发器生成的信封，状态码、响应头和响应体都原样写入 HTTP 响应。
/// 请求体不是 UTF-8 时同样返回统一的失败信封。
pub async fn handle_upload_url(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Error generating presigned URL");
            return ResponseEnvelope::failure();
        }
    };

    state.issuer.handle(&InvocationEvent::new(body)).await
}

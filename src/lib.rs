//! 上传 URL 签发服务库
//!
//! 根据调用方给出的文件名签发一个限时的预签名上传 URL，
//! 调用方随后直接把文件写入对象存储，字节不经过本服务。主要功能包括：
//! - 从环境变量加载签发配置
//! - 构造 `Upload/<filename>` 形式的存储键
//! - 通过 S3 客户端生成预签名 PUT URL
//! - 以带跨域头的 JSON 信封返回结果，任何错误统一折叠为 500

pub mod config;
pub mod envelope;
pub mod error;
pub mod function;
pub mod handlers;
pub mod issuer;
pub mod signer;

use axum::routing::post;
use http::{Method, header};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::IssuerConfig;
pub use envelope::{InvocationEvent, ResponseEnvelope};
pub use function::function_handler;
pub use issuer::UploadUrlIssuer;
pub use signer::{S3UploadSigner, UploadSigner};

/// 本地 HTTP 服务共享的状态
#[derive(Clone)]
pub struct AppState {
    pub issuer: UploadUrlIssuer<dyn UploadSigner>,
}

/// 创建并配置本地 HTTP 服务的 Axum 应用程序
///
/// - `POST /` 把原始请求体交给签发器，并原样返回签发器的信封
/// - CORS 预检请求由 `CorsLayer` 应答，允许任意来源的 OPTIONS 和 POST
/// - 请求追踪中间件
pub fn app(issuer: UploadUrlIssuer<dyn UploadSigner>) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::OPTIONS, Method::POST])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE]));

    axum::Router::new()
        .route("/", post(handlers::handle_upload_url))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { issuer })
}

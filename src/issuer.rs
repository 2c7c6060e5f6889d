//! 上传 URL 签发器
//!
//! 解析请求、构造存储键、向签名服务申请预签名上传 URL，
//! 并把结果包装为响应信封。

use crate::config::IssuerConfig;
use crate::envelope::{InvocationEvent, ResponseEnvelope, UploadRequest, UploadUrlBody};
use crate::error::IssueError;
use crate::signer::UploadSigner;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// 根据前缀和文件名构造存储键。
///
/// 文件名原样拼接，不做任何转义或校验，包含 `/../` 的文件名也会保留原样。
///
/// # 示例
///
/// ```
/// use upload_url_issuer::issuer::storage_key;
///
/// assert_eq!(storage_key("Upload/", "photo.png"), "Upload/photo.png");
/// assert_eq!(storage_key("Upload/", "a/../b.txt"), "Upload/a/../b.txt");
/// ```
pub fn storage_key(prefix: &str, filename: &str) -> String {
    format!("{prefix}{filename}")
}

/// 上传 URL 签发器
///
/// 签名服务在执行上下文中创建一次，签发器持有其共享引用。
pub struct UploadUrlIssuer<S: ?Sized> {
    config: Arc<IssuerConfig>,
    signer: Arc<S>,
}

impl<S: ?Sized> Clone for UploadUrlIssuer<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            signer: self.signer.clone(),
        }
    }
}

impl<S> UploadUrlIssuer<S>
where
    S: UploadSigner + ?Sized,
{
    pub fn new(config: Arc<IssuerConfig>, signer: Arc<S>) -> Self {
        Self { config, signer }
    }

    /// 处理一次调用。
    ///
    /// 总是返回一个信封：成功时为 200，任何错误都记录日志后折叠为统一的 500。
    pub async fn handle(&self, event: &InvocationEvent) -> ResponseEnvelope {
        match self.issue(&event.body).await {
            Ok(upload) => {
                tracing::info!(bucket = %upload.bucket, key = %upload.file_key, "issued upload url");
                ResponseEnvelope::success(&upload)
            }
            Err(error) => {
                tracing::error!(error = %error, "Error generating presigned URL");
                ResponseEnvelope::failure()
            }
        }
    }

    /// 解析请求体并签发上传 URL。
    ///
    /// # 参数
    ///
    /// * `body` - 调用事件中的原始 `body` 值，应为 JSON 编码的字符串。
    ///
    /// # Errors
    ///
    /// 请求体缺失、不是字符串、不是合法 JSON、缺少 `filename`，
    /// 或签名失败时返回 [`IssueError`]。
    pub async fn issue(&self, body: &Value) -> Result<UploadUrlBody, IssueError> {
        let body = match body {
            Value::Null => return Err(IssueError::MissingBody),
            // 非字符串的 body 由 serde 报告类型错误
            other => String::deserialize(other)?,
        };
        let request: UploadRequest = serde_json::from_str(&body)?;

        let file_key = storage_key(&self.config.path_prefix, &request.filename);

        let upload_url = self
            .signer
            .presign_put(&self.config.bucket, &file_key, self.config.expires_in())
            .await
            .map_err(|source| IssueError::Signing {
                key: file_key.clone(),
                source,
            })?;

        Ok(UploadUrlBody {
            upload_url,
            bucket: self.config.bucket.clone(),
            file_key,
        })
    }
}

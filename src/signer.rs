//! 预签名上传 URL 模块
//!
//! 该模块定义签名服务的抽象，以及基于 AWS S3 客户端的实现。

use crate::config::IssuerConfig;
use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;

/// 签名服务
///
/// 给定目标位置和有效期，生成一个在过期前允许向该位置写入一次的 URL。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadSigner: Send + Sync {
    /// 为 `bucket` 中的 `key` 生成预签名上传 URL。
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}

/// 基于 S3 客户端的签名服务
///
/// 客户端在每个执行上下文中只创建一次，之后在请求之间共享。
#[derive(Debug, Clone)]
pub struct S3UploadSigner {
    client: Arc<Client>,
}

impl S3UploadSigner {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// 按配置创建 S3 客户端并包装为签名服务。
    ///
    /// 配置中带有静态凭据时直接使用，
    /// 否则使用 AWS 默认凭据链（执行角色、环境变量、profile 等）。
    pub async fn from_config(config: &IssuerConfig) -> Self {
        let region_provider =
            RegionProviderChain::first_try(Some(Region::new(config.region.clone())));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

        if let Some(static_credentials) = &config.credentials {
            let credentials = Credentials::new(
                static_credentials.access_key_id.clone(),
                static_credentials.secret_access_key.clone(),
                None,
                None,
                "manual-credentials",
            );
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        // S3 兼容服务通常只支持 path-style 寻址
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self::new(Arc::new(Client::from_conf(s3_config)))
    }
}

#[async_trait]
impl UploadSigner for S3UploadSigner {
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let presigning_config = PresigningConfig::expires_in(expires_in)?;

        // 只在本地计算签名，不会向存储服务发出请求
        let presigned_request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await?;

        Ok(presigned_request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticCredentials;
    use aws_sdk_s3::config::Builder;

    fn offline_signer(endpoint: Option<&str>) -> S3UploadSigner {
        let mut builder = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("ap-northeast-2"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"));
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        S3UploadSigner::new(Arc::new(Client::from_conf(builder.build())))
    }

    #[tokio::test]
    async fn test_presign_put_returns_signed_https_url() {
        let signer = offline_signer(None);

        let url = signer
            .presign_put("fit-bool-p", "Upload/photo.png", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(url.starts_with("https://"));
        assert!(url.contains("fit-bool-p"));
        assert!(url.contains("Upload/photo.png"));
        assert!(url.contains("X-Amz-Signature"));
        assert!(url.contains("X-Amz-Expires=3600"));
    }

    #[tokio::test]
    async fn test_presign_put_uses_custom_endpoint() {
        let signer = offline_signer(Some("http://localhost:9000"));

        let url = signer
            .presign_put("fit-bool-p", "Upload/a.txt", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/fit-bool-p/Upload/a.txt?"));
        assert!(url.contains("X-Amz-Expires=60"));
    }

    #[tokio::test]
    async fn test_from_config_uses_static_credentials_and_endpoint() {
        let config = IssuerConfig {
            credentials: Some(StaticCredentials {
                access_key_id: "AKIDSTATIC".to_string(),
                secret_access_key: "secret".to_string(),
            }),
            endpoint_url: Some("http://localhost:9000".to_string()),
            ..IssuerConfig::default()
        };
        let signer = S3UploadSigner::from_config(&config).await;

        let url = signer
            .presign_put("fit-bool-p", "Upload/a.txt", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:9000/fit-bool-p/Upload/a.txt?"));
        assert!(url.contains("AKIDSTATIC"));
        assert!(url.contains("ap-northeast-2"));
    }

    #[tokio::test]
    async fn test_presign_put_rejects_overlong_expiry() {
        // 预签名有效期上限为一周
        let signer = offline_signer(None);

        let result = signer
            .presign_put("fit-bool-p", "Upload/a.txt", Duration::from_secs(8 * 24 * 3600))
            .await;

        assert!(result.is_err());
    }
}

//! 上传 URL 签发服务的配置模块。
//!
//! 该模块负责从环境变量加载签发配置，未设置的项使用内置默认值。

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// 默认区域
pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// 默认目标存储桶
pub const DEFAULT_BUCKET: &str = "fit-bool-p";

/// 预签名 URL 默认有效期（秒）
pub const DEFAULT_EXPIRY_SECS: u64 = 3600;

/// 存储键的默认前缀
pub const DEFAULT_PATH_PREFIX: &str = "Upload/";

/// 本地 HTTP 服务默认监听地址
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must not be empty")]
    Empty { name: &'static str },

    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidExpiry { name: &'static str, value: String },

    #[error("{name} is not a valid socket address: {value:?}")]
    InvalidListenAddr { name: &'static str, value: String },

    #[error("S3_ACCESS_KEY_ID and S3_SECRET_ACCESS_KEY must be set together")]
    IncompleteCredentials,
}

/// 静态 S3 凭据
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// 密钥不写入日志
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// 签发配置
///
/// 在执行上下文启动时构建一次，之后以引用方式传给签发器。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerConfig {
    /// 存储服务区域
    pub region: String,
    /// 目标存储桶名称
    pub bucket: String,
    /// 预签名 URL 有效期（秒）
    pub expiry_secs: u64,
    /// 存储键前缀，原样拼接在文件名之前
    pub path_prefix: String,
    /// S3 兼容服务的端点 URL，未设置时使用 AWS 默认端点
    pub endpoint_url: Option<String>,
    /// 静态凭据，未设置时使用 AWS 默认凭据链
    pub credentials: Option<StaticCredentials>,
    /// 本地 HTTP 服务监听地址
    pub listen_addr: SocketAddr,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            expiry_secs: DEFAULT_EXPIRY_SECS,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            endpoint_url: None,
            credentials: None,
            listen_addr: ([0, 0, 0, 0], 3000).into(),
        }
    }
}

impl IssuerConfig {
    /// 从进程环境变量加载配置。
    ///
    /// 调用前应先用 `dotenvy` 加载 `.env` 文件。
    ///
    /// # Errors
    ///
    /// 任一变量取值非法时返回 [`ConfigError`]。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 通过给定的查找函数加载配置。
    ///
    /// # 参数
    ///
    /// * `lookup` - 按变量名返回变量值的函数，未设置时返回 `None`。
    ///
    /// # 返回值
    ///
    /// 加载完成的配置，或第一个非法取值对应的错误。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = non_empty(&lookup, "UPLOAD_REGION", DEFAULT_REGION)?;
        let bucket = non_empty(&lookup, "UPLOAD_BUCKET", DEFAULT_BUCKET)?;

        let expiry_secs = match lookup("UPLOAD_EXPIRY_SECS") {
            None => DEFAULT_EXPIRY_SECS,
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidExpiry {
                        name: "UPLOAD_EXPIRY_SECS",
                        value,
                    });
                }
            },
        };

        // 前缀允许为空，此时存储键就是文件名本身
        let path_prefix =
            lookup("UPLOAD_PATH_PREFIX").unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string());

        let endpoint_url = lookup("S3_ENDPOINT").filter(|value| !value.trim().is_empty());

        let credentials = match (
            lookup("S3_ACCESS_KEY_ID").filter(|value| !value.is_empty()),
            lookup("S3_SECRET_ACCESS_KEY").filter(|value| !value.is_empty()),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteCredentials),
        };

        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr {
                name: "LISTEN_ADDR",
                value: listen_addr.clone(),
            })?;

        Ok(Self {
            region,
            bucket,
            expiry_secs,
            path_prefix,
            endpoint_url,
            credentials,
            listen_addr,
        })
    }

    /// 预签名 URL 有效期
    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expiry_secs)
    }
}

fn non_empty<F>(lookup: &F, name: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { name }),
        Some(value) => Ok(value),
    }
}

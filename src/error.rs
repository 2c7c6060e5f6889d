use thiserror::Error;

/// 签发过程中可能出现的错误
///
/// 所有错误在签发器边界统一折叠为同一个 500 响应，这里的细节只写入日志。
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("request body is missing")]
    MissingBody,

    #[error("request body is not a valid upload request: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("failed to presign upload for {key}: {source:#}")]
    Signing {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

use anyhow::Context;
use lambda_runtime::service_fn;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;
use upload_url_issuer::{
    IssuerConfig, S3UploadSigner, UploadSigner, UploadUrlIssuer, app, function_handler,
};

/// 函数运行时会设置该环境变量
const LAMBDA_RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .init();

    let config = Arc::new(IssuerConfig::from_env().context("invalid configuration")?);

    // 每个执行上下文只创建一次 S3 客户端
    let signer: Arc<dyn UploadSigner> = Arc::new(S3UploadSigner::from_config(&config).await);
    let issuer = UploadUrlIssuer::new(config.clone(), signer);

    if std::env::var_os(LAMBDA_RUNTIME_API).is_some() {
        tracing::info!(bucket = %config.bucket, region = %config.region, "starting function runtime");

        lambda_runtime::run(service_fn(|event| function_handler(&issuer, event)))
            .await
            .map_err(|e| anyhow::anyhow!("function runtime failed: {e}"))?;

        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("服务器运行在 http://{}", config.listen_addr);

    axum::serve(listener, app(issuer)).await?;

    Ok(())
}

//! 函数运行时入口
//!
//! 负载以原始 JSON 值接收，任何形状的负载都会交给签发器，
//! 因此运行时总能拿到一个响应信封。

use crate::envelope::{InvocationEvent, ResponseEnvelope};
use crate::issuer::UploadUrlIssuer;
use crate::signer::UploadSigner;
use lambda_runtime::LambdaEvent;
use serde_json::Value;

/// 处理一次函数调用
///
/// # 参数
///
/// * `issuer` - 执行上下文中共享的签发器。
/// * `event` - 运行时传入的调用事件，负载不做任何类型约束。
///
/// # 返回值
///
/// 总是 `Ok`，失败同样以 500 信封表示。
pub async fn function_handler<S>(
    issuer: &UploadUrlIssuer<S>,
    event: LambdaEvent<Value>,
) -> Result<ResponseEnvelope, lambda_runtime::Error>
where
    S: UploadSigner + ?Sized,
{
    let (payload, context) = event.into_parts();
    tracing::debug!(request_id = %context.request_id, "handling invocation");

    Ok(issuer.handle(&InvocationEvent::from_payload(payload)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IssuerConfig;
    use crate::signer::MockUploadSigner;
    use lambda_runtime::Context;
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn issuer_with(signer: MockUploadSigner) -> UploadUrlIssuer<MockUploadSigner> {
        UploadUrlIssuer::new(Arc::new(IssuerConfig::default()), Arc::new(signer))
    }

    async fn invoke(issuer: &UploadUrlIssuer<MockUploadSigner>, payload: Value) -> Value {
        let envelope = assert_ok!(
            function_handler(issuer, LambdaEvent::new(payload, Context::default())).await
        );
        serde_json::to_value(envelope).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope_is_serialized_for_runtime() {
        let mut signer = MockUploadSigner::new();
        signer
            .expect_presign_put()
            .times(1)
            .returning(|bucket, key, _| Ok(format!("https://{bucket}.s3.amazonaws.com/{key}?sig")));
        let issuer = issuer_with(signer);

        let response = invoke(
            &issuer,
            json!({ "body": "{\"filename\":\"photo.png\"}", "httpMethod": "POST" }),
        )
        .await;

        assert_eq!(response["statusCode"], 200);
        assert_eq!(response["headers"]["Content-Type"], "application/json");
        assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(response["headers"]["Access-Control-Allow-Methods"], "OPTIONS,POST");

        let body: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "upload_url": "https://fit-bool-p.s3.amazonaws.com/Upload/photo.png?sig",
                "bucket": "fit-bool-p",
                "file_key": "Upload/photo.png",
            })
        );
    }

    #[tokio::test]
    async fn test_any_payload_shape_gets_failure_envelope() {
        let mut signer = MockUploadSigner::new();
        signer.expect_presign_put().never();
        let issuer = issuer_with(signer);

        let payloads = [
            json!({ "body": { "filename": "x" } }),
            json!({ "body": 5 }),
            json!({ "body": null }),
            json!({ "body": "not json" }),
            json!({ "body": "{}" }),
            json!({}),
            json!("str"),
            json!(null),
            json!([1, 2, 3]),
        ];

        for payload in payloads {
            let response = invoke(&issuer, payload.clone()).await;

            assert_eq!(response["statusCode"], 500, "{payload}");
            assert_eq!(response["headers"]["Access-Control-Allow-Origin"], "*");
            assert_eq!(response["headers"]["Content-Type"], "application/json");
            assert_eq!(response["body"], r#"{"message":"Failed to generate URL"}"#);
        }
    }
}

//! 调用事件与响应信封
//!
//! 函数运行时以 `{body}` 事件调用签发器，签发器以
//! `{statusCode, headers, body}` 信封应答，`body` 本身是 JSON 字符串。

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 失败时返回给调用方的固定消息，不携带任何内部细节
pub const FAILURE_MESSAGE: &str = "Failed to generate URL";

/// 成功响应允许的跨域方法
pub const ALLOWED_METHODS: &str = "OPTIONS,POST";

/// 调用事件
///
/// 只读取 `body`，其余字段忽略。`body` 保留原始 JSON 值，
/// 非字符串或缺失的情况交给签发器统一处理。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationEvent {
    pub body: Value,
}

impl InvocationEvent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Value::String(body.into()),
        }
    }

    /// 从函数运行时传入的原始负载构造事件。
    ///
    /// 负载不是对象，或对象中没有 `body` 时，事件的 `body` 为 `null`。
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Object(mut fields) => Self {
                body: fields.remove("body").unwrap_or(Value::Null),
            },
            _ => Self::default(),
        }
    }
}

/// 请求体中唯一读取的字段
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
}

/// 成功响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadUrlBody {
    pub upload_url: String,
    pub bucket: String,
    pub file_key: String,
}

/// 失败响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// 响应信封
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseEnvelope {
    /// 构建 200 成功信封。
    pub fn success(upload: &UploadUrlBody) -> Self {
        let mut headers = base_headers();
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            ALLOWED_METHODS.to_string(),
        );

        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: to_json(upload),
        }
    }

    /// 构建 500 失败信封，所有错误统一使用同一条消息。
    pub fn failure() -> Self {
        let body = MessageBody {
            message: FAILURE_MESSAGE.to_string(),
        };

        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            headers: base_headers(),
            body: to_json(&body),
        }
    }
}

fn base_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

fn to_json<T: Serialize>(value: &T) -> String {
    // 只含字符串字段的结构体序列化不会失败
    serde_json::to_string(value).unwrap_or_else(|_| String::from("{}"))
}

/// 将信封原样转换为 HTTP 响应（本地 HTTP 服务使用）
impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut resp_builder = Response::builder().status(status);
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                resp_builder = resp_builder.header(name, value);
            }
        }

        match resp_builder.body(Body::from(self.body)) {
            Ok(resp) => resp,
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

//! JSON API 路由。
//!
//! 所有处理函数都返回统一结构 `{"success": bool, "error"?: string, ...}`，
//! 书库错误在这里转换成状态码与提示，不会向上传播。

pub(crate) mod chapters;
pub(crate) mod glossary;
pub(crate) mod novels;
pub(crate) mod status;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::{Json, async_trait};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{error, warn};

use crate::library::error::{ErrorKind, LibraryError};

pub(crate) type ApiResponse = (StatusCode, Json<Value>);

pub(crate) fn ok(payload: Value) -> ApiResponse {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    if let Value::Object(fields) = payload {
        body.extend(fields);
    }
    (StatusCode::OK, Json(Value::Object(body)))
}

pub(crate) fn fail(action: &str, err: &LibraryError) -> ApiResponse {
    let status = match err.kind() {
        ErrorKind::Service => StatusCode::BAD_GATEWAY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotModified => StatusCode::CONFLICT,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(target: "web", action, error = %err, "action failed");
    } else {
        warn!(target: "web", action, error = %err, "action rejected");
    }
    (
        status,
        Json(json!({ "success": false, "error": err.to_string() })),
    )
}

fn bad_request(source: &str, detail: String) -> ApiResponse {
    warn!(target: "web", source, error = %detail, "request rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": detail })),
    )
}

/// JSON 请求体；解析失败时同样返回统一结构（400）。
pub(crate) struct ApiJson<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejected(rejection)),
        }
    }
}

fn json_rejected(rejection: JsonRejection) -> ApiResponse {
    bad_request("body", rejection.body_text())
}

/// 查询参数；缺失或格式错误时返回统一结构（400）。
pub(crate) struct ApiQuery<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(query_rejected(rejection)),
        }
    }
}

fn query_rejected(rejection: QueryRejection) -> ApiResponse {
    bad_request("query", rejection.body_text())
}

pub(crate) async fn not_found() -> ApiResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "no such endpoint" })),
    )
}

/// 在阻塞线程池中执行书库操作（文件存储与 HTTP 调用都是阻塞的）。
pub(crate) async fn run_blocking<F>(action: &'static str, f: F) -> ApiResponse
where
    F: FnOnce() -> Result<Value, LibraryError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(payload)) => ok(payload),
        Ok(Err(e)) => fail(action, &e),
        Err(e) => {
            error!(target: "web", action, error = %e, "blocking task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "internal error" })),
            )
        }
    }
}

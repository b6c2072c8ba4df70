//! Unified JSON response envelope.
//!
//! Every API response has the shape `{"code": .., "msg": .., "data": ..}`;
//! `code == 0` means success. Failures also carry a matching HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::blockchain::BlockchainError;

pub const SUCCESS: i32 = 0;
pub const ERROR: i32 = 7;
pub const CHAIN_NOT_CONFIGURED: i32 = 10001;
pub const NO_HEALTHY_ENDPOINT: i32 = 10002;
pub const UPSTREAM_FAILURE: i32 = 10003;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

/// 200 with `data`.
pub fn success<T: Serialize>(data: T) -> Response {
    let body = ApiResponse {
        code: SUCCESS,
        msg: "success".to_string(),
        data: Some(data),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Error envelope with no data.
pub fn fail(status: StatusCode, code: i32, msg: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        code,
        msg: msg.into(),
        data: None,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for BlockchainError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            BlockchainError::NotConfigured(_) => (StatusCode::NOT_FOUND, CHAIN_NOT_CONFIGURED),
            BlockchainError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, NO_HEALTHY_ENDPOINT),
            BlockchainError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, UPSTREAM_FAILURE),
            BlockchainError::Connect { .. } | BlockchainError::Rpc(_) => {
                (StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE)
            }
        };
        fail(status, code, self.to_string())
    }
}

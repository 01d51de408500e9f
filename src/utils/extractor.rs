//! 路径参数提取器
//!
//! 解析失败时直接返回统一格式的错误响应。

use actix_web::error::InternalError;
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径中的正整数 ID (`{id}`)
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id").unwrap_or_default();
        match parse_positive_id(raw) {
            Some(id) => ready(Ok(SafeIDI64(id))),
            None => {
                let response = HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("无效的 ID: '{raw}'"),
                ));
                ready(Err(
                    InternalError::from_response("invalid path id", response).into()
                ))
            }
        }
    }
}

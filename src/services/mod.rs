pub mod admin;
pub mod assignments;
pub mod recurring;
pub mod statistics;

pub use admin::AdminService;
pub use assignments::AssignmentService;
pub use recurring::{GenerationReport, RecurringOrchestrator, RecurringService};
pub use statistics::StatisticsService;

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::errors::HWTrackerError;
use crate::middlewares::RequireApiKey;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 从请求中取出已认证用户，未认证时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireApiKey::extract_user(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        ))
    })
}

pub(crate) fn get_orchestrator(request: &HttpRequest) -> Arc<RecurringOrchestrator> {
    request
        .app_data::<web::Data<RecurringOrchestrator>>()
        .expect("RecurringOrchestrator not found in app data")
        .clone()
        .into_inner()
}

/// 业务错误转换为 HTTP 响应，存储类错误使用 `fallback` 错误码
pub(crate) fn error_response(err: &HWTrackerError, fallback: ErrorCode) -> HttpResponse {
    let message = err.message().to_string();
    match err {
        HWTrackerError::NotFound(_) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, message))
        }
        HWTrackerError::Authentication(_) => HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, message)),
        HWTrackerError::Authorization(_) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, message))
        }
        HWTrackerError::Validation(_) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message)),
        HWTrackerError::DateParse(_) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::InvalidDate, message))
        }
        HWTrackerError::InvalidRecurrenceType(_) => HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::InvalidRecurrenceType, message),
        ),
        HWTrackerError::InvalidEndType(_) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::InvalidEndType, message)),
        _ => {
            tracing::error!("{}", err);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(fallback, message))
        }
    }
}

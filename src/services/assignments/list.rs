use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::AssignmentService;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        requests::{AssignmentListParams, AssignmentListQuery},
        responses::AssignmentItemsResponse,
    },
};
use crate::services::{current_user, error_response, get_orchestrator};

pub async fn list_assignments(
    service: &AssignmentService,
    query: AssignmentListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let now = get_orchestrator(request).clock().now();

    let (page, size) = query.pagination.normalized();
    let list_query = AssignmentListQuery {
        user_id: user.id,
        filter: query.filter,
        page,
        size,
        now,
    };

    match storage.list_assignments_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Assignment list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

/// 从本地今天 0 点起 `days` 天内到期的未完成作业
pub async fn list_due_within_days(
    service: &AssignmentService,
    days: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let from = get_orchestrator(request).clock().start_of_today();
    let to = from + Duration::days(days);

    match storage.list_assignments_due_between(user.id, from, to).await {
        Ok(items) => {
            let count = items.len();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                AssignmentItemsResponse { items, count },
                "Assignment list retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecurringService;
use crate::models::{
    ApiResponse, ErrorCode,
    recurring::{RecurringAssignmentResponse, RecurringListResponse},
};
use crate::services::{current_user, error_response};

pub async fn list_recurring(
    service: &RecurringService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = service.get_orchestrator(request);
    let offset = orchestrator.clock().offset();

    match orchestrator.list(user.id).await {
        Ok(items) => {
            let items: Vec<_> = items
                .into_iter()
                .map(|r| RecurringAssignmentResponse::new(r, offset))
                .collect();
            let count = items.len();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                RecurringListResponse { items, count },
                "Recurring assignments retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

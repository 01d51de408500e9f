use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecurringService;
use crate::models::{ApiResponse, ErrorCode, recurring::RecurringAssignmentResponse};
use crate::services::{current_user, error_response};

pub async fn get_recurring(
    service: &RecurringService,
    recurring_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = service.get_orchestrator(request);

    match orchestrator.get(user.id, recurring_id).await {
        Ok(recurring) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecurringAssignmentResponse::new(recurring, orchestrator.clock().offset()),
            "Recurring assignment retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RecurringNotFound)),
    }
}

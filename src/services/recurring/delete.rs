use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecurringService;
use crate::models::{ApiResponse, ErrorCode, recurring::requests::DeleteRecurringParams};
use crate::services::{current_user, error_response};

pub async fn delete_recurring(
    service: &RecurringService,
    recurring_id: i64,
    params: DeleteRecurringParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = service.get_orchestrator(request);

    match orchestrator
        .delete(user.id, recurring_id, params.delete_future)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Recurring assignment deleted successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RecurringDeleteFailed)),
    }
}

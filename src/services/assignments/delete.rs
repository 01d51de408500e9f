use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, load_owned};
use crate::errors::HWTrackerError;
use crate::models::{ApiResponse, ErrorCode, assignments::requests::DeleteAssignmentParams};
use crate::services::{current_user, error_response, get_orchestrator};

pub async fn delete_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    params: DeleteAssignmentParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let assignment = match load_owned(&storage, user.id, assignment_id).await {
        Ok(assignment) => assignment,
        Err(e) => return Ok(error_response(&e, ErrorCode::AssignmentNotFound)),
    };

    // 同时删除周期设置，其余实例保留
    let mut recurring_deleted = false;
    if params.delete_recurring
        && let Some(recurring_id) = assignment.recurring_assignment_id
    {
        match get_orchestrator(request)
            .delete(user.id, recurring_id, false)
            .await
        {
            Ok(()) => recurring_deleted = true,
            Err(HWTrackerError::NotFound(_)) => {}
            Err(e) => return Ok(error_response(&e, ErrorCode::RecurringDeleteFailed)),
        }
    }

    match storage.delete_assignment(assignment.id).await {
        Ok(_) => {
            info!("Assignment {} deleted by user {}", assignment.id, user.id);
            let message = if recurring_deleted {
                "Assignment and recurring settings deleted"
            } else {
                "Assignment deleted successfully"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message)))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::AssignmentDeleteFailed)),
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_owned};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response, get_orchestrator};

pub async fn toggle_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let mut assignment = match load_owned(&storage, user.id, assignment_id).await {
        Ok(assignment) => assignment,
        Err(e) => return Ok(error_response(&e, ErrorCode::AssignmentNotFound)),
    };

    assignment.toggle_complete(get_orchestrator(request).clock().now());

    match storage.update_assignment(&assignment).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            updated,
            "Assignment status toggled",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::AssignmentUpdateFailed)),
    }
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StatisticsService;
use crate::models::{
    ApiResponse, ErrorCode,
    statistics::{SubjectArchiveRequest, SubjectArchiveResponse},
};
use crate::services::{current_user, error_response};

pub async fn set_subject_archived(
    service: &StatisticsService,
    body: SubjectArchiveRequest,
    archived: bool,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let subject = body.subject.trim().to_string();
    if subject.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Subject is required",
        )));
    }

    let storage = service.get_storage(request);
    match storage
        .set_archived_by_subject(user.id, &subject, archived)
        .await
    {
        Ok(affected) => {
            info!(
                "User {} set archived={} on {} assignment(s) of subject {}",
                user.id, archived, affected, subject
            );
            let message = if archived {
                "Subject archived successfully"
            } else {
                "Subject unarchived successfully"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubjectArchiveResponse { subject, affected },
                message,
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::AssignmentUpdateFailed)),
    }
}

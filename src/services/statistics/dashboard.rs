use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::StatisticsService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode, assignments::entities::AssignmentFilter,
    statistics::DashboardResponse,
};
use crate::services::{current_user, error_response, get_orchestrator};
use crate::storage::Storage;
use crate::utils::clock::AppClock;

pub async fn get_dashboard(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let orchestrator = get_orchestrator(request);

    match build_dashboard(storage.as_ref(), user.id, orchestrator.clock()).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            dashboard,
            "Dashboard retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

pub(crate) async fn build_dashboard(
    storage: &dyn Storage,
    user_id: i64,
    clock: &AppClock,
) -> Result<DashboardResponse> {
    let now = clock.now();
    let today = clock.start_of_today();

    let total_pending = storage
        .count_assignments(user_id, Some(AssignmentFilter::Pending), now)
        .await?;
    let overdue = storage
        .count_assignments(user_id, Some(AssignmentFilter::Overdue), now)
        .await?;
    let due_today = storage
        .list_assignments_due_between(user_id, today, today + Duration::days(1))
        .await?
        .len() as u64;
    let due_this_week = storage
        .list_assignments_due_between(user_id, today, today + Duration::days(7))
        .await?
        .len() as u64;
    let subjects = storage.list_subjects(user_id).await?;

    Ok(DashboardResponse {
        total_pending,
        due_today,
        due_this_week,
        overdue,
        subjects,
    })
}

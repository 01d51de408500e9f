use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Duration;

use super::StatisticsService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    statistics::{StatisticsFilter, StatisticsParams, StatisticsResponse},
};
use crate::services::{current_user, error_response, get_orchestrator};
use crate::utils::clock::AppClock;
use crate::utils::datetime::parse_local_date;

pub async fn get_statistics(
    service: &StatisticsService,
    query: StatisticsParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = get_orchestrator(request);
    let clock = orchestrator.clock();

    let filter = match build_filter(query, clock) {
        Ok(filter) => filter,
        Err(e) => return Ok(error_response(&e, ErrorCode::InvalidDate)),
    };

    let storage = service.get_storage(request);
    match storage.list_assignments_for_statistics(user.id, &filter).await {
        Ok(assignments) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StatisticsResponse::from_assignments(&assignments, clock.now()),
            "Statistics retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// `to` 包含当天，转换为次日 0 点的开区间
fn build_filter(query: StatisticsParams, clock: &AppClock) -> Result<StatisticsFilter> {
    let from = non_empty(query.from)
        .map(|raw| parse_local_date(&raw, clock))
        .transpose()?;
    let to = non_empty(query.to)
        .map(|raw| parse_local_date(&raw, clock).map(|day| day + Duration::days(1)))
        .transpose()?;

    Ok(StatisticsFilter {
        subject: non_empty(query.subject),
        from,
        to,
        include_archived: query.include_archived,
    })
}

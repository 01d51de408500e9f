use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecurringService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    recurring::{RecurringAssignmentResponse, RecurringChanges, requests::UpdateRecurringRequest},
};
use crate::services::{current_user, error_response};
use crate::utils::clock::AppClock;
use crate::utils::datetime::parse_due_datetime;

pub async fn update_recurring(
    service: &RecurringService,
    recurring_id: i64,
    update_data: UpdateRecurringRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = service.get_orchestrator(request);

    let changes = match changes_from_request(update_data, orchestrator.clock()) {
        Ok(changes) => changes,
        Err(e) => return Ok(error_response(&e, ErrorCode::RecurringUpdateFailed)),
    };

    match orchestrator.update_rule(user.id, recurring_id, changes).await {
        Ok(recurring) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecurringAssignmentResponse::new(recurring, orchestrator.clock().offset()),
            "Recurring assignment updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RecurringUpdateFailed)),
    }
}

pub async fn set_active(
    service: &RecurringService,
    recurring_id: i64,
    active: bool,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = service.get_orchestrator(request);

    let message = if active {
        "Recurring assignment resumed"
    } else {
        "Recurring assignment paused"
    };

    match orchestrator.set_active(user.id, recurring_id, active).await {
        Ok(recurring) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecurringAssignmentResponse::new(recurring, orchestrator.clock().offset()),
            message,
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RecurringUpdateFailed)),
    }
}

fn changes_from_request(
    req: UpdateRecurringRequest,
    clock: &AppClock,
) -> Result<RecurringChanges> {
    let end_date = req
        .end_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| parse_due_datetime(raw, clock))
        .transpose()?;

    Ok(RecurringChanges {
        title: req.title,
        description: req.description,
        subject: req.subject,
        priority: req.priority,
        recurrence_type: req.recurrence_type,
        recurrence_interval: req.recurrence_interval,
        recurrence_weekday: req.recurrence_weekday,
        recurrence_day: req.recurrence_day,
        due_time: req.due_time,
        end_type: req.end_type,
        end_count: req.end_count,
        end_date,
        edit_behavior: req.edit_behavior,
        reminder_enabled: req.reminder_enabled,
        reminder_offset: req.reminder_offset,
        urgent_reminder_enabled: req.urgent_reminder_enabled,
        is_active: req.is_active,
    })
}

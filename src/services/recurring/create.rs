use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecurringService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    recurring::{RecurringAssignmentResponse, RecurringDraft, requests::CreateRecurringRequest},
};
use crate::services::{current_user, error_response};
use crate::utils::clock::AppClock;
use crate::utils::datetime::parse_due_datetime;

pub async fn create_recurring(
    service: &RecurringService,
    create_data: CreateRecurringRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = service.get_orchestrator(request);

    let draft = match draft_from_request(create_data, orchestrator.clock()) {
        Ok(draft) => draft,
        Err(e) => return Ok(error_response(&e, ErrorCode::RecurringCreationFailed)),
    };

    match orchestrator.create(user.id, draft).await {
        Ok(recurring) => Ok(HttpResponse::Created().json(ApiResponse::success(
            RecurringAssignmentResponse::new(recurring, orchestrator.clock().offset()),
            "Recurring assignment created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::RecurringCreationFailed)),
    }
}

fn draft_from_request(req: CreateRecurringRequest, clock: &AppClock) -> Result<RecurringDraft> {
    let first_due_date = parse_due_datetime(&req.first_due_date, clock)?;
    let end_date = req
        .end_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| parse_due_datetime(raw, clock))
        .transpose()?;

    Ok(RecurringDraft {
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
        first_due_date,
    })
}

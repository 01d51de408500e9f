use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};

use super::AssignmentService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{NewAssignment, Priority},
        requests::{CreateAssignmentRequest, RecurrenceInput},
        responses::CreateAssignmentResponse,
    },
    recurring::{RecurringAssignmentResponse, RecurringDraft},
};
use crate::services::{current_user, error_response, get_orchestrator};
use crate::utils::clock::AppClock;
use crate::utils::datetime::parse_due_datetime;
use crate::utils::validate::validate_assignment_fields;

pub async fn create_assignment(
    service: &AssignmentService,
    create_data: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = get_orchestrator(request);
    let clock = orchestrator.clock();

    if let Err(e) = validate_assignment_fields(
        &create_data.title,
        &create_data.description,
        &create_data.subject,
    ) {
        return Ok(error_response(&e, ErrorCode::AssignmentCreationFailed));
    }

    let priority = match Priority::parse_or_default(&create_data.priority) {
        Ok(priority) => priority,
        Err(e) => return Ok(error_response(&e, ErrorCode::AssignmentCreationFailed)),
    };

    let due_date = match parse_due_datetime(&create_data.due_date, clock) {
        Ok(due_date) => due_date,
        Err(e) => return Ok(error_response(&e, ErrorCode::InvalidDate)),
    };

    // 仅在开启提醒时解析提醒时间
    let reminder_at = match reminder_time(&create_data, clock) {
        Ok(at) => at,
        Err(e) => return Ok(error_response(&e, ErrorCode::InvalidDate)),
    };

    if let Some(recurrence) = create_data
        .recurrence
        .as_ref()
        .filter(|r| !r.kind.is_empty() && r.kind != "none")
    {
        let draft = match recurring_draft(&create_data, recurrence, due_date, reminder_at, clock) {
            Ok(draft) => draft,
            Err(e) => return Ok(error_response(&e, ErrorCode::RecurringCreationFailed)),
        };

        return match orchestrator.create(user.id, draft).await {
            Ok(recurring) => {
                let response = RecurringAssignmentResponse::new(recurring, clock.offset());
                Ok(HttpResponse::Created().json(ApiResponse::success(
                    CreateAssignmentResponse::Recurring(response),
                    "Recurring assignment created successfully",
                )))
            }
            Err(e) => Ok(error_response(&e, ErrorCode::RecurringCreationFailed)),
        };
    }

    let new = NewAssignment {
        user_id: user.id,
        title: create_data.title,
        description: create_data.description,
        subject: create_data.subject,
        priority,
        due_date,
        reminder_enabled: create_data.reminder_enabled,
        reminder_at,
        urgent_reminder_enabled: create_data.urgent_reminder_enabled.unwrap_or(true),
        recurring_assignment_id: None,
    };

    let storage = service.get_storage(request);
    match storage.create_assignment(new).await {
        Ok(assignment) => Ok(HttpResponse::Created().json(ApiResponse::success(
            CreateAssignmentResponse::Assignment(assignment),
            "Assignment created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::AssignmentCreationFailed)),
    }
}

fn reminder_time(
    create_data: &CreateAssignmentRequest,
    clock: &AppClock,
) -> Result<Option<DateTime<Utc>>> {
    if !create_data.reminder_enabled {
        return Ok(None);
    }
    create_data
        .reminder_at
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| parse_due_datetime(raw, clock))
        .transpose()
}

/// 把带周期设置的创建请求转换为周期作业草稿
///
/// 截止时刻取截止日期的本地 `HH:MM`，提醒提前量由提醒时间推算。
fn recurring_draft(
    create_data: &CreateAssignmentRequest,
    recurrence: &RecurrenceInput,
    due_date: DateTime<Utc>,
    reminder_at: Option<DateTime<Utc>>,
    clock: &AppClock,
) -> Result<RecurringDraft> {
    let end_date = recurrence
        .until
        .date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| parse_due_datetime(raw, clock))
        .transpose()?;

    let reminder_offset = reminder_at
        .map(|at| (due_date - at).num_minutes())
        .filter(|minutes| *minutes >= 0)
        .and_then(|minutes| i32::try_from(minutes).ok());

    Ok(RecurringDraft {
        title: create_data.title.clone(),
        description: create_data.description.clone(),
        subject: create_data.subject.clone(),
        priority: create_data.priority.clone(),
        recurrence_type: recurrence.kind.clone(),
        recurrence_interval: recurrence.interval.unwrap_or(1),
        recurrence_weekday: recurrence.weekday,
        recurrence_day: recurrence.day,
        due_time: clock.to_local(due_date).format("%H:%M").to_string(),
        end_type: recurrence.until.kind.clone(),
        end_count: recurrence.until.count,
        end_date,
        edit_behavior: String::new(),
        reminder_enabled: create_data.reminder_enabled,
        reminder_offset,
        urgent_reminder_enabled: create_data.urgent_reminder_enabled.unwrap_or(true),
        first_due_date: due_date,
    })
}

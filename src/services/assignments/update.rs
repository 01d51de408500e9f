use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::{AssignmentChanges, Priority},
        requests::UpdateAssignmentRequest,
    },
};
use crate::services::{current_user, error_response, get_orchestrator};
use crate::utils::clock::AppClock;
use crate::utils::datetime::parse_due_datetime;

pub async fn update_assignment(
    _service: &AssignmentService,
    assignment_id: i64,
    update_data: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let orchestrator = get_orchestrator(request);

    let scope = update_data.edit_behavior;
    let changes = match changes_from_request(update_data, orchestrator.clock()) {
        Ok(changes) => changes,
        Err(e) => return Ok(error_response(&e, ErrorCode::AssignmentUpdateFailed)),
    };

    match orchestrator
        .update_occurrence(user.id, assignment_id, scope, changes)
        .await
    {
        Ok(assignment) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assignment,
            "Assignment updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::AssignmentUpdateFailed)),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 空字符串与缺省字段都保持原值
fn changes_from_request(
    update_data: UpdateAssignmentRequest,
    clock: &AppClock,
) -> Result<AssignmentChanges> {
    let priority = non_empty(update_data.priority)
        .map(|p| p.trim().parse::<Priority>())
        .transpose()?;
    let due_date = non_empty(update_data.due_date)
        .map(|raw| parse_due_datetime(&raw, clock))
        .transpose()?;
    let reminder_at = non_empty(update_data.reminder_at)
        .map(|raw| parse_due_datetime(&raw, clock))
        .transpose()?;

    Ok(AssignmentChanges {
        title: non_empty(update_data.title),
        description: non_empty(update_data.description),
        subject: non_empty(update_data.subject),
        priority,
        due_date,
        reminder_enabled: update_data.reminder_enabled,
        reminder_at,
        urgent_reminder_enabled: update_data.urgent_reminder_enabled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HWTrackerError;
    use crate::utils::clock::manual::ManualClock;
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::sync::Arc;

    fn clock() -> AppClock {
        AppClock::new(
            Arc::new(ManualClock::new(Utc::now())),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    #[test]
    fn test_empty_strings_keep_existing_values() {
        let req = UpdateAssignmentRequest {
            title: Some(String::new()),
            description: Some("  ".to_string()),
            priority: Some("high".to_string()),
            due_date: Some("2024-06-01T10:00".to_string()),
            reminder_at: Some(String::new()),
            ..Default::default()
        };

        let changes = changes_from_request(req, &clock()).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.description.is_none());
        assert!(changes.reminder_at.is_none());
        assert_eq!(changes.priority, Some(Priority::High));
        assert_eq!(
            changes.due_date,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_priority_is_rejected() {
        let req = UpdateAssignmentRequest {
            priority: Some("urgent".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            changes_from_request(req, &clock()),
            Err(HWTrackerError::Validation(_))
        ));
    }
}

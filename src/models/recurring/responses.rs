use chrono::FixedOffset;
use serde::Serialize;

use super::entities::RecurringAssignment;

/// 周期作业响应，附带可读的周期描述
#[derive(Debug, Serialize)]
pub struct RecurringAssignmentResponse {
    #[serde(flatten)]
    pub recurring: RecurringAssignment,
    pub summary: String,
}

impl RecurringAssignmentResponse {
    pub fn new(recurring: RecurringAssignment, offset: FixedOffset) -> Self {
        let summary = recurring.summary(offset);
        Self { recurring, summary }
    }
}

#[derive(Debug, Serialize)]
pub struct RecurringListResponse {
    pub items: Vec<RecurringAssignmentResponse>,
    pub count: usize,
}

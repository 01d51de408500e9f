use serde::Serialize;

use super::entities::Assignment;
use crate::models::common::PaginationInfo;
use crate::models::recurring::RecurringAssignmentResponse;

/// 作业列表响应
#[derive(Debug, Serialize)]
pub struct AssignmentListResponse {
    pub items: Vec<Assignment>,
    pub pagination: PaginationInfo,
}

/// 不分页的作业列表
#[derive(Debug, Serialize)]
pub struct AssignmentItemsResponse {
    pub items: Vec<Assignment>,
    pub count: usize,
}

/// 创建作业的结果，带周期设置时返回周期作业
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateAssignmentResponse {
    Assignment(Assignment),
    Recurring(RecurringAssignmentResponse),
}

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::entities::AssignmentFilter;
use crate::models::common::PaginationQuery;
use crate::models::recurring::EditBehavior;

/// 作业列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub filter: Option<AssignmentFilter>,
}

/// 存储层使用的列表查询
#[derive(Debug, Clone)]
pub struct AssignmentListQuery {
    pub user_id: i64,
    pub filter: Option<AssignmentFilter>,
    pub page: u64,
    pub size: u64,
    /// 判断逾期时使用的当前时间
    pub now: DateTime<Utc>,
}

/// 周期设置中的结束条件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecurrenceUntilInput {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub count: Option<i32>,
    pub date: Option<String>,
}

/// 创建作业时附带的周期设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecurrenceInput {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub interval: Option<i32>,
    pub weekday: Option<i32>,
    pub day: Option<i32>,
    #[serde(default)]
    pub until: RecurrenceUntilInput,
}

/// 创建作业请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub priority: String,
    pub due_date: String,
    #[serde(default)]
    pub reminder_enabled: bool,
    pub reminder_at: Option<String>,
    pub urgent_reminder_enabled: Option<bool>,
    pub recurrence: Option<RecurrenceInput>,
}

/// 更新作业请求，空值保持原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_at: Option<String>,
    pub urgent_reminder_enabled: Option<bool>,
    /// 周期作业实例的编辑范围，缺省使用周期作业保存的设置
    pub edit_behavior: Option<EditBehavior>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAssignmentParams {
    #[serde(default)]
    pub delete_recurring: bool,
}

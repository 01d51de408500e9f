use serde::Deserialize;

fn default_interval() -> i32 {
    1
}

fn default_urgent() -> bool {
    true
}

/// 创建周期作业请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecurringRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub priority: String,
    pub recurrence_type: String,
    #[serde(default = "default_interval")]
    pub recurrence_interval: i32,
    pub recurrence_weekday: Option<i32>,
    pub recurrence_day: Option<i32>,
    #[serde(default)]
    pub due_time: String,
    #[serde(default)]
    pub end_type: String,
    pub end_count: Option<i32>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub edit_behavior: String,
    #[serde(default)]
    pub reminder_enabled: bool,
    pub reminder_offset: Option<i32>,
    #[serde(default = "default_urgent")]
    pub urgent_reminder_enabled: bool,
    /// 第一次作业的截止时间
    pub first_due_date: String,
}

/// 更新周期作业请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecurringRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub priority: Option<String>,
    pub recurrence_type: Option<String>,
    pub recurrence_interval: Option<i32>,
    pub recurrence_weekday: Option<i32>,
    pub recurrence_day: Option<i32>,
    pub due_time: Option<String>,
    pub end_type: Option<String>,
    pub end_count: Option<i32>,
    pub end_date: Option<String>,
    pub edit_behavior: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_offset: Option<i32>,
    pub urgent_reminder_enabled: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRecurringParams {
    #[serde(default)]
    pub delete_future: bool,
}

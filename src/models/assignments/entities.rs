use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::HWTrackerError;

/// 作业优先级
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// 解析用户输入，空字符串视为默认优先级
    pub fn parse_or_default(s: &str) -> Result<Self, HWTrackerError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Priority::Medium);
        }
        s.parse()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = HWTrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(HWTrackerError::validation(format!(
                "无效的优先级: '{s}'. 支持: low, medium, high"
            ))),
        }
    }
}

/// 作业列表过滤条件
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentFilter {
    Pending,
    Completed,
    Overdue,
}

/// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub reminder_enabled: bool,
    pub reminder_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub urgent_reminder_enabled: bool,
    pub last_urgent_reminder_sent: Option<DateTime<Utc>>,
    /// 生成该作业的周期作业，仅作关联，不拥有
    pub recurring_assignment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建作业时的字段
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    pub reminder_enabled: bool,
    pub reminder_at: Option<DateTime<Utc>>,
    pub urgent_reminder_enabled: bool,
    pub recurring_assignment_id: Option<i64>,
}

/// 作业的部分更新，`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub reminder_enabled: Option<bool>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub urgent_reminder_enabled: Option<bool>,
}

impl Assignment {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && now > self.due_date
    }

    /// 截止日期与当前时间在本地时区是否为同一天
    pub fn is_due_today(&self, now: DateTime<Utc>, offset: FixedOffset) -> bool {
        self.due_date.with_timezone(&offset).date_naive() == now.with_timezone(&offset).date_naive()
    }

    pub fn is_due_this_week(&self, now: DateTime<Utc>) -> bool {
        self.due_date > now && self.due_date < now + Duration::days(7)
    }

    /// 切换完成状态，同时设置或清除完成时间
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.completed_at = if self.is_completed { Some(now) } else { None };
    }

    /// 应用部分更新
    pub fn apply_changes(&mut self, changes: &AssignmentChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(subject) = &changes.subject {
            self.subject = subject.clone();
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(enabled) = changes.reminder_enabled {
            self.reminder_enabled = enabled;
        }
        if let Some(at) = changes.reminder_at {
            self.reminder_at = Some(at);
        }
        if let Some(urgent) = changes.urgent_reminder_enabled {
            self.urgent_reminder_enabled = urgent;
        }

        // 提醒重新配置后需要重新发送
        let reminder_touched = changes.reminder_enabled.is_some() || changes.reminder_at.is_some();
        if reminder_touched && self.reminder_enabled && self.reminder_at.is_some() {
            self.reminder_sent = false;
        }
    }

    /// 将模板字段复制到另一个作业
    pub fn copy_template_fields_to(&self, other: &mut Assignment) {
        other.title = self.title.clone();
        other.description = self.description.clone();
        other.subject = self.subject.clone();
        other.priority = self.priority;
        other.urgent_reminder_enabled = self.urgent_reminder_enabled;
    }
}

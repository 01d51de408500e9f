use chrono::{DateTime, FixedOffset, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::rule::{EndCondition, EndType, RecurrenceRule, RecurrenceType};
use crate::errors::{HWTrackerError, Result};
use crate::models::assignments::entities::Priority;

/// 周期作业实例的编辑范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditBehavior {
    #[default]
    ThisOnly,
    ThisAndFuture,
    All,
}

impl EditBehavior {
    /// 空字符串视为默认值
    pub fn parse_or_default(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(EditBehavior::ThisOnly);
        }
        s.parse()
    }
}

impl std::fmt::Display for EditBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditBehavior::ThisOnly => write!(f, "this_only"),
            EditBehavior::ThisAndFuture => write!(f, "this_and_future"),
            EditBehavior::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for EditBehavior {
    type Err = HWTrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "this_only" => Ok(EditBehavior::ThisOnly),
            "this_and_future" => Ok(EditBehavior::ThisAndFuture),
            "all" => Ok(EditBehavior::All),
            _ => Err(HWTrackerError::validation(format!(
                "无效的编辑范围: '{s}'. 支持: this_only, this_and_future, all"
            ))),
        }
    }
}

/// 解析 `HH:MM` 格式的截止时刻，空字符串表示不指定
pub fn parse_due_time(s: &str) -> Result<Option<NaiveTime>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .map(Some)
        .map_err(|_| HWTrackerError::validation(format!("截止时刻格式应为 HH:MM: '{s}'")))
}

/// 周期作业 (模板 + 规则)
#[derive(Debug, Clone, Serialize)]
pub struct RecurringAssignment {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub priority: Priority,
    #[serde(flatten)]
    pub rule: RecurrenceRule,
    pub due_time: String,
    #[serde(flatten)]
    pub end: EndCondition,
    pub generated_count: u32,
    pub edit_behavior: EditBehavior,
    pub reminder_enabled: bool,
    pub reminder_offset: Option<i32>,
    pub urgent_reminder_enabled: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringAssignment {
    /// 是否应当生成下一次作业
    pub fn should_generate_next(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.rule.kind == RecurrenceType::None {
            return false;
        }
        self.end.permits(self.generated_count, now)
    }

    /// 保存的截止时刻
    pub fn due_time_of_day(&self) -> Option<NaiveTime> {
        parse_due_time(&self.due_time).ok().flatten()
    }

    /// 人类可读的周期描述，例如 `every 2 weeks (Monday) / until 5 times`
    pub fn summary(&self, offset: FixedOffset) -> String {
        if self.rule.kind == RecurrenceType::None {
            return String::new();
        }

        let mut parts = Vec::new();
        let interval = self.rule.interval;
        let unit = match self.rule.kind {
            RecurrenceType::Daily => "day",
            RecurrenceType::Weekly => "week",
            _ => "month",
        };
        if interval > 1 {
            parts.push(format!("every {interval} {unit}s"));
        } else {
            parts.push(format!("every {unit}"));
        }

        if let Some(weekday) = self.rule.weekday {
            const WEEKDAYS: [&str; 7] = [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ];
            if let Some(name) = WEEKDAYS.get(weekday as usize) {
                parts.push(format!("({name})"));
            }
        }
        if let Some(day) = self.rule.day {
            parts.push(format!("(day {day})"));
        }

        match self.end {
            EndCondition::Never => {}
            EndCondition::Count { end_count } => parts.push(format!("/ until {end_count} times")),
            EndCondition::Date { end_date } => parts.push(format!(
                "/ until {}",
                end_date.with_timezone(&offset).format("%Y/%m/%d")
            )),
        }

        parts.join(" ")
    }
}

/// 创建周期作业的输入，类型字段尚未校验
#[derive(Debug, Clone)]
pub struct RecurringDraft {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub priority: String,
    pub recurrence_type: String,
    pub recurrence_interval: i32,
    pub recurrence_weekday: Option<i32>,
    pub recurrence_day: Option<i32>,
    pub due_time: String,
    pub end_type: String,
    pub end_count: Option<i32>,
    pub end_date: Option<DateTime<Utc>>,
    pub edit_behavior: String,
    pub reminder_enabled: bool,
    pub reminder_offset: Option<i32>,
    pub urgent_reminder_enabled: bool,
    pub first_due_date: DateTime<Utc>,
}

/// 校验后写入存储的周期作业
#[derive(Debug, Clone)]
pub struct NewRecurringAssignment {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub priority: Priority,
    pub rule: RecurrenceRule,
    pub due_time: String,
    pub end: EndCondition,
    pub edit_behavior: EditBehavior,
    pub reminder_enabled: bool,
    pub reminder_offset: Option<i32>,
    pub urgent_reminder_enabled: bool,
}

fn validate_reminder_offset(offset: Option<i32>) -> Result<Option<i32>> {
    match offset {
        Some(minutes) if minutes < 0 => Err(HWTrackerError::validation(format!(
            "提醒提前量不能为负数: {minutes}"
        ))),
        other => Ok(other),
    }
}

impl RecurringDraft {
    /// 校验并规整输入
    pub fn validate(self, user_id: i64) -> Result<NewRecurringAssignment> {
        let kind: RecurrenceType = self.recurrence_type.trim().parse()?;
        let end_type: EndType = if self.end_type.trim().is_empty() {
            EndType::Never
        } else {
            self.end_type.trim().parse()?
        };

        let rule = RecurrenceRule::new(
            kind,
            self.recurrence_interval,
            self.recurrence_weekday,
            self.recurrence_day,
        )?;
        let end = EndCondition::new(end_type, self.end_count, self.end_date)?;
        parse_due_time(&self.due_time)?;

        Ok(NewRecurringAssignment {
            user_id,
            title: self.title,
            description: self.description,
            subject: self.subject,
            priority: Priority::parse_or_default(&self.priority)?,
            rule,
            due_time: self.due_time.trim().to_string(),
            end,
            edit_behavior: EditBehavior::parse_or_default(&self.edit_behavior)?,
            reminder_enabled: self.reminder_enabled,
            reminder_offset: validate_reminder_offset(self.reminder_offset)?,
            urgent_reminder_enabled: self.urgent_reminder_enabled,
        })
    }
}

/// 周期作业的部分更新，不会传播到已生成的作业
#[derive(Debug, Clone, Default)]
pub struct RecurringChanges {
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
    pub end_date: Option<DateTime<Utc>>,
    pub edit_behavior: Option<String>,
    pub reminder_enabled: Option<bool>,
    pub reminder_offset: Option<i32>,
    pub urgent_reminder_enabled: Option<bool>,
    pub is_active: Option<bool>,
}

impl RecurringChanges {
    /// 将更新合并到现有周期作业，规则与结束条件重新校验
    pub fn apply_to(self, existing: &RecurringAssignment) -> Result<RecurringAssignment> {
        let mut updated = existing.clone();

        if let Some(title) = self.title.filter(|s| !s.trim().is_empty()) {
            updated.title = title;
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(subject) = self.subject {
            updated.subject = subject;
        }
        if let Some(priority) = self.priority.filter(|s| !s.trim().is_empty()) {
            updated.priority = priority.trim().parse()?;
        }

        let kind = match self.recurrence_type {
            Some(t) => t.trim().parse()?,
            None => existing.rule.kind,
        };
        updated.rule = RecurrenceRule::new(
            kind,
            self.recurrence_interval
                .unwrap_or(existing.rule.interval as i32),
            self.recurrence_weekday
                .or(existing.rule.weekday.map(i32::from)),
            self.recurrence_day
                .or(existing.rule.day.map(|d| d as i32)),
        )?;

        if let Some(due_time) = self.due_time {
            parse_due_time(&due_time)?;
            updated.due_time = due_time.trim().to_string();
        }

        let end_type = match self.end_type.filter(|s| !s.trim().is_empty()) {
            Some(t) => t.trim().parse()?,
            None => existing.end.end_type(),
        };
        updated.end = EndCondition::new(
            end_type,
            self.end_count
                .or(existing.end.end_count().map(|c| c as i32)),
            self.end_date.or(existing.end.end_date()),
        )?;

        if let Some(behavior) = self.edit_behavior.filter(|s| !s.trim().is_empty()) {
            updated.edit_behavior = behavior.trim().parse()?;
        }
        if let Some(enabled) = self.reminder_enabled {
            updated.reminder_enabled = enabled;
        }
        if self.reminder_offset.is_some() {
            updated.reminder_offset = validate_reminder_offset(self.reminder_offset)?;
        }
        if let Some(urgent) = self.urgent_reminder_enabled {
            updated.urgent_reminder_enabled = urgent;
        }
        if let Some(active) = self.is_active {
            updated.is_active = active;
        }

        Ok(updated)
    }
}

/// 将截止时刻应用到日期上，日期不变
pub fn apply_due_time(local: chrono::NaiveDateTime, due_time: Option<NaiveTime>) -> chrono::NaiveDateTime {
    match due_time {
        Some(time) => local
            .date()
            .and_hms_opt(time.hour(), time.minute(), 0)
            .unwrap_or(local),
        None => local,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn draft(recurrence_type: &str, first_due_date: DateTime<Utc>) -> RecurringDraft {
        RecurringDraft {
            title: "英语听写".to_string(),
            description: "第三单元".to_string(),
            subject: "英语".to_string(),
            priority: String::new(),
            recurrence_type: recurrence_type.to_string(),
            recurrence_interval: 1,
            recurrence_weekday: None,
            recurrence_day: None,
            due_time: String::new(),
            end_type: "never".to_string(),
            end_count: None,
            end_date: None,
            edit_behavior: String::new(),
            reminder_enabled: false,
            reminder_offset: None,
            urgent_reminder_enabled: true,
            first_due_date,
        }
    }

    fn recurring(kind: RecurrenceType, end: EndCondition) -> RecurringAssignment {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RecurringAssignment {
            id: 1,
            user_id: 1,
            title: "周报".to_string(),
            description: String::new(),
            subject: String::new(),
            priority: Priority::Medium,
            rule: RecurrenceRule::new(kind, 2, Some(1), None).unwrap(),
            due_time: "09:00".to_string(),
            end,
            generated_count: 0,
            edit_behavior: EditBehavior::ThisOnly,
            reminder_enabled: false,
            reminder_offset: None,
            urgent_reminder_enabled: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_should_generate_next() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mut r = recurring(RecurrenceType::Weekly, EndCondition::Count { end_count: 2 });
        assert!(r.should_generate_next(now));

        r.generated_count = 2;
        assert!(!r.should_generate_next(now));

        let mut r = recurring(RecurrenceType::Weekly, EndCondition::Never);
        r.is_active = false;
        assert!(!r.should_generate_next(now));

        let r = recurring(RecurrenceType::None, EndCondition::Never);
        assert!(!r.should_generate_next(now));

        let r = recurring(RecurrenceType::Daily, EndCondition::Date { end_date: now });
        assert!(r.should_generate_next(now));
        assert!(!r.should_generate_next(now + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_summary() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let r = recurring(RecurrenceType::Weekly, EndCondition::Count { end_count: 5 });
        assert_eq!(r.summary(utc), "every 2 weeks (Monday) / until 5 times");

        let mut r = recurring(RecurrenceType::Monthly, EndCondition::Never);
        r.rule = RecurrenceRule::new(RecurrenceType::Monthly, 1, None, Some(31)).unwrap();
        assert_eq!(r.summary(utc), "every month (day 31)");

        let r = recurring(RecurrenceType::None, EndCondition::Never);
        assert_eq!(r.summary(utc), "");
    }

    #[test]
    fn test_draft_validation_errors() {
        let due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

        let err = draft("yearly", due).validate(1).unwrap_err();
        assert!(matches!(err, HWTrackerError::InvalidRecurrenceType(_)));

        let mut d = draft("daily", due);
        d.end_type = "forever".to_string();
        assert!(matches!(
            d.validate(1).unwrap_err(),
            HWTrackerError::InvalidEndType(_)
        ));

        let mut d = draft("daily", due);
        d.due_time = "25:00".to_string();
        assert!(matches!(d.validate(1).unwrap_err(), HWTrackerError::Validation(_)));
    }

    #[test]
    fn test_draft_defaults() {
        let due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut d = draft("weekly", due);
        d.recurrence_interval = 0;
        d.end_type = String::new();
        let new = d.validate(7).unwrap();
        assert_eq!(new.user_id, 7);
        assert_eq!(new.rule.interval, 1);
        assert_eq!(new.end, EndCondition::Never);
        assert_eq!(new.edit_behavior, EditBehavior::ThisOnly);
        assert_eq!(new.priority, Priority::Medium);
    }

    #[test]
    fn test_changes_revalidate_rule() {
        let existing = recurring(RecurrenceType::Weekly, EndCondition::Never);

        let updated = RecurringChanges {
            recurrence_type: Some("monthly".to_string()),
            recurrence_day: Some(15),
            ..Default::default()
        }
        .apply_to(&existing)
        .unwrap();
        assert_eq!(updated.rule.kind, RecurrenceType::Monthly);
        assert_eq!(updated.rule.weekday, None);
        assert_eq!(updated.rule.day, Some(15));
        assert_eq!(updated.rule.interval, 2);

        let err = RecurringChanges {
            end_type: Some("count".to_string()),
            ..Default::default()
        }
        .apply_to(&existing)
        .unwrap_err();
        assert!(matches!(err, HWTrackerError::Validation(_)));

        let err = RecurringChanges {
            recurrence_type: Some("hourly".to_string()),
            ..Default::default()
        }
        .apply_to(&existing)
        .unwrap_err();
        assert!(matches!(err, HWTrackerError::InvalidRecurrenceType(_)));
    }

    #[test]
    fn test_apply_due_time() {
        let local = chrono::NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let time = parse_due_time("08:30").unwrap();
        let applied = apply_due_time(local, time);
        assert_eq!(applied.date(), local.date());
        assert_eq!((applied.hour(), applied.minute()), (8, 30));
        assert_eq!(apply_due_time(local, None), local);
    }
}

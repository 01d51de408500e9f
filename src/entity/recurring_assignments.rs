//! 周期作业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
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
    pub end_date: Option<i64>,
    pub generated_count: i32,
    pub edit_behavior: String,
    pub reminder_enabled: bool,
    pub reminder_offset: Option<i32>,
    pub urgent_reminder_enabled: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_recurring_assignment(self) -> crate::models::recurring::RecurringAssignment {
        use crate::models::assignments::entities::Priority;
        use crate::models::recurring::{
            EditBehavior, EndCondition, EndType, RecurrenceRule, RecurrenceType,
            RecurringAssignment,
        };
        use chrono::{DateTime, Utc};

        let kind = self
            .recurrence_type
            .parse::<RecurrenceType>()
            .unwrap_or(RecurrenceType::None);
        // 入库前已经校验，这里只做兜底
        let rule = RecurrenceRule::new(
            kind,
            self.recurrence_interval,
            self.recurrence_weekday,
            self.recurrence_day,
        )
        .unwrap_or(RecurrenceRule {
            kind,
            interval: self.recurrence_interval.max(1) as u32,
            weekday: None,
            day: None,
        });

        let end_date = self
            .end_date
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));
        let end = self
            .end_type
            .parse::<EndType>()
            .and_then(|end_type| EndCondition::new(end_type, self.end_count, end_date))
            .unwrap_or(EndCondition::Never);

        RecurringAssignment {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            subject: self.subject,
            priority: self.priority.parse::<Priority>().unwrap_or_default(),
            rule,
            due_time: self.due_time,
            end,
            generated_count: self.generated_count.max(0) as u32,
            edit_behavior: self
                .edit_behavior
                .parse::<EditBehavior>()
                .unwrap_or_default(),
            reminder_enabled: self.reminder_enabled,
            reminder_offset: self.reminder_offset,
            urgent_reminder_enabled: self.urgent_reminder_enabled,
            is_active: self.is_active,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

//! 作业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub subject: String,
    pub priority: String,
    pub due_date: i64,
    pub is_completed: bool,
    pub completed_at: Option<i64>,
    pub is_archived: bool,
    pub reminder_enabled: bool,
    pub reminder_at: Option<i64>,
    pub reminder_sent: bool,
    pub urgent_reminder_enabled: bool,
    pub last_urgent_reminder_sent: Option<i64>,
    pub recurring_assignment_id: Option<i64>,
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
    #[sea_orm(
        belongs_to = "super::recurring_assignments::Entity",
        from = "Column::RecurringAssignmentId",
        to = "super::recurring_assignments::Column::Id"
    )]
    RecurringAssignment,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::recurring_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_assignment(self) -> crate::models::assignments::entities::Assignment {
        use crate::models::assignments::entities::{Assignment, Priority};
        use chrono::{DateTime, Utc};

        Assignment {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            subject: self.subject,
            priority: self.priority.parse::<Priority>().unwrap_or_default(),
            due_date: DateTime::<Utc>::from_timestamp(self.due_date, 0).unwrap_or_default(),
            is_completed: self.is_completed,
            completed_at: self
                .completed_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            is_archived: self.is_archived,
            reminder_enabled: self.reminder_enabled,
            reminder_at: self
                .reminder_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            reminder_sent: self.reminder_sent,
            urgent_reminder_enabled: self.urgent_reminder_enabled,
            last_urgent_reminder_sent: self
                .last_urgent_reminder_sent
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            recurring_assignment_id: self.recurring_assignment_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}

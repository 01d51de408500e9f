use super::SeaOrmStorage;
use crate::entity::recurring_assignments::{ActiveModel, Column, Entity as RecurringAssignments};
use crate::errors::{HWTrackerError, Result};
use crate::models::recurring::{NewRecurringAssignment, RecurrenceType, RecurringAssignment};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建周期作业，生成次数从 0 开始
    pub async fn create_recurring_assignment_impl(
        &self,
        new: NewRecurringAssignment,
    ) -> Result<RecurringAssignment> {
        let now = self.now_timestamp();

        let model = ActiveModel {
            user_id: Set(new.user_id),
            title: Set(new.title),
            description: Set(new.description),
            subject: Set(new.subject),
            priority: Set(new.priority.to_string()),
            recurrence_type: Set(new.rule.kind.to_string()),
            recurrence_interval: Set(new.rule.interval as i32),
            recurrence_weekday: Set(new.rule.weekday.map(i32::from)),
            recurrence_day: Set(new.rule.day.map(|d| d as i32)),
            due_time: Set(new.due_time),
            end_type: Set(new.end.end_type().to_string()),
            end_count: Set(new.end.end_count().map(|c| c as i32)),
            end_date: Set(new.end.end_date().map(|d| d.timestamp())),
            generated_count: Set(0),
            edit_behavior: Set(new.edit_behavior.to_string()),
            reminder_enabled: Set(new.reminder_enabled),
            reminder_offset: Set(new.reminder_offset),
            urgent_reminder_enabled: Set(new.urgent_reminder_enabled),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("创建周期作业失败: {e}")))?;

        Ok(result.into_recurring_assignment())
    }

    pub async fn get_recurring_assignment_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<RecurringAssignment>> {
        let result = RecurringAssignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询周期作业失败: {e}")))?;

        Ok(result.map(|m| m.into_recurring_assignment()))
    }

    /// 整行更新周期作业
    pub async fn update_recurring_assignment_impl(
        &self,
        r: &RecurringAssignment,
    ) -> Result<RecurringAssignment> {
        let model = ActiveModel {
            id: Set(r.id),
            user_id: Set(r.user_id),
            title: Set(r.title.clone()),
            description: Set(r.description.clone()),
            subject: Set(r.subject.clone()),
            priority: Set(r.priority.to_string()),
            recurrence_type: Set(r.rule.kind.to_string()),
            recurrence_interval: Set(r.rule.interval as i32),
            recurrence_weekday: Set(r.rule.weekday.map(i32::from)),
            recurrence_day: Set(r.rule.day.map(|d| d as i32)),
            due_time: Set(r.due_time.clone()),
            end_type: Set(r.end.end_type().to_string()),
            end_count: Set(r.end.end_count().map(|c| c as i32)),
            end_date: Set(r.end.end_date().map(|d| d.timestamp())),
            generated_count: Set(r.generated_count as i32),
            edit_behavior: Set(r.edit_behavior.to_string()),
            reminder_enabled: Set(r.reminder_enabled),
            reminder_offset: Set(r.reminder_offset),
            urgent_reminder_enabled: Set(r.urgent_reminder_enabled),
            is_active: Set(r.is_active),
            created_at: Set(r.created_at.timestamp()),
            updated_at: Set(self.now_timestamp()),
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("更新周期作业失败: {e}")))?;

        Ok(result.into_recurring_assignment())
    }

    pub async fn delete_recurring_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = RecurringAssignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("删除周期作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 用户的周期作业，最新创建的在前
    pub async fn list_recurring_assignments_by_user_impl(
        &self,
        user_id: i64,
    ) -> Result<Vec<RecurringAssignment>> {
        let items = RecurringAssignments::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("查询周期作业列表失败: {e}"))
            })?;

        Ok(items
            .into_iter()
            .map(|m| m.into_recurring_assignment())
            .collect())
    }

    /// 待生成候选，结束条件由调用方判断
    pub async fn list_recurring_assignments_for_generation_impl(
        &self,
    ) -> Result<Vec<RecurringAssignment>> {
        let items = RecurringAssignments::find()
            .filter(Column::IsActive.eq(true))
            .filter(Column::RecurrenceType.ne(RecurrenceType::None.to_string()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("查询待生成周期作业失败: {e}"))
            })?;

        Ok(items
            .into_iter()
            .map(|m| m.into_recurring_assignment())
            .collect())
    }
}

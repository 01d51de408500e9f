use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{HWTrackerError, Result};
use crate::models::{
    PaginationInfo,
    assignments::{
        entities::{Assignment, AssignmentFilter, NewAssignment},
        requests::AssignmentListQuery,
        responses::AssignmentListResponse,
    },
    statistics::StatisticsFilter,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, sea_query::Expr,
};

// 业务模型转换为数据库模型，用于整行更新
fn to_active_model(a: &Assignment, updated_at: i64) -> ActiveModel {
    ActiveModel {
        id: Set(a.id),
        user_id: Set(a.user_id),
        title: Set(a.title.clone()),
        description: Set(a.description.clone()),
        subject: Set(a.subject.clone()),
        priority: Set(a.priority.to_string()),
        due_date: Set(a.due_date.timestamp()),
        is_completed: Set(a.is_completed),
        completed_at: Set(a.completed_at.map(|t| t.timestamp())),
        is_archived: Set(a.is_archived),
        reminder_enabled: Set(a.reminder_enabled),
        reminder_at: Set(a.reminder_at.map(|t| t.timestamp())),
        reminder_sent: Set(a.reminder_sent),
        urgent_reminder_enabled: Set(a.urgent_reminder_enabled),
        last_urgent_reminder_sent: Set(a.last_urgent_reminder_sent.map(|t| t.timestamp())),
        recurring_assignment_id: Set(a.recurring_assignment_id),
        created_at: Set(a.created_at.timestamp()),
        updated_at: Set(updated_at),
    }
}

// 按过滤条件附加查询条件
fn apply_filter(
    select: Select<Assignments>,
    filter: Option<AssignmentFilter>,
    now: DateTime<Utc>,
) -> Select<Assignments> {
    match filter {
        Some(AssignmentFilter::Pending) => select.filter(Column::IsCompleted.eq(false)),
        Some(AssignmentFilter::Completed) => select.filter(Column::IsCompleted.eq(true)),
        Some(AssignmentFilter::Overdue) => select
            .filter(Column::IsCompleted.eq(false))
            .filter(Column::DueDate.lt(now.timestamp())),
        None => select,
    }
}

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(&self, new: NewAssignment) -> Result<Assignment> {
        let now = self.now_timestamp();

        let model = ActiveModel {
            user_id: Set(new.user_id),
            title: Set(new.title),
            description: Set(new.description),
            subject: Set(new.subject),
            priority: Set(new.priority.to_string()),
            due_date: Set(new.due_date.timestamp()),
            is_completed: Set(false),
            completed_at: Set(None),
            is_archived: Set(false),
            reminder_enabled: Set(new.reminder_enabled),
            reminder_at: Set(new.reminder_at.map(|t| t.timestamp())),
            reminder_sent: Set(false),
            urgent_reminder_enabled: Set(new.urgent_reminder_enabled),
            last_urgent_reminder_sent: Set(None),
            recurring_assignment_id: Set(new.recurring_assignment_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 整行更新作业
    pub async fn update_assignment_impl(&self, assignment: &Assignment) -> Result<Assignment> {
        let model = to_active_model(assignment, self.now_timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("删除作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 分页列出作业
    pub async fn list_assignments_with_pagination_impl(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        let page = query.page.max(1);
        let size = query.size.clamp(1, 100);

        let mut select = apply_filter(
            Assignments::find().filter(Column::UserId.eq(query.user_id)),
            query.filter,
            query.now,
        );

        // 已完成按完成时间倒序，其余按截止时间
        select = match query.filter {
            Some(AssignmentFilter::Completed) => select.order_by_desc(Column::CompletedAt),
            _ => select.order_by_asc(Column::DueDate),
        };
        select = select.order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询作业总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询作业页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(AssignmentListResponse {
            items: items.into_iter().map(|m| m.into_assignment()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 截止时间在 [from, to) 内的未完成作业
    pub async fn list_assignments_due_between_impl(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>> {
        let items = Assignments::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::IsCompleted.eq(false))
            .filter(Column::DueDate.gte(from.timestamp()))
            .filter(Column::DueDate.lt(to.timestamp()))
            .order_by_asc(Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(items.into_iter().map(|m| m.into_assignment()).collect())
    }

    pub async fn count_assignments_impl(
        &self,
        user_id: i64,
        filter: Option<AssignmentFilter>,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        apply_filter(
            Assignments::find().filter(Column::UserId.eq(user_id)),
            filter,
            now,
        )
        .count(&self.db)
        .await
        .map_err(|e| HWTrackerError::database_operation(format!("统计作业数量失败: {e}")))
    }

    /// 周期作业生成的作业，按截止时间升序
    pub async fn list_assignments_by_recurring_id_impl(
        &self,
        recurring_id: i64,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find().filter(Column::RecurringAssignmentId.eq(recurring_id));
        if let Some(from) = from {
            select = select.filter(Column::DueDate.gte(from.timestamp()));
        }

        let items = select
            .order_by_asc(Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("查询周期作业实例失败: {e}"))
            })?;

        Ok(items.into_iter().map(|m| m.into_assignment()).collect())
    }

    pub async fn count_pending_by_recurring_id_impl(&self, recurring_id: i64) -> Result<u64> {
        Assignments::find()
            .filter(Column::RecurringAssignmentId.eq(recurring_id))
            .filter(Column::IsCompleted.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("统计未完成周期作业实例失败: {e}"))
            })
    }

    pub async fn get_latest_assignment_by_recurring_id_impl(
        &self,
        recurring_id: i64,
    ) -> Result<Option<Assignment>> {
        let result = Assignments::find()
            .filter(Column::RecurringAssignmentId.eq(recurring_id))
            .order_by_desc(Column::DueDate)
            .one(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("查询最新周期作业实例失败: {e}"))
            })?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 统计用的作业，按创建时间过滤
    pub async fn list_assignments_for_statistics_impl(
        &self,
        user_id: i64,
        filter: &StatisticsFilter,
    ) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find().filter(Column::UserId.eq(user_id));

        if let Some(ref subject) = filter.subject
            && !subject.is_empty()
        {
            select = select.filter(Column::Subject.eq(subject.as_str()));
        }
        if let Some(from) = filter.from {
            select = select.filter(Column::CreatedAt.gte(from.timestamp()));
        }
        if let Some(to) = filter.to {
            select = select.filter(Column::CreatedAt.lt(to.timestamp()));
        }
        if !filter.include_archived {
            select = select.filter(Column::IsArchived.eq(false));
        }

        let items = select
            .all(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询统计数据失败: {e}")))?;

        Ok(items.into_iter().map(|m| m.into_assignment()).collect())
    }

    pub async fn set_archived_by_subject_impl(
        &self,
        user_id: i64,
        subject: &str,
        archived: bool,
    ) -> Result<u64> {
        let result = Assignments::update_many()
            .col_expr(Column::IsArchived, Expr::value(archived))
            .col_expr(Column::UpdatedAt, Expr::value(self.now_timestamp()))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Subject.eq(subject))
            .exec(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("更新归档状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 用户使用过的非空科目，按名称排序
    pub async fn list_subjects_impl(&self, user_id: i64) -> Result<Vec<String>> {
        Assignments::find()
            .select_only()
            .column(Column::Subject)
            .distinct()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Subject.ne(""))
            .order_by_asc(Column::Subject)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询科目失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::assignments::entities::Priority;
    use chrono::{Duration, TimeZone};

    fn new_assignment(user_id: i64, subject: &str, due_date: DateTime<Utc>) -> NewAssignment {
        NewAssignment {
            user_id,
            title: format!("{subject} 作业"),
            description: String::new(),
            subject: subject.to_string(),
            priority: Priority::High,
            due_date,
            reminder_enabled: false,
            reminder_at: None,
            urgent_reminder_enabled: true,
            recurring_assignment_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_update_round_trip() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "s@example.com").await;
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let mut created = storage
            .create_assignment_impl(new_assignment(user.id, "数学", due))
            .await
            .unwrap();
        assert_eq!(created.priority, Priority::High);
        assert_eq!(created.due_date, due);
        assert!(!created.is_completed);

        created.toggle_complete(due - Duration::hours(1));
        let updated = storage.update_assignment_impl(&created).await.unwrap();
        assert!(updated.is_completed);
        assert_eq!(updated.completed_at, Some(due - Duration::hours(1)));

        assert!(storage.delete_assignment_impl(created.id).await.unwrap());
        assert!(
            storage
                .get_assignment_by_id_impl(created.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_filters_and_counts() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "f@example.com").await;
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

        storage
            .create_assignment_impl(new_assignment(user.id, "数学", now - Duration::days(1)))
            .await
            .unwrap();
        storage
            .create_assignment_impl(new_assignment(user.id, "英语", now + Duration::days(2)))
            .await
            .unwrap();
        let mut done = storage
            .create_assignment_impl(new_assignment(user.id, "", now + Duration::days(3)))
            .await
            .unwrap();
        done.toggle_complete(now);
        storage.update_assignment_impl(&done).await.unwrap();

        let expected = [
            (None, 3),
            (Some(AssignmentFilter::Pending), 2),
            (Some(AssignmentFilter::Completed), 1),
            (Some(AssignmentFilter::Overdue), 1),
        ];
        for (filter, total) in expected {
            let count = storage
                .count_assignments_impl(user.id, filter, now)
                .await
                .unwrap();
            assert_eq!(count, total, "filter {filter:?}");
        }

        let page = storage
            .list_assignments_with_pagination_impl(AssignmentListQuery {
                user_id: user.id,
                filter: Some(AssignmentFilter::Pending),
                page: 1,
                size: 1,
                now,
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].subject, "数学");
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.total_pages, 2);

        let week = storage
            .list_assignments_due_between_impl(user.id, now, now + Duration::days(7))
            .await
            .unwrap();
        assert_eq!(week.len(), 1);

        assert_eq!(
            storage.list_subjects_impl(user.id).await.unwrap(),
            vec!["数学".to_string(), "英语".to_string()]
        );
    }

    #[tokio::test]
    async fn test_archive_by_subject() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "arch@example.com").await;
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        storage
            .create_assignment_impl(new_assignment(user.id, "物理", due))
            .await
            .unwrap();
        storage
            .create_assignment_impl(new_assignment(user.id, "化学", due))
            .await
            .unwrap();

        let affected = storage
            .set_archived_by_subject_impl(user.id, "物理", true)
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let visible = storage
            .list_assignments_for_statistics_impl(user.id, &StatisticsFilter::default())
            .await
            .unwrap();
        assert_eq!(visible.len(), 1);

        let all = storage
            .list_assignments_for_statistics_impl(
                user.id,
                &StatisticsFilter {
                    include_archived: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}

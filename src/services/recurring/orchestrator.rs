//! 周期作业编排
//!
//! 负责周期作业的创建、实例生成、编辑传播与删除。规则计算见
//! [`crate::models::recurring::rule`]，这里只做 I/O 与流程。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::errors::{HWTrackerError, Result};
use crate::models::assignments::entities::{Assignment, AssignmentChanges, NewAssignment};
use crate::models::recurring::{
    EditBehavior, RecurringAssignment, RecurringChanges, RecurringDraft, entities::apply_due_time,
};
use crate::storage::Storage;
use crate::utils::clock::AppClock;
use crate::utils::validate::validate_assignment_fields;

/// 一次生成扫描的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub candidates: usize,
    pub generated: usize,
    pub failed: usize,
}

pub struct RecurringOrchestrator {
    storage: Arc<dyn Storage>,
    clock: AppClock,
}

impl RecurringOrchestrator {
    pub fn new(storage: Arc<dyn Storage>, clock: AppClock) -> Self {
        Self { storage, clock }
    }

    pub fn clock(&self) -> &AppClock {
        &self.clock
    }

    /// 创建周期作业并立即生成第一次作业
    ///
    /// 生成失败时返回错误，已保存的周期作业不回滚。
    pub async fn create(&self, user_id: i64, draft: RecurringDraft) -> Result<RecurringAssignment> {
        validate_assignment_fields(&draft.title, &draft.description, &draft.subject)?;
        let first_due_date = draft.first_due_date;
        let new = draft.validate(user_id)?;

        let mut recurring = self.storage.create_recurring_assignment(new).await?;
        info!(
            "Recurring assignment {} created for user {} ({})",
            recurring.id, user_id, recurring.rule.kind
        );

        self.generate_occurrence(&mut recurring, first_due_date)
            .await?;
        Ok(recurring)
    }

    /// 获取周期作业并校验归属
    pub async fn get(&self, user_id: i64, recurring_id: i64) -> Result<RecurringAssignment> {
        let recurring = self
            .storage
            .get_recurring_assignment_by_id(recurring_id)
            .await?
            .ok_or_else(|| HWTrackerError::not_found(format!("周期作业不存在: {recurring_id}")))?;

        if recurring.user_id != user_id {
            return Err(HWTrackerError::authorization("无权访问该周期作业"));
        }
        Ok(recurring)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<RecurringAssignment>> {
        self.storage.list_recurring_assignments_by_user(user_id).await
    }

    /// 更新模板与规则，不影响已生成的作业
    pub async fn update_rule(
        &self,
        user_id: i64,
        recurring_id: i64,
        changes: RecurringChanges,
    ) -> Result<RecurringAssignment> {
        let existing = self.get(user_id, recurring_id).await?;
        let updated = changes.apply_to(&existing)?;
        validate_assignment_fields(&updated.title, &updated.description, &updated.subject)?;
        self.storage.update_recurring_assignment(&updated).await
    }

    /// 暂停或恢复
    pub async fn set_active(
        &self,
        user_id: i64,
        recurring_id: i64,
        active: bool,
    ) -> Result<RecurringAssignment> {
        let mut recurring = self.get(user_id, recurring_id).await?;
        recurring.is_active = active;
        self.storage.update_recurring_assignment(&recurring).await
    }

    /// 编辑一次作业，按编辑范围传播到同一周期作业的其他实例
    ///
    /// 范围缺省时使用周期作业保存的设置；周期作业已不存在时只修改当前作业。
    /// `this_and_future` 以修改后的截止时间为起点。已完成的实例不会被传播修改。
    pub async fn update_occurrence(
        &self,
        user_id: i64,
        assignment_id: i64,
        scope: Option<EditBehavior>,
        changes: AssignmentChanges,
    ) -> Result<Assignment> {
        let mut target = self
            .storage
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| HWTrackerError::not_found(format!("作业不存在: {assignment_id}")))?;
        if target.user_id != user_id {
            return Err(HWTrackerError::authorization("无权修改该作业"));
        }

        target.apply_changes(&changes);
        validate_assignment_fields(&target.title, &target.description, &target.subject)?;

        let recurring = match target.recurring_assignment_id {
            Some(recurring_id) => self
                .storage
                .get_recurring_assignment_by_id(recurring_id)
                .await?
                .filter(|r| r.user_id == user_id),
            None => None,
        };
        let Some(mut recurring) = recurring else {
            return self.storage.update_assignment(&target).await;
        };

        let scope = scope.unwrap_or(recurring.edit_behavior);
        let updated = self.storage.update_assignment(&target).await?;

        let from = match scope {
            EditBehavior::ThisOnly => return Ok(updated),
            EditBehavior::ThisAndFuture => Some(updated.due_date),
            EditBehavior::All => None,
        };

        recurring.title = updated.title.clone();
        recurring.description = updated.description.clone();
        recurring.subject = updated.subject.clone();
        recurring.priority = updated.priority;
        recurring.urgent_reminder_enabled = updated.urgent_reminder_enabled;
        self.storage.update_recurring_assignment(&recurring).await?;

        let occurrences = self
            .storage
            .list_assignments_by_recurring_id(recurring.id, from)
            .await?;
        let mut propagated = 0usize;
        for mut occurrence in occurrences
            .into_iter()
            .filter(|o| o.id != updated.id && !o.is_completed)
        {
            updated.copy_template_fields_to(&mut occurrence);
            self.storage.update_assignment(&occurrence).await?;
            propagated += 1;
        }
        debug!(
            "Propagated edit of assignment {} to {} occurrence(s) ({})",
            updated.id, propagated, scope
        );

        Ok(updated)
    }

    /// 删除周期作业
    ///
    /// `cascade` 时删除截止时间未到且未完成的实例，已完成的实例保留。
    pub async fn delete(&self, user_id: i64, recurring_id: i64, cascade: bool) -> Result<()> {
        let recurring = self.get(user_id, recurring_id).await?;

        if cascade {
            let now = self.clock.now();
            let future = self
                .storage
                .list_assignments_by_recurring_id(recurring.id, Some(now))
                .await?;
            for occurrence in future.into_iter().filter(|o| !o.is_completed) {
                self.storage.delete_assignment(occurrence.id).await?;
            }
        }

        self.storage
            .delete_recurring_assignment(recurring.id)
            .await?;
        info!("Recurring assignment {} deleted", recurring.id);
        Ok(())
    }

    /// 扫描所有周期作业并生成到期的下一次作业
    ///
    /// 单个周期作业失败只记录日志，不中断扫描。
    pub async fn generate_due(&self) -> Result<GenerationReport> {
        let now = self.clock.now();
        let candidates: Vec<RecurringAssignment> = self
            .storage
            .list_recurring_assignments_for_generation()
            .await?
            .into_iter()
            .filter(|r| r.should_generate_next(now))
            .collect();

        let mut report = GenerationReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for mut recurring in candidates {
            match self.generate_next(&mut recurring, now).await {
                Ok(true) => report.generated += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        "Failed to generate next assignment for recurring {}: {}",
                        recurring.id, e
                    );
                }
            }
        }

        if report.generated > 0 || report.failed > 0 {
            info!(
                "Recurring generation finished: {} generated, {} failed, {} candidate(s)",
                report.generated, report.failed, report.candidates
            );
        } else {
            debug!(
                "Recurring generation finished, nothing to generate ({} candidate(s))",
                report.candidates
            );
        }
        Ok(report)
    }

    // 没有未完成实例时，从最近一次截止时间推算下一次
    async fn generate_next(
        &self,
        recurring: &mut RecurringAssignment,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if self.storage.count_pending_by_recurring_id(recurring.id).await? > 0 {
            return Ok(false);
        }

        let latest = self
            .storage
            .get_latest_assignment_by_recurring_id(recurring.id)
            .await?;
        let next_due_date = match latest {
            Some(latest) => {
                let last_local = self.clock.to_local(latest.due_date);
                match recurring.rule.next_due_date(last_local) {
                    Some(next) => self.clock.to_utc(next),
                    None => return Ok(false),
                }
            }
            None => now,
        };

        if next_due_date <= now {
            return Ok(false);
        }

        self.generate_occurrence(recurring, next_due_date).await?;
        Ok(true)
    }

    /// 按模板生成一次作业，并累加生成次数
    async fn generate_occurrence(
        &self,
        recurring: &mut RecurringAssignment,
        due_date: DateTime<Utc>,
    ) -> Result<Assignment> {
        let local = apply_due_time(self.clock.to_local(due_date), recurring.due_time_of_day());
        let due_date = self.clock.to_utc(local);

        let reminder_at = if recurring.reminder_enabled {
            recurring
                .reminder_offset
                .map(|minutes| due_date - Duration::minutes(i64::from(minutes)))
        } else {
            None
        };

        let assignment = self
            .storage
            .create_assignment(NewAssignment {
                user_id: recurring.user_id,
                title: recurring.title.clone(),
                description: recurring.description.clone(),
                subject: recurring.subject.clone(),
                priority: recurring.priority,
                due_date,
                reminder_enabled: recurring.reminder_enabled,
                reminder_at,
                urgent_reminder_enabled: recurring.urgent_reminder_enabled,
                recurring_assignment_id: Some(recurring.id),
            })
            .await?;

        recurring.generated_count += 1;
        *recurring = self
            .storage
            .update_recurring_assignment(recurring)
            .await?;

        debug!(
            "Generated assignment {} from recurring {} due {}",
            assignment.id, recurring.id, assignment.due_date
        );
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api_keys::ApiKey;
    use crate::models::assignments::entities::{AssignmentFilter, Priority};
    use crate::models::assignments::requests::AssignmentListQuery;
    use crate::models::assignments::responses::AssignmentListResponse;
    use crate::models::recurring::NewRecurringAssignment;
    use crate::models::statistics::StatisticsFilter;
    use crate::models::users::entities::UserRole;
    use crate::models::users::requests::UserListQuery;
    use crate::models::users::responses::UserListResponse;
    use crate::models::recurring::entities::tests::draft;
    use crate::models::users::entities::User;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{memory_storage, seed_user};
    use crate::utils::clock::{Clock, manual::ManualClock};
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::Mutex;

    struct Harness {
        storage: Arc<SeaOrmStorage>,
        clock: Arc<ManualClock>,
        orchestrator: RecurringOrchestrator,
        user: User,
    }

    async fn harness(now: DateTime<Utc>, offset_hours: i32) -> Harness {
        let clock = Arc::new(ManualClock::new(now));
        let storage = Arc::new(memory_storage().await.with_clock(clock.clone()));
        let user = seed_user(&storage, "owner@example.com").await;
        let app_clock = AppClock::new(
            clock.clone(),
            FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        );
        let orchestrator = RecurringOrchestrator::new(storage.clone(), app_clock);
        Harness {
            storage,
            clock,
            orchestrator,
            user,
        }
    }

    /// 为指定周期作业生成作业时返回数据库错误，其余操作转发给内层存储
    struct FailingStorage {
        inner: Arc<SeaOrmStorage>,
        failing_recurring_id: Mutex<Option<i64>>,
    }

    impl FailingStorage {
        fn fail_for(&self, recurring_id: Option<i64>) {
            *self.failing_recurring_id.lock().unwrap() = recurring_id;
        }
    }

    #[async_trait]
    impl Storage for FailingStorage {
        async fn create_user(
            &self,
            email: &str,
            name: &str,
            password_hash: &str,
            role: UserRole,
        ) -> Result<User> {
            self.inner.create_user(email, name, password_hash, role).await
        }

        async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
            self.inner.get_user_by_id(id).await
        }

        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
            self.inner.get_user_by_email(email).await
        }

        async fn list_users_with_pagination(
            &self,
            query: UserListQuery,
        ) -> Result<UserListResponse> {
            self.inner.list_users_with_pagination(query).await
        }

        async fn update_user_role(&self, id: i64, role: UserRole) -> Result<Option<User>> {
            self.inner.update_user_role(id, role).await
        }

        async fn delete_user(&self, id: i64) -> Result<bool> {
            self.inner.delete_user(id).await
        }

        async fn count_users(&self) -> Result<u64> {
            self.inner.count_users().await
        }

        async fn create_api_key(&self, user_id: i64, name: &str, key_hash: &str) -> Result<ApiKey> {
            self.inner.create_api_key(user_id, name, key_hash).await
        }

        async fn get_user_by_api_key_hash(&self, key_hash: &str) -> Result<Option<User>> {
            self.inner.get_user_by_api_key_hash(key_hash).await
        }

        async fn touch_api_key_last_used(&self, key_hash: &str) -> Result<bool> {
            self.inner.touch_api_key_last_used(key_hash).await
        }

        async fn get_api_key_by_id(&self, id: i64) -> Result<Option<ApiKey>> {
            self.inner.get_api_key_by_id(id).await
        }

        async fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
            self.inner.list_api_keys().await
        }

        async fn delete_api_key(&self, id: i64) -> Result<bool> {
            self.inner.delete_api_key(id).await
        }

        async fn count_api_keys(&self) -> Result<u64> {
            self.inner.count_api_keys().await
        }

        async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
            let failing = *self.failing_recurring_id.lock().unwrap();
            if failing.is_some() && assignment.recurring_assignment_id == failing {
                return Err(HWTrackerError::database_operation("写入作业失败"));
            }
            self.inner.create_assignment(assignment).await
        }

        async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
            self.inner.get_assignment_by_id(id).await
        }

        async fn update_assignment(&self, assignment: &Assignment) -> Result<Assignment> {
            self.inner.update_assignment(assignment).await
        }

        async fn delete_assignment(&self, id: i64) -> Result<bool> {
            self.inner.delete_assignment(id).await
        }

        async fn list_assignments_with_pagination(
            &self,
            query: AssignmentListQuery,
        ) -> Result<AssignmentListResponse> {
            self.inner.list_assignments_with_pagination(query).await
        }

        async fn list_assignments_due_between(
            &self,
            user_id: i64,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<Assignment>> {
            self.inner.list_assignments_due_between(user_id, from, to).await
        }

        async fn count_assignments(
            &self,
            user_id: i64,
            filter: Option<AssignmentFilter>,
            now: DateTime<Utc>,
        ) -> Result<u64> {
            self.inner.count_assignments(user_id, filter, now).await
        }

        async fn list_assignments_by_recurring_id(
            &self,
            recurring_id: i64,
            from: Option<DateTime<Utc>>,
        ) -> Result<Vec<Assignment>> {
            self.inner
                .list_assignments_by_recurring_id(recurring_id, from)
                .await
        }

        async fn count_pending_by_recurring_id(&self, recurring_id: i64) -> Result<u64> {
            self.inner.count_pending_by_recurring_id(recurring_id).await
        }

        async fn get_latest_assignment_by_recurring_id(
            &self,
            recurring_id: i64,
        ) -> Result<Option<Assignment>> {
            self.inner
                .get_latest_assignment_by_recurring_id(recurring_id)
                .await
        }

        async fn list_assignments_for_statistics(
            &self,
            user_id: i64,
            filter: &StatisticsFilter,
        ) -> Result<Vec<Assignment>> {
            self.inner
                .list_assignments_for_statistics(user_id, filter)
                .await
        }

        async fn set_archived_by_subject(
            &self,
            user_id: i64,
            subject: &str,
            archived: bool,
        ) -> Result<u64> {
            self.inner
                .set_archived_by_subject(user_id, subject, archived)
                .await
        }

        async fn list_subjects(&self, user_id: i64) -> Result<Vec<String>> {
            self.inner.list_subjects(user_id).await
        }

        async fn create_recurring_assignment(
            &self,
            recurring: NewRecurringAssignment,
        ) -> Result<RecurringAssignment> {
            self.inner.create_recurring_assignment(recurring).await
        }

        async fn get_recurring_assignment_by_id(
            &self,
            id: i64,
        ) -> Result<Option<RecurringAssignment>> {
            self.inner.get_recurring_assignment_by_id(id).await
        }

        async fn update_recurring_assignment(
            &self,
            recurring: &RecurringAssignment,
        ) -> Result<RecurringAssignment> {
            self.inner.update_recurring_assignment(recurring).await
        }

        async fn delete_recurring_assignment(&self, id: i64) -> Result<bool> {
            self.inner.delete_recurring_assignment(id).await
        }

        async fn list_recurring_assignments_by_user(
            &self,
            user_id: i64,
        ) -> Result<Vec<RecurringAssignment>> {
            self.inner.list_recurring_assignments_by_user(user_id).await
        }

        async fn list_recurring_assignments_for_generation(
            &self,
        ) -> Result<Vec<RecurringAssignment>> {
            self.inner.list_recurring_assignments_for_generation().await
        }
    }

    // 编排器改为经过 FailingStorage 访问同一个数据库
    fn with_failing_storage(h: &mut Harness) -> Arc<FailingStorage> {
        let failing = Arc::new(FailingStorage {
            inner: h.storage.clone(),
            failing_recurring_id: Mutex::new(None),
        });
        h.orchestrator = RecurringOrchestrator::new(failing.clone(), h.orchestrator.clock().clone());
        failing
    }

    async fn occurrences(h: &Harness, recurring_id: i64) -> Vec<Assignment> {
        h.storage
            .list_assignments_by_recurring_id(recurring_id, None)
            .await
            .unwrap()
    }

    async fn complete(h: &Harness, assignment: &Assignment) {
        let mut done = assignment.clone();
        done.toggle_complete(h.clock.now());
        h.storage.update_assignment(&done).await.unwrap();
    }

    // 直接写入一个实例，模拟之前生成的作业
    async fn insert_occurrence(
        h: &Harness,
        recurring: &RecurringAssignment,
        due_date: DateTime<Utc>,
    ) -> Assignment {
        h.storage
            .create_assignment(NewAssignment {
                user_id: recurring.user_id,
                title: recurring.title.clone(),
                description: recurring.description.clone(),
                subject: recurring.subject.clone(),
                priority: recurring.priority,
                due_date,
                reminder_enabled: false,
                reminder_at: None,
                urgent_reminder_enabled: recurring.urgent_reminder_enabled,
                recurring_assignment_id: Some(recurring.id),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_generates_first_occurrence() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::days(1), 0).await;

        let recurring = h
            .orchestrator
            .create(h.user.id, draft("weekly", first_due))
            .await
            .unwrap();
        assert_eq!(recurring.generated_count, 1);
        assert!(recurring.is_active);

        let items = occurrences(&h, recurring.id).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].due_date, first_due);
        assert_eq!(items[0].title, "英语听写");
        assert_eq!(items[0].recurring_assignment_id, Some(recurring.id));
    }

    #[tokio::test]
    async fn test_weekly_generation_after_completion() {
        // 周一 2024-01-01，截止时刻由 due_time 决定
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let mut input = draft("weekly", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        input.due_time = "09:00".to_string();
        input.recurrence_weekday = Some(1);
        let recurring = h.orchestrator.create(h.user.id, input).await.unwrap();
        assert_eq!(recurring.rule.weekday, Some(1));
        assert_eq!(occurrences(&h, recurring.id).await[0].due_date, first_due);

        // 有未完成实例时不生成
        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.generated, 0);

        let first = occurrences(&h, recurring.id).await.remove(0);
        complete(&h, &first).await;
        h.clock.set(first_due + Duration::hours(1));

        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.generated, 1);
        assert_eq!(report.failed, 0);

        let items = occurrences(&h, recurring.id).await;
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1].due_date,
            Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()
        );

        // 连续扫描不会重复生成
        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.generated, 0);
        assert_eq!(occurrences(&h, recurring.id).await.len(), 2);

        let stored = h.orchestrator.get(h.user.id, recurring.id).await.unwrap();
        assert_eq!(stored.generated_count, 2);
    }

    #[tokio::test]
    async fn test_due_time_and_reminder_in_local_zone() {
        // UTC+9: 本地 2024-01-01 09:00
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let h = harness(first_due - Duration::days(1), 9).await;

        let mut input = draft("daily", first_due);
        input.due_time = "18:00".to_string();
        input.reminder_enabled = true;
        input.reminder_offset = Some(30);
        let recurring = h.orchestrator.create(h.user.id, input).await.unwrap();

        let first = occurrences(&h, recurring.id).await.remove(0);
        assert_eq!(
            first.due_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
        );
        assert!(first.reminder_enabled);
        assert_eq!(
            first.reminder_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_count_end_condition_stops_generation() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;

        let mut input = draft("daily", first_due);
        input.end_type = "count".to_string();
        input.end_count = Some(2);
        let recurring = h.orchestrator.create(h.user.id, input).await.unwrap();

        complete(&h, &occurrences(&h, recurring.id).await[0]).await;
        h.clock.set(first_due + Duration::hours(1));
        assert_eq!(h.orchestrator.generate_due().await.unwrap().generated, 1);

        complete(&h, &occurrences(&h, recurring.id).await[1]).await;
        h.clock.advance(Duration::days(1));
        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.candidates, 0);
        assert_eq!(occurrences(&h, recurring.id).await.len(), 2);
    }

    #[tokio::test]
    async fn test_paused_rule_is_skipped() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        complete(&h, &occurrences(&h, recurring.id).await[0]).await;

        let paused = h
            .orchestrator
            .set_active(h.user.id, recurring.id, false)
            .await
            .unwrap();
        assert!(!paused.is_active);

        h.clock.set(first_due + Duration::hours(1));
        assert_eq!(h.orchestrator.generate_due().await.unwrap().candidates, 0);

        h.orchestrator
            .set_active(h.user.id, recurring.id, true)
            .await
            .unwrap();
        assert_eq!(h.orchestrator.generate_due().await.unwrap().generated, 1);
    }

    #[tokio::test]
    async fn test_this_and_future_keeps_completed_and_earlier() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();

        let first = occurrences(&h, recurring.id).await.remove(0);
        complete(&h, &first).await;
        let second = insert_occurrence(&h, &recurring, first_due + Duration::days(1)).await;
        let third = insert_occurrence(&h, &recurring, first_due + Duration::days(2)).await;
        let fourth = insert_occurrence(&h, &recurring, first_due + Duration::days(3)).await;

        let changes = AssignmentChanges {
            title: Some("单词默写".to_string()),
            priority: Some(Priority::High),
            ..Default::default()
        };
        let updated = h
            .orchestrator
            .update_occurrence(
                h.user.id,
                third.id,
                Some(EditBehavior::ThisAndFuture),
                changes,
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "单词默写");

        let items = occurrences(&h, recurring.id).await;
        let title_of = |id: i64| {
            items
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.title.clone())
                .unwrap()
        };
        assert_eq!(title_of(first.id), "英语听写");
        assert_eq!(title_of(second.id), "英语听写");
        assert_eq!(title_of(third.id), "单词默写");
        assert_eq!(title_of(fourth.id), "单词默写");

        let rule = h.orchestrator.get(h.user.id, recurring.id).await.unwrap();
        assert_eq!(rule.title, "单词默写");
        assert_eq!(rule.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_all_scope_skips_completed() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();

        let first = occurrences(&h, recurring.id).await.remove(0);
        complete(&h, &first).await;
        let second = insert_occurrence(&h, &recurring, first_due + Duration::days(1)).await;
        let third = insert_occurrence(&h, &recurring, first_due + Duration::days(2)).await;

        h.orchestrator
            .update_occurrence(
                h.user.id,
                third.id,
                Some(EditBehavior::All),
                AssignmentChanges {
                    subject: Some("语文".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let items = occurrences(&h, recurring.id).await;
        let subject_of = |id: i64| {
            items
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.subject.clone())
                .unwrap()
        };
        assert_eq!(subject_of(first.id), "英语");
        assert_eq!(subject_of(second.id), "语文");
        assert_eq!(subject_of(third.id), "语文");
    }

    #[tokio::test]
    async fn test_this_only_is_default_scope() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        let first = occurrences(&h, recurring.id).await.remove(0);
        let second = insert_occurrence(&h, &recurring, first_due + Duration::days(1)).await;

        h.orchestrator
            .update_occurrence(
                h.user.id,
                first.id,
                None,
                AssignmentChanges {
                    title: Some("只改这一次".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let items = occurrences(&h, recurring.id).await;
        assert_eq!(items[0].title, "只改这一次");
        assert_eq!(items[1].id, second.id);
        assert_eq!(items[1].title, "英语听写");
        let rule = h.orchestrator.get(h.user.id, recurring.id).await.unwrap();
        assert_eq!(rule.title, "英语听写");
    }

    #[tokio::test]
    async fn test_cascade_delete_keeps_completed() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();

        let first = occurrences(&h, recurring.id).await.remove(0);
        complete(&h, &first).await;
        let pending = insert_occurrence(&h, &recurring, first_due + Duration::days(1)).await;

        h.orchestrator
            .delete(h.user.id, recurring.id, true)
            .await
            .unwrap();

        let err = h.orchestrator.get(h.user.id, recurring.id).await.unwrap_err();
        assert!(matches!(err, HWTrackerError::NotFound(_)));

        assert!(
            h.storage
                .get_assignment_by_id(pending.id)
                .await
                .unwrap()
                .is_none()
        );
        let kept = h
            .storage
            .get_assignment_by_id(first.id)
            .await
            .unwrap()
            .unwrap();
        assert!(kept.is_completed);
        assert_eq!(kept.recurring_assignment_id, None);
    }

    #[tokio::test]
    async fn test_delete_without_cascade_keeps_occurrences() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        let first = occurrences(&h, recurring.id).await.remove(0);

        h.orchestrator
            .delete(h.user.id, recurring.id, false)
            .await
            .unwrap();
        assert!(
            h.storage
                .get_assignment_by_id(first.id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_invalid_types_are_rejected() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due, 0).await;

        let err = h
            .orchestrator
            .create(h.user.id, draft("yearly", first_due))
            .await
            .unwrap_err();
        assert!(matches!(err, HWTrackerError::InvalidRecurrenceType(_)));

        let mut input = draft("daily", first_due);
        input.end_type = "forever".to_string();
        let err = h.orchestrator.create(h.user.id, input).await.unwrap_err();
        assert!(matches!(err, HWTrackerError::InvalidEndType(_)));

        assert!(h.orchestrator.list(h.user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_user_is_unauthorized() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due, 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        let stranger = seed_user(&h.storage, "stranger@example.com").await;

        let err = h
            .orchestrator
            .get(stranger.id, recurring.id)
            .await
            .unwrap_err();
        assert!(matches!(err, HWTrackerError::Authorization(_)));

        let occurrence = occurrences(&h, recurring.id).await.remove(0);
        let err = h
            .orchestrator
            .update_occurrence(stranger.id, occurrence.id, None, AssignmentChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HWTrackerError::Authorization(_)));

        let err = h
            .orchestrator
            .delete(stranger.id, recurring.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, HWTrackerError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_update_rule_does_not_touch_occurrences() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due, 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();

        let updated = h
            .orchestrator
            .update_rule(
                h.user.id,
                recurring.id,
                RecurringChanges {
                    title: Some("新标题".to_string()),
                    recurrence_type: Some("weekly".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "新标题");
        assert_eq!(updated.generated_count, 1);

        let items = occurrences(&h, recurring.id).await;
        assert_eq!(items[0].title, "英语听写");
    }

    #[tokio::test]
    async fn test_this_and_future_starts_from_new_due_date() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        let first = occurrences(&h, recurring.id).await.remove(0);
        let second = insert_occurrence(&h, &recurring, first_due + Duration::days(1)).await;
        let later = insert_occurrence(&h, &recurring, first_due + Duration::days(6)).await;

        let moved = h
            .orchestrator
            .update_occurrence(
                h.user.id,
                first.id,
                Some(EditBehavior::ThisAndFuture),
                AssignmentChanges {
                    title: Some("改期".to_string()),
                    due_date: Some(first_due + Duration::days(5)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.due_date, first_due + Duration::days(5));

        let items = occurrences(&h, recurring.id).await;
        let title_of = |id: i64| {
            items
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.title.clone())
                .unwrap()
        };
        assert_eq!(title_of(first.id), "改期");
        assert_eq!(title_of(second.id), "英语听写");
        assert_eq!(title_of(later.id), "改期");
    }

    #[tokio::test]
    async fn test_sweep_continues_after_rule_failure() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut h = harness(first_due - Duration::hours(1), 0).await;
        let failing = with_failing_storage(&mut h);

        let broken = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        let healthy = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        complete(&h, &occurrences(&h, broken.id).await[0]).await;
        complete(&h, &occurrences(&h, healthy.id).await[0]).await;

        failing.fail_for(Some(broken.id));
        h.clock.set(first_due + Duration::hours(1));
        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.candidates, 2);
        assert_eq!(report.generated, 1);
        assert_eq!(report.failed, 1);

        assert_eq!(occurrences(&h, broken.id).await.len(), 1);
        assert_eq!(occurrences(&h, healthy.id).await.len(), 2);
        let stored = h.orchestrator.get(h.user.id, broken.id).await.unwrap();
        assert_eq!(stored.generated_count, 1);

        // 恢复后下一轮扫描补上
        failing.fail_for(None);
        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.generated, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(occurrences(&h, broken.id).await.len(), 2);
    }

    #[tokio::test]
    async fn test_create_keeps_rule_when_first_generation_fails() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut h = harness(first_due - Duration::hours(1), 0).await;
        let failing = with_failing_storage(&mut h);

        // 新库中第一条周期作业的 id 为 1
        failing.fail_for(Some(1));
        let err = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap_err();
        assert!(matches!(err, HWTrackerError::DatabaseOperation(_)));

        let rules = h.orchestrator.list(h.user.id).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, 1);
        assert_eq!(rules[0].generated_count, 0);
        assert!(occurrences(&h, 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_rule_without_occurrences_generates_nothing() {
        let first_due = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let h = harness(first_due - Duration::hours(1), 0).await;
        let recurring = h
            .orchestrator
            .create(h.user.id, draft("daily", first_due))
            .await
            .unwrap();
        let first = occurrences(&h, recurring.id).await.remove(0);
        h.storage.delete_assignment(first.id).await.unwrap();

        h.clock.set(first_due + Duration::days(3));
        let report = h.orchestrator.generate_due().await.unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.generated, 0);
        assert_eq!(report.failed, 0);
        assert!(occurrences(&h, recurring.id).await.is_empty());
    }
}

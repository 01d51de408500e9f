use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{
    api_keys::ApiKey,
    assignments::{
        entities::{Assignment, AssignmentFilter, NewAssignment},
        requests::AssignmentListQuery,
        responses::AssignmentListResponse,
    },
    recurring::{NewRecurringAssignment, RecurringAssignment},
    statistics::StatisticsFilter,
    users::{
        entities::{User, UserRole},
        requests::UserListQuery,
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户，密码已经过哈希
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 修改用户角色
    async fn update_user_role(&self, id: i64, role: UserRole) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// API 密钥管理方法
    async fn create_api_key(&self, user_id: i64, name: &str, key_hash: &str) -> Result<ApiKey>;
    // 通过密钥哈希获取所属用户
    async fn get_user_by_api_key_hash(&self, key_hash: &str) -> Result<Option<User>>;
    // 更新密钥最后使用时间
    async fn touch_api_key_last_used(&self, key_hash: &str) -> Result<bool>;
    async fn get_api_key_by_id(&self, id: i64) -> Result<Option<ApiKey>>;
    async fn list_api_keys(&self) -> Result<Vec<ApiKey>>;
    async fn delete_api_key(&self, id: i64) -> Result<bool>;
    async fn count_api_keys(&self) -> Result<u64>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 整行更新
    async fn update_assignment(&self, assignment: &Assignment) -> Result<Assignment>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;
    // 分页列出作业
    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse>;
    // 列出截止时间在 [from, to) 内的未完成作业
    async fn list_assignments_due_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>>;
    // 按过滤条件统计作业数量
    async fn count_assignments(
        &self,
        user_id: i64,
        filter: Option<AssignmentFilter>,
        now: DateTime<Utc>,
    ) -> Result<u64>;
    // 列出周期作业生成的作业，`from` 限定截止时间下界
    async fn list_assignments_by_recurring_id(
        &self,
        recurring_id: i64,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<Assignment>>;
    // 统计周期作业下未完成的作业
    async fn count_pending_by_recurring_id(&self, recurring_id: i64) -> Result<u64>;
    // 获取截止时间最晚的作业
    async fn get_latest_assignment_by_recurring_id(
        &self,
        recurring_id: i64,
    ) -> Result<Option<Assignment>>;
    // 统计用的作业列表
    async fn list_assignments_for_statistics(
        &self,
        user_id: i64,
        filter: &StatisticsFilter,
    ) -> Result<Vec<Assignment>>;
    // 按科目归档或取消归档，返回影响的行数
    async fn set_archived_by_subject(
        &self,
        user_id: i64,
        subject: &str,
        archived: bool,
    ) -> Result<u64>;
    // 用户使用过的科目
    async fn list_subjects(&self, user_id: i64) -> Result<Vec<String>>;

    /// 周期作业管理方法
    async fn create_recurring_assignment(
        &self,
        recurring: NewRecurringAssignment,
    ) -> Result<RecurringAssignment>;
    async fn get_recurring_assignment_by_id(&self, id: i64)
    -> Result<Option<RecurringAssignment>>;
    // 整行更新
    async fn update_recurring_assignment(
        &self,
        recurring: &RecurringAssignment,
    ) -> Result<RecurringAssignment>;
    async fn delete_recurring_assignment(&self, id: i64) -> Result<bool>;
    async fn list_recurring_assignments_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<RecurringAssignment>>;
    // 启用中且类型不为 none 的周期作业
    async fn list_recurring_assignments_for_generation(&self) -> Result<Vec<RecurringAssignment>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

use super::SeaOrmStorage;
use crate::entity::api_keys::{ActiveModel, Column, Entity as ApiKeys};
use crate::entity::users::Entity as Users;
use crate::errors::{HWTrackerError, Result};
use crate::models::{api_keys::ApiKey, users::entities::User};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

impl SeaOrmStorage {
    /// 创建 API 密钥，只保存哈希
    pub async fn create_api_key_impl(
        &self,
        user_id: i64,
        name: &str,
        key_hash: &str,
    ) -> Result<ApiKey> {
        let model = ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            key_hash: Set(key_hash.to_string()),
            last_used: Set(None),
            created_at: Set(self.now_timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("创建 API 密钥失败: {e}")))?;

        Ok(result.into_api_key())
    }

    /// 通过密钥哈希查找用户
    pub async fn get_user_by_api_key_hash_impl(&self, key_hash: &str) -> Result<Option<User>> {
        let result = ApiKeys::find()
            .filter(Column::KeyHash.eq(key_hash))
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询 API 密钥失败: {e}")))?;

        Ok(result.and_then(|(_, user)| user).map(|m| m.into_user()))
    }

    pub async fn touch_api_key_last_used_impl(&self, key_hash: &str) -> Result<bool> {
        let now = self.now_timestamp();

        let result = ApiKeys::update_many()
            .col_expr(Column::LastUsed, Expr::value(now))
            .filter(Column::KeyHash.eq(key_hash))
            .exec(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("更新密钥使用时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    pub async fn get_api_key_by_id_impl(&self, id: i64) -> Result<Option<ApiKey>> {
        let result = ApiKeys::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("查询 API 密钥失败: {e}")))?;

        Ok(result.map(|m| m.into_api_key()))
    }

    pub async fn list_api_keys_impl(&self) -> Result<Vec<ApiKey>> {
        let keys = ApiKeys::find()
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWTrackerError::database_operation(format!("查询 API 密钥列表失败: {e}"))
            })?;

        Ok(keys.into_iter().map(|m| m.into_api_key()).collect())
    }

    pub async fn delete_api_key_impl(&self, id: i64) -> Result<bool> {
        let result = ApiKeys::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("删除 API 密钥失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_api_keys_impl(&self) -> Result<u64> {
        ApiKeys::find()
            .count(&self.db)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("统计 API 密钥失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};

    #[tokio::test]
    async fn test_api_key_lookup() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "key@example.com").await;

        let key = storage
            .create_api_key_impl(user.id, "cli", "abc123")
            .await
            .unwrap();
        assert!(key.last_used.is_none());

        let owner = storage
            .get_user_by_api_key_hash_impl("abc123")
            .await
            .unwrap();
        assert_eq!(owner.map(|u| u.id), Some(user.id));
        assert!(
            storage
                .get_user_by_api_key_hash_impl("missing")
                .await
                .unwrap()
                .is_none()
        );

        assert!(storage.touch_api_key_last_used_impl("abc123").await.unwrap());
        let touched = storage.get_api_key_by_id_impl(key.id).await.unwrap().unwrap();
        assert!(touched.last_used.is_some());

        assert_eq!(storage.count_api_keys_impl().await.unwrap(), 1);
        assert!(storage.delete_api_key_impl(key.id).await.unwrap());
        assert!(storage.list_api_keys_impl().await.unwrap().is_empty());
    }
}

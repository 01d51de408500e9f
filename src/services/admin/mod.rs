pub mod api_keys;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::middlewares::ApiKeyCache;
use crate::models::{
    api_keys::CreateApiKeyRequest,
    users::requests::{CreateUserRequest, UpdateUserRoleRequest, UserListParams},
};
use crate::storage::Storage;

/// 管理员接口：用户与 API 密钥
pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl AdminService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_key_cache(&self, request: &HttpRequest) -> ApiKeyCache {
        request
            .app_data::<web::Data<ApiKeyCache>>()
            .expect("ApiKeyCache not found in app data")
            .get_ref()
            .clone()
    }

    // 用户列表
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::list_users(self, query, request).await
    }

    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::create_user(self, user_data, request).await
    }

    // 修改用户角色
    pub async fn update_user_role(
        &self,
        user_id: i64,
        update_data: UpdateUserRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::update_user_role(self, user_id, update_data, request).await
    }

    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        users::delete_user(self, user_id, request).await
    }

    pub async fn list_api_keys(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        api_keys::list_api_keys(self, request).await
    }

    // 创建 API 密钥，明文只返回一次
    pub async fn create_api_key(
        &self,
        key_data: CreateApiKeyRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        api_keys::create_api_key(self, key_data, request).await
    }

    pub async fn delete_api_key(
        &self,
        key_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        api_keys::delete_api_key(self, key_id, request).await
    }
}

/*!
 * API 密钥认证中间件
 *
 * 客户端在请求头中携带 `Authorization: Bearer hm_<key>`。中间件计算密钥的
 * SHA-256 哈希，先查缓存再查数据库，成功后把用户放入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::scope("/api/v1/assignments")
 *     .wrap(RequireApiKey)
 *     .route("", web::get().to(list_assignments))
 * ```
 *
 * 处理程序中通过 `RequireApiKey::extract_user(&req)` 取出当前用户。
 */

use crate::models::users::entities::{User, UserRole};
use crate::models::ErrorCode;
use crate::storage::Storage;
use crate::utils::api_key::{API_KEY_PREFIX, hash_api_key};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use std::{rc::Rc, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

/// 密钥哈希到用户的短期缓存
///
/// 删除密钥或修改用户后需要失效对应条目。
#[derive(Clone)]
pub struct ApiKeyCache {
    inner: Cache<String, User>,
}

impl ApiKeyCache {
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        debug!(
            "ApiKeyCache initialized with ttl {}s, max capacity {}",
            ttl_secs, max_capacity
        );
        Self { inner }
    }

    pub async fn get(&self, key_hash: &str) -> Option<User> {
        self.inner.get(key_hash).await
    }

    pub async fn insert(&self, key_hash: String, user: User) {
        self.inner.insert(key_hash, user).await;
    }

    pub async fn invalidate(&self, key_hash: &str) {
        self.inner.invalidate(key_hash).await;
    }

    /// 用户角色变化或用户被删除时清空
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[derive(Clone)]
pub struct RequireApiKey;

fn bearer_key(header: Option<&str>) -> Result<&str, String> {
    let key = header
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    if !key.starts_with(API_KEY_PREFIX) || key.len() == API_KEY_PREFIX.len() {
        return Err("Invalid API key format".to_string());
    }
    Ok(key)
}

// 辅助函数：提取并验证 API 密钥
async fn extract_and_validate_key(req: &ServiceRequest) -> Result<User, String> {
    let header = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok());
    let key_hash = hash_api_key(bearer_key(header)?);

    let cache = req
        .app_data::<web::Data<ApiKeyCache>>()
        .expect("ApiKeyCache not found in app data")
        .get_ref()
        .clone();

    if let Some(user) = cache.get(&key_hash).await {
        return Ok(user);
    }

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_api_key_hash(&key_hash)
        .await
        .map_err(|err| {
            warn!("API key lookup failed: {}", err);
            "Failed to verify API key".to_string()
        })?
        .ok_or_else(|| "Invalid API key".to_string())?;

    // 只在缓存未命中时记录使用时间
    if let Err(err) = storage.touch_api_key_last_used(&key_hash).await {
        warn!("Failed to update API key last_used: {}", err);
    }

    cache.insert(key_hash, user.clone()).await;
    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireApiKeyMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireApiKeyMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_key(&req).await {
                Ok(user) => {
                    debug!("API key authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "API key authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::ApiKeyInvalid,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireApiKey {
    /// 从请求扩展中提取当前用户
    pub fn extract_user(req: &actix_web::HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role)
    }
}

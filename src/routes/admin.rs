use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::api_keys::CreateApiKeyRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{CreateUserRequest, UpdateUserRoleRequest, UserListParams};
use crate::services::AdminService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AdminService 实例
static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn update_user_role(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateUserRoleRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_user_role(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_user(user_id.0, &req).await
}

pub async fn list_api_keys(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_api_keys(&req).await
}

pub async fn create_api_key(
    req: HttpRequest,
    key_data: web::Json<CreateApiKeyRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_api_key(key_data.into_inner(), &req).await
}

pub async fn delete_api_key(req: HttpRequest, key_id: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_api_key(key_id.0, &req).await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(middlewares::RequireApiKey)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::post().to(create_user))
                    .route("/users/{id}/role", web::put().to(update_user_role))
                    .route("/users/{id}", web::delete().to(delete_user))
                    .route("/api-keys", web::get().to(list_api_keys))
                    .route("/api-keys", web::post().to(create_api_key))
                    .route("/api-keys/{id}", web::delete().to(delete_api_key)),
            ),
    );
}

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::AdminService;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{
        entities::UserRole,
        requests::{CreateUserRequest, UpdateUserRoleRequest, UserListParams, UserListQuery},
    },
};
use crate::services::current_user;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_name, validate_password};

pub async fn list_users(
    service: &AdminService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (page, size) = query.pagination.normalized();
    let list_query = UserListQuery {
        page,
        size,
        role: query.role,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    match storage.list_users_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "User list retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve user list: {e}"),
            )),
        ),
    }
}

pub async fn create_user(
    service: &AdminService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = user_data.email.trim().to_lowercase();
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    let name = user_data.name.trim();
    if let Err(msg) = validate_name(name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    let policy = validate_password(&user_data.password);
    if !policy.is_valid {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserPasswordInvalid,
            policy.error_message(),
        )));
    }

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    let storage = service.get_storage(request);
    let role = user_data.role.unwrap_or(UserRole::User);

    match storage
        .create_user(&email, name, &password_hash, role)
        .await
    {
        Ok(user) => {
            info!("User {} created with role {}", user.id, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "用户创建成功")))
        }
        Err(e) => {
            let msg = format!("User creation failed: {e}");
            error!("{}", msg);
            // 判断是否唯一约束冲突
            if msg.contains("UNIQUE constraint failed") || msg.contains("duplicate key") {
                Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Email already exists",
                )))
            } else {
                Ok(HttpResponse::InternalServerError()
                    .json(ApiResponse::error_empty(ErrorCode::UserCreationFailed, msg)))
            }
        }
    }
}

pub async fn update_user_role(
    service: &AdminService,
    user_id: i64,
    update_data: UpdateUserRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.update_user_role(user_id, update_data.role).await {
        Ok(Some(user)) => {
            service.get_key_cache(request).invalidate_all();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                user,
                "User role updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            format!("Failed to update user role: {e}"),
        ))),
    }
}

pub async fn delete_user(
    service: &AdminService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 禁止删除当前用户
    if current.id == user_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    let storage = service.get_storage(request);
    match storage.delete_user(user_id).await {
        Ok(true) => {
            service.get_key_cache(request).invalidate_all();
            info!("User {} deleted by {}", user_id, current.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserDeleteFailed,
                format!("User deletion failed: {e}"),
            )),
        ),
    }
}

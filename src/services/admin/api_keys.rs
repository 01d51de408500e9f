use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AdminService;
use crate::models::{
    ApiResponse, ErrorCode,
    api_keys::{CreateApiKeyRequest, CreatedApiKeyResponse},
};
use crate::services::current_user;
use crate::utils::api_key::{generate_api_key, hash_api_key};
use crate::utils::validate::validate_name;

pub async fn list_api_keys(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_api_keys().await {
        Ok(keys) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            keys,
            "API key list retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve API keys: {e}"),
            )),
        ),
    }
}

pub async fn create_api_key(
    service: &AdminService,
    key_data: CreateApiKeyRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let current = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let name = key_data.name.trim();
    if let Err(msg) = validate_name(name) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);

    // 为其他用户创建时确认用户存在
    let owner_id = key_data.user_id.unwrap_or(current.id);
    if owner_id != current.id {
        match storage.get_user_by_id(owner_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "User not found",
                )));
            }
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::ApiKeyCreationFailed,
                        format!("Failed to load user: {e}"),
                    )),
                );
            }
        }
    }

    let key = generate_api_key();
    match storage
        .create_api_key(owner_id, name, &hash_api_key(&key))
        .await
    {
        Ok(api_key) => {
            info!("API key {} created for user {}", api_key.id, owner_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                CreatedApiKeyResponse { api_key, key },
                "API key created, store it now as it will not be shown again",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ApiKeyCreationFailed,
                format!("API key creation failed: {e}"),
            )),
        ),
    }
}

pub async fn delete_api_key(
    service: &AdminService,
    key_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let api_key = match storage.get_api_key_by_id(key_id).await {
        Ok(Some(api_key)) => api_key,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ApiKeyNotFound,
                "API key not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load API key: {e}"),
                )),
            );
        }
    };

    match storage.delete_api_key(api_key.id).await {
        Ok(_) => {
            service
                .get_key_cache(request)
                .invalidate(&api_key.key_hash)
                .await;
            info!("API key {} deleted", api_key.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("API key deleted successfully")))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("API key deletion failed: {e}"),
            )),
        ),
    }
}

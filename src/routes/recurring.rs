use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::recurring::requests::{
    CreateRecurringRequest, DeleteRecurringParams, UpdateRecurringRequest,
};
use crate::services::RecurringService;
use crate::utils::SafeIDI64;

// 懒加载的全局 RecurringService 实例
static RECURRING_SERVICE: Lazy<RecurringService> = Lazy::new(RecurringService::new_lazy);

pub async fn list_recurring(req: HttpRequest) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE.list_recurring(&req).await
}

pub async fn create_recurring(
    req: HttpRequest,
    create_data: web::Json<CreateRecurringRequest>,
) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE
        .create_recurring(create_data.into_inner(), &req)
        .await
}

pub async fn get_recurring(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE.get_recurring(id.0, &req).await
}

pub async fn update_recurring(
    req: HttpRequest,
    id: SafeIDI64,
    update_data: web::Json<UpdateRecurringRequest>,
) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE
        .update_recurring(id.0, update_data.into_inner(), &req)
        .await
}

pub async fn pause_recurring(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE.set_active(id.0, false, &req).await
}

pub async fn resume_recurring(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE.set_active(id.0, true, &req).await
}

pub async fn delete_recurring(
    req: HttpRequest,
    id: SafeIDI64,
    params: web::Query<DeleteRecurringParams>,
) -> ActixResult<HttpResponse> {
    RECURRING_SERVICE
        .delete_recurring(id.0, params.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_recurring_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/recurring")
            .wrap(middlewares::RequireApiKey)
            .route("", web::get().to(list_recurring))
            .route("", web::post().to(create_recurring))
            .route("/{id}", web::get().to(get_recurring))
            .route("/{id}", web::put().to(update_recurring))
            .route("/{id}", web::delete().to(delete_recurring))
            .route("/{id}/pause", web::post().to(pause_recurring))
            .route("/{id}/resume", web::post().to(resume_recurring)),
    );
}
